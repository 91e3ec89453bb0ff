//! Client address resolution behind proxies.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Headers consulted in order before falling back to the peer address.
const FORWARDING_HEADERS: [&str; 4] = [
    "x-real-ip",
    "x-forwarded-for",
    "proxy-client-ip",
    "wl-proxy-client-ip",
];

/// Best guess at the originating client address.
///
/// The first forwarding header with a usable value wins; for comma separated
/// chains the first hop is taken. Blank and `unknown` values are skipped.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    FORWARDING_HEADERS
        .iter()
        .find_map(|name| {
            headers
                .get(*name)
                .and_then(|value| value.to_str().ok())
                .and_then(first_hop)
        })
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

fn first_hop(value: &str) -> Option<String> {
    let first = value.split(',').next()?.trim();
    if first.is_empty() || first.eq_ignore_ascii_case("unknown") {
        None
    } else {
        Some(first.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> Option<SocketAddr> {
        Some(SocketAddr::from(([192, 168, 0, 7], 40123)))
    }

    #[test]
    fn test_falls_back_to_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), peer()).as_deref(), Some("192.168.0.7"));
        assert_eq!(client_ip(&HeaderMap::new(), None), None);
    }

    #[test]
    fn test_real_ip_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.1"));
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_forwarded_chain_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.9 , 10.0.0.1, 10.0.0.2"),
        );
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_unknown_is_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("unknown"));
        headers.insert("proxy-client-ip", HeaderValue::from_static("UNKNOWN"));
        headers.insert("wl-proxy-client-ip", HeaderValue::from_static("172.16.0.3"));
        assert_eq!(client_ip(&headers, peer()).as_deref(), Some("172.16.0.3"));
    }
}
