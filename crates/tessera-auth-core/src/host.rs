//! IPv4 address packing
//!
//! Tokens carry the sign-in host as a 32-bit big-endian integer widened to i64.

use std::net::Ipv4Addr;

/// Pack a dotted-quad address into an integer.
///
/// Returns `None` for blank input or anything that is not an IPv4 address.
pub fn ip_to_num(ip: &str) -> Option<u32> {
    ip.trim().parse::<Ipv4Addr>().ok().map(u32::from)
}

/// Unpack an integer produced by [`ip_to_num`].
///
/// Non-positive values and values wider than 32 bits yield `None`.
pub fn num_to_ip(num: i64) -> Option<Ipv4Addr> {
    if num <= 0 {
        return None;
    }
    u32::try_from(num).ok().map(Ipv4Addr::from)
}
