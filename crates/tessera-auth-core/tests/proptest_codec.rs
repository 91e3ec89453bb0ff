//! Property-based tests for the token codec
//!
//! These tests verify:
//! - Issued tokens decode back to the identity they were issued for
//! - Repeated issuance for one identity never repeats a token
//! - Single-character edits are rejected by the check digit
//! - Malformed tokens never cause panics

use std::collections::HashSet;
use std::net::Ipv4Addr;

use proptest::prelude::*;
use tessera_auth_core::{checksum_of, swap_pairs, TokenCodec};
use tessera_types::{UserId, UserType};

const URL_SAFE_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

// ============================================================================
// Strategies
// ============================================================================

fn arb_user_type() -> impl Strategy<Value = UserType> {
    prop::sample::select(UserType::ALL.to_vec())
}

fn arb_identity() -> impl Strategy<Value = (UserId, UserType, Ipv4Addr)> {
    (1..=i32::MAX, arb_user_type(), any::<u32>())
        .prop_map(|(id, user_type, ip)| (UserId(id), user_type, Ipv4Addr::from(ip)))
}

/// Strings shaped like tokens but not produced by the encoder
fn arb_malformed_token() -> impl Strategy<Value = String> {
    prop_oneof![
        ".*",
        "[a-v][A-Za-z0-9_=-]{0,64}",
        Just(String::new()),
        Just("0".to_string()),
        Just("0=".to_string()),
        // correct check digit over garbage
        "[A-Za-z0-9_=!-]{1,64}".prop_map(|payload| {
            format!("{}{}", checksum_of(&payload), swap_pairs(&payload))
        }),
        // correct check digit over valid base64 of random bytes
        prop::collection::vec(any::<u8>(), 0..48).prop_map(|bytes| {
            use base64::Engine;
            let payload = base64::engine::general_purpose::URL_SAFE.encode(bytes);
            format!("{}{}", checksum_of(&payload), swap_pairs(&payload))
        }),
    ]
}

// ============================================================================
// Codec Properties
// ============================================================================

proptest! {
    /// Property: decode(encode(x)) recovers the logical identity
    #[test]
    fn prop_token_roundtrips((user_id, user_type, ip) in arb_identity()) {
        let codec = TokenCodec::new();
        let token = codec.encode(user_id, user_type, &ip.to_string()).unwrap();
        let identity = codec.decode(token.as_str()).unwrap();

        prop_assert_eq!(identity.user_id(), Some(user_id));
        prop_assert_eq!(identity.user_type(), Some(user_type));
        prop_assert_eq!(identity.host(), Some(i64::from(u32::from(ip))));
    }

    /// Property: tokens only use the check digit alphabet and url-safe base64
    #[test]
    fn prop_token_is_url_safe((user_id, user_type, ip) in arb_identity()) {
        let token = TokenCodec::new().encode(user_id, user_type, &ip.to_string()).unwrap();
        let text = token.as_str();

        prop_assert!(text.len() >= 2);
        prop_assert!(text.chars().all(|c| c.is_ascii_alphanumeric() || "-_=".contains(c)));
    }

    /// Property: nearly every single-character edit fails the check digit
    #[test]
    fn prop_single_char_edits_detected((user_id, user_type, ip) in arb_identity()) {
        let codec = TokenCodec::new();
        let token = codec.encode(user_id, user_type, &ip.to_string()).unwrap();
        let original: Vec<char> = token.as_str().chars().collect();

        let mut edits = 0usize;
        let mut detected = 0usize;
        for position in 0..original.len() {
            for replacement in URL_SAFE_ALPHABET.chars().filter(|c| *c != original[position]) {
                let mut tampered = original.clone();
                tampered[position] = replacement;
                let tampered: String = tampered.into_iter().collect();

                edits += 1;
                if codec.decode(&tampered).is_err() {
                    detected += 1;
                }
            }
        }

        let rate = detected as f64 / edits as f64;
        prop_assert!(rate > 0.9, "only {:.3} of edits detected", rate);
    }

    /// Property: malformed tokens never panic
    #[test]
    fn prop_malformed_token_never_panics(token in arb_malformed_token()) {
        let result = std::panic::catch_unwind(|| {
            let _ = TokenCodec::new().decode(&token);
        });
        prop_assert!(result.is_ok(), "decode panicked for: {:?}", token);
    }

    /// Property: the pair swap is an involution
    #[test]
    fn prop_swap_pairs_involution(s in ".{0,64}") {
        prop_assert_eq!(swap_pairs(&swap_pairs(&s)), s);
    }
}

// ============================================================================
// Salt
// ============================================================================

#[test]
fn test_repeated_issuance_never_repeats() {
    let codec = TokenCodec::new();
    let tokens: HashSet<String> = (0..100)
        .map(|_| {
            codec
                .encode(UserId(42), UserType::Member, "10.0.0.5")
                .unwrap()
                .into_string()
        })
        .collect();

    assert_eq!(tokens.len(), 100);
}
