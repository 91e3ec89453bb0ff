//! Opaque token encoding
//!
//! Wire form: `[check digit][pair-swapped url-safe base64 of the identity record]`.
//!
//! The check digit is the last base-32 digit of the sum of the payload's
//! UTF-16 code units. It catches corruption and casual edits only; it is not
//! a MAC and offers no protection against a forger who knows the format.

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::{DecodePaddingMode, GeneralPurposeConfig};
use base64::Engine;
use prost::Message;
use tessera_types::{IssuedToken, UserId, UserType};

use crate::host::ip_to_num;
use crate::identity::{RawIdentity, WireIdentity};
use crate::{AuthError, DecodeError};

/// URL-safe alphabet; emits padding, accepts it either way.
const TOKEN_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const BASE32_DIGITS: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Stateless encoder/decoder for issued tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenCodec;

impl TokenCodec {
    /// Create a codec
    pub const fn new() -> Self {
        Self
    }

    /// Issue a token for a signed-in user.
    ///
    /// # Errors
    /// `InvalidInput` when the user id is not positive or the host is not an
    /// IPv4 address. Both are caller bugs: a token without identity must never
    /// be minted.
    pub fn encode(
        &self,
        user_id: UserId,
        user_type: UserType,
        host_ip: &str,
    ) -> Result<IssuedToken, AuthError> {
        if !user_id.is_valid() {
            tracing::warn!(user_id = %user_id, "refusing to issue token for invalid user id");
            return Err(AuthError::InvalidInput(format!("invalid user id {user_id}")));
        }

        let host = ip_to_num(host_ip).ok_or_else(|| {
            tracing::warn!(host = host_ip, "refusing to issue token for invalid host");
            AuthError::InvalidInput(format!("invalid host {host_ip:?}"))
        })?;

        Ok(self.encode_identity(&RawIdentity::issue(user_id, user_type, host)))
    }

    /// Encode an already-built identity.
    pub fn encode_identity(&self, identity: &RawIdentity) -> IssuedToken {
        let payload = TOKEN_ENGINE.encode(identity.to_wire().encode_to_vec());

        let mut token = String::with_capacity(payload.len() + 1);
        token.push(checksum_of(&payload));
        token.push_str(&swap_pairs(&payload));
        IssuedToken::new(token)
    }

    /// Recover the identity from a token string.
    ///
    /// The check digit is verified before any base64 or binary decoding so
    /// corrupted input is rejected cheaply.
    pub fn decode(&self, token: &str) -> Result<RawIdentity, DecodeError> {
        if token.trim().is_empty() {
            return Err(DecodeError::Blank);
        }

        let mut chars = token.chars();
        let code = chars.next().ok_or(DecodeError::Blank)?;
        let swapped = chars.as_str();
        if swapped.is_empty() {
            return Err(DecodeError::TooShort);
        }

        let payload = swap_pairs(swapped);
        if checksum_of(&payload) != code {
            return Err(DecodeError::ChecksumMismatch);
        }

        let bytes = TOKEN_ENGINE.decode(payload.as_bytes())?;
        let wire = WireIdentity::decode(bytes.as_slice())?;
        RawIdentity::from_wire(wire)
    }
}

/// Check digit of a payload.
pub fn checksum_of(payload: &str) -> char {
    let sum = payload
        .encode_utf16()
        .fold(0u32, |acc, unit| acc.wrapping_add(u32::from(unit)));
    char::from(BASE32_DIGITS[(sum % 32) as usize])
}

/// Swap characters `2i` and `2i + 1`; an odd trailing character stays put.
///
/// The transform is its own inverse.
pub fn swap_pairs(input: &str) -> String {
    let mut chars: Vec<char> = input.chars().collect();
    for pair in chars.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
    chars.into_iter().collect()
}
