//! Plaintext identity carried inside a token

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use rand::Rng;
use tessera_types::{UserId, UserType};

use crate::host::num_to_ip;
use crate::DecodeError;

/// Reference point of `issued_at_millis`: 2019-01-01T00:00:00+08:00.
pub const EPOCH_MILLIS: i64 = 1_546_272_000_000;

/// Exclusive upper bound of the per-issuance salt.
pub const SALT_BOUND: i32 = 100_100_100;

/// Salted wire record.
///
/// Field tags are fixed by tokens already in circulation. Every integer
/// except `salt` is stored as `value + salt` with 32/64-bit wrapping.
#[derive(Clone, PartialEq, prost::Message)]
pub(crate) struct WireIdentity {
    #[prost(int32, optional, tag = "1")]
    pub user_id: Option<i32>,
    #[prost(int64, optional, tag = "2")]
    pub issued_at: Option<i64>,
    #[prost(int64, optional, tag = "3")]
    pub host: Option<i64>,
    #[prost(int32, optional, tag = "4")]
    pub user_type: Option<i32>,
    #[prost(int32, optional, tag = "5")]
    pub salt: Option<i32>,
}

/// Identity fields of a token before salting.
///
/// Built once at issuance and rebuilt at decode time; never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawIdentity {
    user_id: Option<i32>,
    user_type: Option<i32>,
    host: Option<i64>,
    issued_at_millis: i64,
    salt: i32,
}

impl RawIdentity {
    /// Assemble an identity from already-known parts.
    pub fn new(
        user_id: Option<i32>,
        user_type: Option<i32>,
        host: Option<i64>,
        issued_at_millis: i64,
        salt: i32,
    ) -> Self {
        Self {
            user_id,
            user_type,
            host,
            issued_at_millis,
            salt,
        }
    }

    /// Fresh identity stamped with the current time and a random salt.
    pub fn issue(user_id: UserId, user_type: UserType, host: u32) -> Self {
        let salt = rand::thread_rng().gen_range(0..SALT_BOUND);
        Self::new(
            Some(user_id.get()),
            Some(user_type.code()),
            Some(i64::from(host)),
            Utc::now().timestamp_millis() - EPOCH_MILLIS,
            salt,
        )
    }

    /// Raw user id
    pub fn raw_user_id(&self) -> Option<i32> {
        self.user_id
    }

    /// User id, if the token carries one
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id.map(UserId)
    }

    /// Raw user type code
    pub fn raw_user_type(&self) -> Option<i32> {
        self.user_type
    }

    /// User type, if the code is a known one
    pub fn user_type(&self) -> Option<UserType> {
        self.user_type.and_then(|code| UserType::try_from(code).ok())
    }

    /// Packed sign-in host
    pub fn host(&self) -> Option<i64> {
        self.host
    }

    /// Sign-in host as an address
    pub fn host_ip(&self) -> Option<Ipv4Addr> {
        self.host.and_then(num_to_ip)
    }

    /// Milliseconds since [`EPOCH_MILLIS`]
    pub fn issued_at_millis(&self) -> i64 {
        self.issued_at_millis
    }

    /// Issuance instant
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(EPOCH_MILLIS.checked_add(self.issued_at_millis)?)
    }

    /// Per-issuance salt
    pub fn salt(&self) -> i32 {
        self.salt
    }

    pub(crate) fn to_wire(self) -> WireIdentity {
        let salt = self.salt;
        WireIdentity {
            user_id: self.user_id.map(|v| v.wrapping_add(salt)),
            issued_at: Some(self.issued_at_millis.wrapping_add(i64::from(salt))),
            host: self.host.map(|v| v.wrapping_add(i64::from(salt))),
            user_type: self.user_type.map(|v| v.wrapping_add(salt)),
            salt: Some(salt),
        }
    }

    pub(crate) fn from_wire(wire: WireIdentity) -> Result<Self, DecodeError> {
        let salt = wire.salt.ok_or(DecodeError::MissingField("salt"))?;
        let issued_at = wire.issued_at.ok_or(DecodeError::MissingField("issued_at"))?;
        Ok(Self {
            user_id: wire.user_id.map(|v| v.wrapping_sub(salt)),
            user_type: wire.user_type.map(|v| v.wrapping_sub(salt)),
            host: wire.host.map(|v| v.wrapping_sub(i64::from(salt))),
            issued_at_millis: issued_at.wrapping_sub(i64::from(salt)),
            salt,
        })
    }
}
