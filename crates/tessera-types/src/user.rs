//! User types

use serde::{Deserialize, Serialize};

use crate::TypeError;

/// Unique user identifier
///
/// Ids are issued by the account system; only positive values identify a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i32);

impl UserId {
    /// Wrap a raw id
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw integer value
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether the id can belong to a real user
    pub const fn is_valid(self) -> bool {
        self.0 > 0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Kind of account a user holds
///
/// Codes are part of the token wire format and of the stored context record,
/// so they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum UserType {
    /// Regular member
    Member,
    /// Maker
    Maker,
    /// City-level agent
    CityAgent,
    /// Regional agent
    RegionalAgent,
    /// Operation center staff
    OperationCenter,
}

impl UserType {
    /// All variants, lowest code first
    pub const ALL: [UserType; 5] = [
        Self::Member,
        Self::Maker,
        Self::CityAgent,
        Self::RegionalAgent,
        Self::OperationCenter,
    ];

    /// Numeric wire code
    pub const fn code(&self) -> i32 {
        match self {
            Self::Member => 1,
            Self::Maker => 3,
            Self::CityAgent => 5,
            Self::RegionalAgent => 7,
            Self::OperationCenter => 9,
        }
    }

    /// Stable lowercase name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Maker => "maker",
            Self::CityAgent => "city_agent",
            Self::RegionalAgent => "regional_agent",
            Self::OperationCenter => "operation_center",
        }
    }
}

impl TryFrom<i32> for UserType {
    type Error = TypeError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(TypeError::UnknownUserType(code))
    }
}

impl From<UserType> for i32 {
    fn from(user_type: UserType) -> Self {
        user_type.code()
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or(TypeError::UnknownUserTypeName(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validity() {
        assert!(UserId::new(42).is_valid());
        assert!(!UserId::new(0).is_valid());
        assert!(!UserId::new(-7).is_valid());
        assert_eq!(UserId::from(42).to_string(), "42");
    }

    #[test]
    fn test_user_type_codes_roundtrip() {
        for user_type in UserType::ALL {
            assert_eq!(UserType::try_from(user_type.code()), Ok(user_type));
        }
    }

    #[test]
    fn test_user_type_rejects_unknown_code() {
        assert_eq!(UserType::try_from(2), Err(TypeError::UnknownUserType(2)));
        assert_eq!(UserType::try_from(0), Err(TypeError::UnknownUserType(0)));
    }

    #[test]
    fn test_user_type_from_name() {
        assert_eq!("member".parse::<UserType>(), Ok(UserType::Member));
        assert_eq!(" City_Agent ".parse::<UserType>(), Ok(UserType::CityAgent));
        assert!("admin".parse::<UserType>().is_err());
    }

    #[test]
    fn test_user_type_serializes_as_code() {
        let json = serde_json::to_string(&UserType::RegionalAgent).unwrap();
        assert_eq!(json, "7");
        let parsed: UserType = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, UserType::OperationCenter);
        assert!(serde_json::from_str::<UserType>("4").is_err());
    }
}
