//! Reviewer identifiers issued by the auth provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a string is not a [`UserId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// Nothing was supplied.
    #[error("user id must not be empty")]
    EmptyId,
    /// The value is not a UUID, or carries surrounding whitespace.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Provider-issued reviewer id.
///
/// Held in canonical lower-case hyphenated UUID form, which is how the auth
/// provider writes `user_id` columns, so equality matches the backend's.
///
/// # Examples
/// ```
/// use board::domain::UserId;
///
/// let id = UserId::new("3FA85F64-5717-4562-B3FC-2C963F66AFA6").expect("valid id");
/// assert_eq!(id.as_ref(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// assert!(UserId::new("not-a-uuid").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate `id`.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        id.as_ref().parse()
    }

    /// Fresh random id, for anonymous fixtures and tests.
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.hyphenated().to_string())
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(raw)
            .map(Self::from_uuid)
            .map_err(|_| UserValidationError::InvalidId)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("", UserValidationError::EmptyId)]
    #[case::padded(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    #[case::not_uuid("user-42", UserValidationError::InvalidId)]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[test]
    fn spellings_of_one_uuid_compare_equal() {
        let upper = UserId::new("3FA85F64-5717-4562-B3FC-2C963F66AFA6").expect("valid id");
        let lower: UserId = serde_json::from_str("\"3fa85f64-5717-4562-b3fc-2c963f66afa6\"")
            .expect("valid id");
        assert_eq!(upper, lower);
    }

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(UserId::random(), UserId::random());
    }
}
