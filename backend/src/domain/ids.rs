//! Opaque string identifiers for adventure records.
//!
//! Seeded records use readable ids such as `user-1` and `trail-1`; records
//! created at runtime receive UUIDs. Both shapes share one validation rule.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest identifier accepted from clients.
pub const ID_MAX_LEN: usize = 64;

/// Validation failures for record identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdValidationError {
    /// The id was empty.
    #[error("id must not be empty")]
    Empty,
    /// The id exceeded [`ID_MAX_LEN`].
    #[error("id must be at most {ID_MAX_LEN} characters")]
    TooLong,
    /// The id contained characters other than ASCII letters, digits, `-` or `_`.
    #[error("id may only contain letters, digits, '-' or '_'")]
    InvalidCharacters,
}

fn validate(raw: &str) -> Result<(), IdValidationError> {
    if raw.is_empty() {
        return Err(IdValidationError::Empty);
    }
    if raw.len() > ID_MAX_LEN {
        return Err(IdValidationError::TooLong);
    }
    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(IdValidationError::InvalidCharacters);
    }
    Ok(())
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap an identifier.
            ///
            /// # Errors
            /// Returns [`IdValidationError`] when the id is empty, too long
            /// or contains unsupported characters.
            pub fn new(raw: impl Into<String>) -> Result<Self, IdValidationError> {
                let raw = raw.into();
                validate(&raw)?;
                Ok(Self(raw))
            }

            /// Generate a fresh random identifier.
            #[must_use]
            pub fn random() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Borrow the identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

record_id!(
    /// Identifier of a platform user.
    UserId
);
record_id!(
    /// Identifier of a hiking trail.
    TrailId
);
record_id!(
    /// Identifier of a community post.
    PostId
);
record_id!(
    /// Identifier of a comment on a community post.
    CommentId
);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user-1")]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    #[case("admin_1")]
    fn accepts_seed_and_uuid_shapes(#[case] raw: &str) {
        assert_eq!(UserId::new(raw).expect("valid id").as_str(), raw);
    }

    #[rstest]
    #[case("", IdValidationError::Empty)]
    #[case("../etc", IdValidationError::InvalidCharacters)]
    #[case("with space", IdValidationError::InvalidCharacters)]
    fn rejects_malformed_ids(#[case] raw: &str, #[case] expected: IdValidationError) {
        assert_eq!(TrailId::new(raw), Err(expected));
    }

    #[rstest]
    fn rejects_overlong_ids() {
        let raw = "a".repeat(ID_MAX_LEN + 1);
        assert_eq!(PostId::new(raw), Err(IdValidationError::TooLong));
    }

    #[rstest]
    fn random_ids_are_valid() {
        let id = CommentId::random();
        assert!(CommentId::new(id.as_str()).is_ok());
    }
}
