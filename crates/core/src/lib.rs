//! Shared primitives for all Rust crates in Huddle.

#![forbid(unsafe_code)]

/// Actor identity primitives shared across services.
pub mod auth;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{ActorId, SYSTEM_ACTOR_ID};

/// Result type used across Huddle crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested group, role, panel or member does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor has no membership record in the group.
    #[error("not a member: {0}")]
    NotAMember(String),

    /// Resolved permission set lacks the required key.
    #[error("no permission: {0}")]
    NoPermission(String),

    /// Two roles in one group share an identifier.
    #[error("duplicate role id: {0}")]
    DuplicateRoleId(String),

    /// A permission key was registered twice in the catalog.
    #[error("duplicate permission key: {0}")]
    DuplicatePermissionKey(String),

    /// A role identifier collides with the reserved all-members key.
    #[error("reserved key conflict: {0}")]
    ReservedKeyConflict(String),

    /// A member field name outside the guarded set was requested.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// Request carries no usable actor identity.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(result.is_err());
    }

    #[test]
    fn non_empty_string_conversion_is_validated() {
        let parsed = NonEmptyString::try_from("\t".to_owned());
        assert!(matches!(parsed, Err(AppError::Validation(_))));
    }

    #[test]
    fn error_messages_carry_category() {
        let error = AppError::NotAMember("user 'u3' in group 'g1'".to_owned());
        assert_eq!(error.to_string(), "not a member: user 'u3' in group 'g1'");
    }
}
