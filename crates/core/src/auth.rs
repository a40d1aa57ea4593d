use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Reserved identity used for internal, service-originated calls.
///
/// Never a real group member; always resolves to the full permission universe.
pub const SYSTEM_ACTOR_ID: &str = "000000000000000000000000";

/// Verified identity on whose behalf a permission check runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActorId(String);

impl ActorId {
    /// Creates an actor identifier from a verified subject value.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "actor id must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reserved system actor.
    #[must_use]
    pub fn system() -> Self {
        Self(SYSTEM_ACTOR_ID.to_owned())
    }

    /// Returns whether this is the reserved system actor.
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.0 == SYSTEM_ACTOR_ID
    }

    /// Returns the underlying identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for ActorId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActorId> for String {
    fn from(value: ActorId) -> Self {
        value.0
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActorId, SYSTEM_ACTOR_ID};

    #[test]
    fn actor_id_rejects_blank_values() {
        assert!(ActorId::new("  ").is_err());
    }

    #[test]
    fn actor_id_trims_surrounding_whitespace() {
        let actor = ActorId::new(" u1 ").unwrap_or_else(|_| unreachable!());
        assert_eq!(actor.as_str(), "u1");
    }

    #[test]
    fn system_actor_is_recognised_from_literal() {
        let parsed = ActorId::new(SYSTEM_ACTOR_ID).unwrap_or_else(|_| unreachable!());
        assert!(parsed.is_system());
        assert_eq!(parsed, ActorId::system());
    }
}
