//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`BotError`]
//! via `#[from]`. "Nothing matched" is never an error: resolvers return an
//! empty envelope and the schedule parser an empty [`ExecuteAt`](crate::schedule::ExecuteAt).

/// Top-level error shared by ports and services.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A storage collaborator failed. Aborts processing of the current message.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// An event implementation failed while executing.
    #[error("event execution failed")]
    Execution(#[from] ExecutionError),

    /// The chat transport could not deliver a message.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Invariant violations detected by builders and `validate()` methods.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("alias must not be empty")]
    EmptyAlias,

    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("channel must not be empty")]
    EmptyChannel,

    #[error("invalid regex pattern `{0}`")]
    InvalidPattern(String),

    #[error("event alias `{0}` is already registered")]
    DuplicateAlias(String),
}

/// A lookup by identifier returned nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} `{id}` not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// An event's `execute` returned a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event `{alias}` failed: {reason}")]
pub struct ExecutionError {
    pub alias: String,
    pub reason: String,
}

impl ExecutionError {
    #[must_use]
    pub fn new(alias: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_bot_error() {
        let err: BotError = ValidationError::EmptyName.into();
        assert!(matches!(
            err,
            BotError::Validation(ValidationError::EmptyName)
        ));
    }

    #[test]
    fn should_render_not_found_message() {
        let err = NotFoundError {
            entity: "Event",
            id: "write_message".to_string(),
        };
        assert_eq!(err.to_string(), "Event `write_message` not found");
    }

    #[test]
    fn should_render_execution_error_with_alias_and_reason() {
        let err = ExecutionError::new("schedule", "no time given");
        assert_eq!(err.to_string(), "event `schedule` failed: no time given");
    }
}
