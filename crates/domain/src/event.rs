//! Event: a registered automation capability, identified by its alias.
//!
//! The alias doubles as the *reaction type* carried by dictionary envelopes:
//! the dispatcher looks the implementation up in the registry by this string.

use serde::{Deserialize, Serialize};

use crate::error::{BotError, ValidationError};
use crate::id::EventId;

/// An installed event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub alias: String,
    pub installed_version: String,
}

impl Event {
    /// Create an event that has not been persisted yet.
    #[must_use]
    pub fn new(alias: impl Into<String>, installed_version: impl Into<String>) -> Self {
        Self {
            id: EventId::default(),
            alias: alias.into(),
            installed_version: installed_version.into(),
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] when `alias` is blank.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.alias.trim().is_empty() {
            return Err(ValidationError::EmptyAlias.into());
        }
        Ok(())
    }

    /// Whether the installed dictionary data lags behind `version`.
    #[must_use]
    pub fn needs_update(&self, version: &str) -> bool {
        self.installed_version != version
    }
}
