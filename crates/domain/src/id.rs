//! Typed identifier newtypes.
//!
//! Dictionary and history rows are keyed by storage-assigned integers; the
//! zero value means "unset" and is what an empty
//! [`DictionaryMessage`](crate::dictionary::DictionaryMessage) carries.
//! In-process schedule items are keyed by random UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_row_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a storage row id.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Access the inner row id.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }

            /// `true` when the id was never assigned by storage.
            #[must_use]
            pub const fn is_unset(self) -> bool {
                self.0 == 0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

define_row_id!(
    /// Unique identifier for an [`Event`](crate::event::Event).
    EventId
);

define_row_id!(
    /// Unique identifier for a [`Scenario`](crate::scenario::Scenario).
    ScenarioId
);

define_row_id!(
    /// Unique identifier for a [`Question`](crate::scenario::Question).
    QuestionId
);

define_row_id!(
    /// Unique identifier for a stored question regex.
    RegexId
);

define_row_id!(
    /// Unique identifier for an [`ExecutionRecord`](crate::history::ExecutionRecord).
    HistoryId
);

/// Unique identifier for a [`ScheduledItem`](crate::schedule::ScheduledItem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleId(uuid::Uuid);

impl Default for ScheduleId {
    fn default() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl ScheduleId {
    /// Generate a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the inner UUID.
    #[must_use]
    pub fn as_uuid(self) -> uuid::Uuid {
        self.0
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ScheduleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s).map(Self)
    }
}
