//! Execution history: one append-only record per successful event run.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, HistoryId, QuestionId, ScenarioId};
use crate::time::Timestamp;

/// A record of an event executed on behalf of a user in a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub id: HistoryId,
    pub event_id: EventId,
    pub scenario_id: ScenarioId,
    pub user: String,
    pub channel: String,
    pub command: String,
    /// Collected variable values joined with `;`.
    pub variables: String,
    pub last_question_id: QuestionId,
    pub created: Timestamp,
}

impl ExecutionRecord {
    /// Create a builder for constructing an [`ExecutionRecord`].
    #[must_use]
    pub fn builder() -> ExecutionRecordBuilder {
        ExecutionRecordBuilder::default()
    }

    /// Split the stored variable string back into values.
    #[must_use]
    pub fn variable_values(&self) -> Vec<&str> {
        if self.variables.is_empty() {
            return Vec::new();
        }
        self.variables.split(';').collect()
    }

    /// Creation time as unix seconds.
    #[must_use]
    pub fn unix_timestamp(&self) -> i64 {
        self.created.timestamp()
    }
}

/// Step-by-step builder for [`ExecutionRecord`].
#[derive(Debug, Default)]
pub struct ExecutionRecordBuilder {
    id: Option<HistoryId>,
    event_id: Option<EventId>,
    scenario_id: Option<ScenarioId>,
    user: Option<String>,
    channel: Option<String>,
    command: Option<String>,
    variables: Option<String>,
    last_question_id: Option<QuestionId>,
    created: Option<Timestamp>,
}

impl ExecutionRecordBuilder {
    #[must_use]
    pub fn id(mut self, id: HistoryId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    #[must_use]
    pub fn scenario_id(mut self, scenario_id: ScenarioId) -> Self {
        self.scenario_id = Some(scenario_id);
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    #[must_use]
    pub fn channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    #[must_use]
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: impl Into<String>) -> Self {
        self.variables = Some(variables.into());
        self
    }

    #[must_use]
    pub fn last_question_id(mut self, id: QuestionId) -> Self {
        self.last_question_id = Some(id);
        self
    }

    #[must_use]
    pub fn created(mut self, ts: Timestamp) -> Self {
        self.created = Some(ts);
        self
    }

    /// Consume the builder and return an [`ExecutionRecord`].
    ///
    /// Missing fields default to empty values; `created` defaults to now.
    #[must_use]
    pub fn build(self) -> ExecutionRecord {
        ExecutionRecord {
            id: self.id.unwrap_or_default(),
            event_id: self.event_id.unwrap_or_default(),
            scenario_id: self.scenario_id.unwrap_or_default(),
            user: self.user.unwrap_or_default(),
            channel: self.channel.unwrap_or_default(),
            command: self.command.unwrap_or_default(),
            variables: self.variables.unwrap_or_default(),
            last_question_id: self.last_question_id.unwrap_or_default(),
            created: self.created.unwrap_or_else(crate::time::now),
        }
    }
}
