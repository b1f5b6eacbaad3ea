//! Conversation: per-channel progress through a scenario's variables.
//!
//! ```text
//! NONE ──add──▶ ACTIVE ──last answer──▶ READY ──executed──▶ (removed)
//!                  │                                 ▲
//!                  └──── cancel / idle timeout ──────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::id::{EventId, QuestionId, ScenarioId};
use crate::message::BotMessage;
use crate::scenario::{RequiredVariable, Scenario};
use crate::time::Timestamp;

/// Lifecycle state of a stored conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// At least one variable is still empty.
    Active,
    /// Every variable is filled; the event may run.
    Ready,
}

/// The last question that moved the conversation forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastQuestion {
    pub id: QuestionId,
    pub text: String,
    pub ts: Timestamp,
}

/// A multi-turn conversation bound to one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub channel: String,
    pub scenario_id: ScenarioId,
    pub event_id: EventId,
    pub reaction_type: String,
    /// The text that triggered the scenario.
    pub command: String,
    pub required_variables: Vec<RequiredVariable>,
    pub last_question: LastQuestion,
    pub ready_to_execute: bool,
}

impl Conversation {
    /// Start a conversation for `scenario`, triggered by `message`.
    #[must_use]
    pub fn start(scenario: &Scenario, message: &BotMessage) -> Self {
        let dictionary = &message.dictionary;
        Self {
            channel: message.channel.clone(),
            scenario_id: scenario.id,
            event_id: dictionary.event_id,
            reaction_type: dictionary.reaction_type.clone(),
            command: message.text.clone(),
            required_variables: scenario.required_variables.clone(),
            last_question: LastQuestion {
                id: dictionary.question_id,
                text: dictionary.question.clone(),
                ts: message.timestamp,
            },
            ready_to_execute: false,
        }
    }

    /// Write `answer` into the first empty slot.
    ///
    /// Returns `false` when there was no empty slot to fill.
    pub fn record_answer(&mut self, answer: &str, ts: Timestamp) -> bool {
        let Some(slot) = self.required_variables.iter_mut().find(|v| !v.is_filled()) else {
            return false;
        };
        slot.value = answer.to_string();
        self.last_question.ts = ts;
        true
    }

    /// The next slot still waiting for an answer.
    #[must_use]
    pub fn next_unanswered(&self) -> Option<&RequiredVariable> {
        self.required_variables.iter().find(|v| !v.is_filled())
    }

    /// `true` iff every variable is non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.required_variables.iter().all(RequiredVariable::is_filled)
    }

    #[must_use]
    pub fn state(&self) -> ConversationState {
        if self.ready_to_execute || self.is_complete() {
            ConversationState::Ready
        } else {
            ConversationState::Active
        }
    }

    /// Variable values joined with `;`, as stored in execution history.
    #[must_use]
    pub fn joined_values(&self) -> String {
        join_values(&self.required_variables)
    }

    /// Whether the last activity is strictly older than `threshold` at `now`.
    #[must_use]
    pub fn is_idle(&self, now: Timestamp, threshold: chrono::Duration) -> bool {
        now - self.last_question.ts > threshold
    }
}

/// Join variable values with `;`.
#[must_use]
pub fn join_values(variables: &[RequiredVariable]) -> String {
    variables
        .iter()
        .map(|v| v.value.as_str())
        .collect::<Vec<_>>()
        .join(";")
}
