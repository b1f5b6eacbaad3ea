//! Dictionary envelopes: the result of resolving chat text.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, QuestionId, RegexId, ScenarioId};
use crate::scenario::Question;

/// A stored regex that can route text to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRegex {
    pub id: RegexId,
    pub pattern: String,
    pub capture_group: Option<usize>,
}

/// A question row as returned by per-scenario listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionObject {
    pub id: QuestionId,
    pub question: String,
    pub answer: String,
    pub is_variable: bool,
}

impl From<QuestionObject> for Question {
    fn from(row: QuestionObject) -> Self {
        Self {
            id: row.id,
            text: row.question,
            pattern: None,
            capture_group: None,
            answer: row.answer,
            is_variable: row.is_variable,
        }
    }
}

/// Resolved-answer envelope produced per resolution call.
///
/// The [`Default`] value is the "nothing matched" envelope.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryMessage {
    pub scenario_id: ScenarioId,
    pub event_id: EventId,
    pub question_id: QuestionId,
    pub question: String,
    pub answer: String,
    pub regex: Option<String>,
    pub capture_group: Option<usize>,
    pub reaction_type: String,
}

impl DictionaryMessage {
    /// `true` for the "nothing matched" envelope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.question_id.is_unset() && self.reaction_type.is_empty()
    }
}

/// Substitute `value` for the first `%s` in `template`.
///
/// Only one placeholder is ever filled; templates without a placeholder are
/// returned unchanged.
#[must_use]
pub fn format_answer(template: &str, value: &str) -> String {
    match template.find("%s") {
        Some(pos) => {
            let mut out = String::with_capacity(template.len() + value.len());
            out.push_str(&template[..pos]);
            out.push_str(value);
            out.push_str(&template[pos + 2..]);
            out
        }
        None => template.to_string(),
    }
}
