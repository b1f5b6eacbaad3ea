//! Scenario: one way of triggering an event, optionally gated by variables.
//!
//! A scenario owns an ordered list of [`Question`]s. Trigger questions are the
//! phrases (or regex patterns) that resolve to the scenario; variable questions
//! are prompts the bot asks, one per turn, before the event executes. Each
//! variable question yields one [`RequiredVariable`] slot, in question order.

use serde::{Deserialize, Serialize};

use crate::error::{BotError, ValidationError};
use crate::id::{EventId, QuestionId, ScenarioId};

/// A stored dictionary question.
///
/// For trigger questions `text` is the phrase users type and `answer` the
/// reply template. For variable questions `text` is the prompt shown to the
/// user and `answer` names the variable being collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub pattern: Option<String>,
    pub capture_group: Option<usize>,
    pub answer: String,
    pub is_variable: bool,
}

impl Question {
    /// A plain trigger phrase matched by prefix.
    #[must_use]
    pub fn trigger(text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            id: QuestionId::default(),
            text: text.into(),
            pattern: None,
            capture_group: None,
            answer: answer.into(),
            is_variable: false,
        }
    }

    /// A trigger matched by regex. When `capture_group` is set, the captured
    /// substring is substituted into the answer template.
    #[must_use]
    pub fn pattern(
        text: impl Into<String>,
        pattern: impl Into<String>,
        capture_group: Option<usize>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: QuestionId::default(),
            text: text.into(),
            pattern: Some(pattern.into()),
            capture_group,
            answer: answer.into(),
            is_variable: false,
        }
    }

    /// A prompt collecting the variable `name`.
    #[must_use]
    pub fn variable(prompt: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: QuestionId::default(),
            text: prompt.into(),
            pattern: None,
            capture_group: None,
            answer: name.into(),
            is_variable: true,
        }
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] when the text is blank or the pattern
    /// does not compile.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::EmptyQuestion.into());
        }
        if let Some(pattern) = &self.pattern
            && regex::Regex::new(pattern).is_err()
        {
            return Err(ValidationError::InvalidPattern(pattern.clone()).into());
        }
        Ok(())
    }
}

/// One slot filled by a single user answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredVariable {
    pub name: String,
    pub question: String,
    pub value: String,
}

impl RequiredVariable {
    /// Build an empty slot from a variable question.
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            name: question.answer.clone(),
            question: question.text.clone(),
            value: String::new(),
        }
    }

    #[must_use]
    pub fn is_filled(&self) -> bool {
        !self.value.is_empty()
    }
}

/// A scenario with its questions and variable slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    pub event_id: EventId,
    pub questions: Vec<Question>,
    pub required_variables: Vec<RequiredVariable>,
}

impl Scenario {
    /// Create a builder for constructing a [`Scenario`].
    #[must_use]
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }

    /// Rebuild a stored scenario from its persisted questions.
    ///
    /// Stored rows were validated on insert, so no validation runs here.
    #[must_use]
    pub fn from_stored(
        id: ScenarioId,
        name: impl Into<String>,
        event_id: EventId,
        questions: Vec<Question>,
    ) -> Self {
        let required_variables = questions
            .iter()
            .filter(|q| q.is_variable)
            .map(RequiredVariable::from_question)
            .collect();
        Self {
            id,
            name: name.into(),
            event_id,
            questions,
            required_variables,
        }
    }

    /// Whether triggering this scenario opens a multi-turn conversation.
    ///
    /// A conversation is needed when the scenario has more than one question
    /// and at least one of them collects a variable.
    #[must_use]
    pub fn needs_conversation(&self) -> bool {
        self.questions.len() > 1 && !self.required_variables.is_empty()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] when `name` is empty or any question
    /// is invalid.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.questions.iter().try_for_each(Question::validate)
    }
}

/// Step-by-step builder for [`Scenario`].
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    id: Option<ScenarioId>,
    name: Option<String>,
    event_id: Option<EventId>,
    questions: Vec<Question>,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn id(mut self, id: ScenarioId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    #[must_use]
    pub fn question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    #[must_use]
    pub fn questions(mut self, questions: impl IntoIterator<Item = Question>) -> Self {
        self.questions.extend(questions);
        self
    }

    /// Consume the builder, derive the variable slots, validate, and return a
    /// [`Scenario`].
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] if the name is missing or a question
    /// is invalid.
    pub fn build(self) -> Result<Scenario, BotError> {
        let required_variables = self
            .questions
            .iter()
            .filter(|q| q.is_variable)
            .map(RequiredVariable::from_question)
            .collect();
        let scenario = Scenario {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            event_id: self.event_id.unwrap_or_default(),
            questions: self.questions,
            required_variables,
        };
        scenario.validate()?;
        Ok(scenario)
    }
}
