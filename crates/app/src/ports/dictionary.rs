//! Dictionary port: stored questions, regexes, scenarios and events.

use std::future::Future;

use scenariobot_domain::dictionary::{DictionaryMessage, QuestionObject, QuestionRegex};
use scenariobot_domain::error::BotError;
use scenariobot_domain::event::Event;
use scenariobot_domain::id::{EventId, QuestionId, RegexId, ScenarioId};
use scenariobot_domain::scenario::Question;

/// Read and provisioning access to the question dictionary.
///
/// Lookups only ever consider trigger questions; variable prompts are never
/// matched against user text.
pub trait DictionaryRepository {
    /// All stored regexes, ordered by id ascending.
    fn regexes(&self) -> impl Future<Output = Result<Vec<QuestionRegex>, BotError>> + Send;

    /// The envelope for the lowest-id question joined to `regex_id`.
    fn find_by_regex(
        &self,
        regex_id: RegexId,
    ) -> impl Future<Output = Result<Option<DictionaryMessage>, BotError>> + Send;

    /// The envelope for the lowest-id question whose text is a prefix of `text`.
    fn find_by_prefix(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<DictionaryMessage>, BotError>> + Send;

    /// Questions of a scenario ordered by id, optionally only variable prompts.
    fn questions_by_scenario(
        &self,
        scenario_id: ScenarioId,
        only_variables: bool,
    ) -> impl Future<Output = Result<Vec<QuestionObject>, BotError>> + Send;

    /// Text of every trigger question, ordered by id.
    fn trigger_questions(&self) -> impl Future<Output = Result<Vec<String>, BotError>> + Send;

    /// Look an installed event up by alias.
    fn find_event(
        &self,
        alias: &str,
    ) -> impl Future<Output = Result<Option<Event>, BotError>> + Send;

    /// Insert an event row and return its id.
    fn install_event(
        &self,
        alias: &str,
        version: &str,
    ) -> impl Future<Output = Result<EventId, BotError>> + Send;

    /// Record that `event_id` now carries dictionary data for `version`.
    fn update_event_version(
        &self,
        event_id: EventId,
        version: &str,
    ) -> impl Future<Output = Result<(), BotError>> + Send;

    /// Look a scenario up by event and name.
    fn find_scenario(
        &self,
        event_id: EventId,
        name: &str,
    ) -> impl Future<Output = Result<Option<ScenarioId>, BotError>> + Send;

    /// Insert a scenario row and return its id.
    fn insert_scenario(
        &self,
        name: &str,
        event_id: EventId,
    ) -> impl Future<Output = Result<ScenarioId, BotError>> + Send;

    /// Insert a question (and its regex, when it has one) into a scenario.
    fn insert_question(
        &self,
        scenario_id: ScenarioId,
        question: &Question,
    ) -> impl Future<Output = Result<QuestionId, BotError>> + Send;
}

impl<T: DictionaryRepository + Send + Sync> DictionaryRepository for std::sync::Arc<T> {
    fn regexes(&self) -> impl Future<Output = Result<Vec<QuestionRegex>, BotError>> + Send {
        (**self).regexes()
    }

    fn find_by_regex(
        &self,
        regex_id: RegexId,
    ) -> impl Future<Output = Result<Option<DictionaryMessage>, BotError>> + Send {
        (**self).find_by_regex(regex_id)
    }

    fn find_by_prefix(
        &self,
        text: &str,
    ) -> impl Future<Output = Result<Option<DictionaryMessage>, BotError>> + Send {
        (**self).find_by_prefix(text)
    }

    fn questions_by_scenario(
        &self,
        scenario_id: ScenarioId,
        only_variables: bool,
    ) -> impl Future<Output = Result<Vec<QuestionObject>, BotError>> + Send {
        (**self).questions_by_scenario(scenario_id, only_variables)
    }

    fn trigger_questions(&self) -> impl Future<Output = Result<Vec<String>, BotError>> + Send {
        (**self).trigger_questions()
    }

    fn find_event(
        &self,
        alias: &str,
    ) -> impl Future<Output = Result<Option<Event>, BotError>> + Send {
        (**self).find_event(alias)
    }

    fn install_event(
        &self,
        alias: &str,
        version: &str,
    ) -> impl Future<Output = Result<EventId, BotError>> + Send {
        (**self).install_event(alias, version)
    }

    fn update_event_version(
        &self,
        event_id: EventId,
        version: &str,
    ) -> impl Future<Output = Result<(), BotError>> + Send {
        (**self).update_event_version(event_id, version)
    }

    fn find_scenario(
        &self,
        event_id: EventId,
        name: &str,
    ) -> impl Future<Output = Result<Option<ScenarioId>, BotError>> + Send {
        (**self).find_scenario(event_id, name)
    }

    fn insert_scenario(
        &self,
        name: &str,
        event_id: EventId,
    ) -> impl Future<Output = Result<ScenarioId, BotError>> + Send {
        (**self).insert_scenario(name, event_id)
    }

    fn insert_question(
        &self,
        scenario_id: ScenarioId,
        question: &Question,
    ) -> impl Future<Output = Result<QuestionId, BotError>> + Send {
        (**self).insert_question(scenario_id, question)
    }
}
