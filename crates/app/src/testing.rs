//! In-memory port fakes shared by the unit tests of this crate.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use scenariobot_domain::dictionary::{DictionaryMessage, QuestionObject, QuestionRegex};
use scenariobot_domain::error::{BotError, ExecutionError};
use scenariobot_domain::event::Event;
use scenariobot_domain::history::ExecutionRecord;
use scenariobot_domain::id::{EventId, HistoryId, QuestionId, RegexId, ScenarioId};
use scenariobot_domain::message::{BotMessage, OutgoingMessage};
use scenariobot_domain::scenario::{Question, Scenario};

use crate::ports::{ChatEvent, ChatTransport, DictionaryRepository, HistoryRepository};

#[derive(Clone)]
struct StoredQuestion {
    id: QuestionId,
    scenario_id: ScenarioId,
    text: String,
    answer: String,
    regex_id: Option<RegexId>,
    is_variable: bool,
}

#[derive(Default)]
struct DictionaryState {
    events: Vec<Event>,
    scenarios: Vec<(ScenarioId, String, EventId)>,
    questions: Vec<StoredQuestion>,
    regexes: Vec<QuestionRegex>,
}

impl DictionaryState {
    fn envelope(&self, question: &StoredQuestion) -> DictionaryMessage {
        let event_id = self
            .scenarios
            .iter()
            .find(|(id, _, _)| *id == question.scenario_id)
            .map(|(_, _, event_id)| *event_id)
            .unwrap_or_default();
        let reaction_type = self
            .events
            .iter()
            .find(|e| e.id == event_id)
            .map(|e| e.alias.clone())
            .unwrap_or_default();
        let regex = question
            .regex_id
            .and_then(|id| self.regexes.iter().find(|r| r.id == id));
        DictionaryMessage {
            scenario_id: question.scenario_id,
            event_id,
            question_id: question.id,
            question: question.text.clone(),
            answer: question.answer.clone(),
            regex: regex.map(|r| r.pattern.clone()),
            capture_group: regex.and_then(|r| r.capture_group),
            reaction_type,
        }
    }
}

#[derive(Default)]
pub struct InMemoryDictionary {
    state: Mutex<DictionaryState>,
}

impl InMemoryDictionary {
    /// Install `alias` with `scenarios`, as the installer would.
    pub async fn seed(&self, alias: &str, scenarios: &[Scenario]) -> EventId {
        let event_id = self.install_event(alias, "1").await.unwrap();
        for scenario in scenarios {
            let scenario_id = self.insert_scenario(&scenario.name, event_id).await.unwrap();
            for question in &scenario.questions {
                self.insert_question(scenario_id, question).await.unwrap();
            }
        }
        event_id
    }

    pub fn question_count(&self) -> usize {
        self.state.lock().unwrap().questions.len()
    }
}

impl DictionaryRepository for InMemoryDictionary {
    async fn regexes(&self) -> Result<Vec<QuestionRegex>, BotError> {
        let mut regexes = self.state.lock().unwrap().regexes.clone();
        regexes.sort_by_key(|r| r.id);
        Ok(regexes)
    }

    async fn find_by_regex(&self, regex_id: RegexId) -> Result<Option<DictionaryMessage>, BotError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .questions
            .iter()
            .filter(|q| !q.is_variable && q.regex_id == Some(regex_id))
            .min_by_key(|q| q.id)
            .map(|q| state.envelope(q)))
    }

    async fn find_by_prefix(&self, text: &str) -> Result<Option<DictionaryMessage>, BotError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .questions
            .iter()
            .filter(|q| !q.is_variable && text.starts_with(&q.text))
            .min_by_key(|q| q.id)
            .map(|q| state.envelope(q)))
    }

    async fn questions_by_scenario(
        &self,
        scenario_id: ScenarioId,
        only_variables: bool,
    ) -> Result<Vec<QuestionObject>, BotError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .questions
            .iter()
            .filter(|q| q.scenario_id == scenario_id && (!only_variables || q.is_variable))
            .map(|q| QuestionObject {
                id: q.id,
                question: q.text.clone(),
                answer: q.answer.clone(),
                is_variable: q.is_variable,
            })
            .collect())
    }

    async fn trigger_questions(&self) -> Result<Vec<String>, BotError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .questions
            .iter()
            .filter(|q| !q.is_variable)
            .map(|q| q.text.clone())
            .collect())
    }

    async fn find_event(&self, alias: &str) -> Result<Option<Event>, BotError> {
        let state = self.state.lock().unwrap();
        Ok(state.events.iter().find(|e| e.alias == alias).cloned())
    }

    async fn install_event(&self, alias: &str, version: &str) -> Result<EventId, BotError> {
        let mut state = self.state.lock().unwrap();
        let id = EventId::new(state.events.len() as i64 + 1);
        let mut event = Event::new(alias, version);
        event.id = id;
        state.events.push(event);
        Ok(id)
    }

    async fn update_event_version(&self, event_id: EventId, version: &str) -> Result<(), BotError> {
        let mut state = self.state.lock().unwrap();
        if let Some(event) = state.events.iter_mut().find(|e| e.id == event_id) {
            event.installed_version = version.to_string();
        }
        Ok(())
    }

    async fn find_scenario(
        &self,
        event_id: EventId,
        name: &str,
    ) -> Result<Option<ScenarioId>, BotError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .scenarios
            .iter()
            .find(|(_, n, e)| *e == event_id && n == name)
            .map(|(id, _, _)| *id))
    }

    async fn insert_scenario(&self, name: &str, event_id: EventId) -> Result<ScenarioId, BotError> {
        let mut state = self.state.lock().unwrap();
        let id = ScenarioId::new(state.scenarios.len() as i64 + 1);
        state.scenarios.push((id, name.to_string(), event_id));
        Ok(id)
    }

    async fn insert_question(
        &self,
        scenario_id: ScenarioId,
        question: &Question,
    ) -> Result<QuestionId, BotError> {
        let mut state = self.state.lock().unwrap();
        let regex_id = question.pattern.as_ref().map(|pattern| {
            if let Some(existing) = state.regexes.iter().find(|r| &r.pattern == pattern) {
                existing.id
            } else {
                let id = RegexId::new(state.regexes.len() as i64 + 1);
                state.regexes.push(QuestionRegex {
                    id,
                    pattern: pattern.clone(),
                    capture_group: question.capture_group,
                });
                id
            }
        });
        let id = QuestionId::new(state.questions.len() as i64 + 1);
        state.questions.push(StoredQuestion {
            id,
            scenario_id,
            text: question.text.clone(),
            answer: question.answer.clone(),
            regex_id,
            is_variable: question.is_variable,
        });
        Ok(id)
    }
}

/// A dictionary whose every call fails as if the database were down.
pub struct FailingDictionary;

fn unavailable() -> BotError {
    BotError::Storage("database unavailable".into())
}

impl DictionaryRepository for FailingDictionary {
    async fn regexes(&self) -> Result<Vec<QuestionRegex>, BotError> {
        Err(unavailable())
    }

    async fn find_by_regex(&self, _regex_id: RegexId) -> Result<Option<DictionaryMessage>, BotError> {
        Err(unavailable())
    }

    async fn find_by_prefix(&self, _text: &str) -> Result<Option<DictionaryMessage>, BotError> {
        Err(unavailable())
    }

    async fn questions_by_scenario(
        &self,
        _scenario_id: ScenarioId,
        _only_variables: bool,
    ) -> Result<Vec<QuestionObject>, BotError> {
        Err(unavailable())
    }

    async fn trigger_questions(&self) -> Result<Vec<String>, BotError> {
        Err(unavailable())
    }

    async fn find_event(&self, _alias: &str) -> Result<Option<Event>, BotError> {
        Err(unavailable())
    }

    async fn install_event(&self, _alias: &str, _version: &str) -> Result<EventId, BotError> {
        Err(unavailable())
    }

    async fn update_event_version(&self, _event_id: EventId, _version: &str) -> Result<(), BotError> {
        Err(unavailable())
    }

    async fn find_scenario(
        &self,
        _event_id: EventId,
        _name: &str,
    ) -> Result<Option<ScenarioId>, BotError> {
        Err(unavailable())
    }

    async fn insert_scenario(&self, _name: &str, _event_id: EventId) -> Result<ScenarioId, BotError> {
        Err(unavailable())
    }

    async fn insert_question(
        &self,
        _scenario_id: ScenarioId,
        _question: &Question,
    ) -> Result<QuestionId, BotError> {
        Err(unavailable())
    }
}

#[derive(Default)]
pub struct InMemoryHistory {
    records: Mutex<Vec<ExecutionRecord>>,
}

impl InMemoryHistory {
    pub fn all(&self) -> Vec<ExecutionRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl HistoryRepository for InMemoryHistory {
    async fn append(&self, mut record: ExecutionRecord) -> Result<ExecutionRecord, BotError> {
        let mut records = self.records.lock().unwrap();
        record.id = HistoryId::new(records.len() as i64 + 1);
        records.push(record.clone());
        Ok(record)
    }

    async fn last_for(
        &self,
        channel: &str,
        user: &str,
        exclude_event: EventId,
    ) -> Result<Option<ExecutionRecord>, BotError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .find(|r| r.channel == channel && r.user == user && r.event_id != exclude_event)
            .cloned())
    }

    async fn recent(&self, channel: &str, limit: usize) -> Result<Vec<ExecutionRecord>, BotError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .rev()
            .filter(|r| r.channel == channel)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingTransport {
    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.text.clone()).collect()
    }

    pub fn last_text(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|m| m.text.clone())
    }
}

impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> Result<(), BotError> {
        self.sent.lock().unwrap().push(OutgoingMessage {
            channel: channel.to_string(),
            text: text.to_string(),
            thread_ts: thread_ts.map(str::to_string),
        });
        Ok(())
    }
}

/// An event replying with its collected variables, or failing on demand.
pub struct StubEvent {
    alias: String,
    version: String,
    scenarios: Vec<Scenario>,
    fail: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<BotMessage>>>,
}

impl StubEvent {
    pub fn new(alias: &str, scenarios: Vec<Scenario>) -> Self {
        Self {
            alias: alias.to_string(),
            version: "1".to_string(),
            scenarios,
            fail: false,
            delay: None,
            calls: Arc::default(),
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Sleep for `delay` before replying.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_version(mut self, version: &str) -> Self {
        self.version = version.to_string();
        self
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<BotMessage>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChatEvent for StubEvent {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn help(&self) -> String {
        format!("usage: {}", self.alias)
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn scenarios(&self) -> Vec<Scenario> {
        self.scenarios.clone()
    }

    async fn execute(&self, message: BotMessage) -> Result<BotMessage, BotError> {
        self.calls.lock().unwrap().push(message.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(ExecutionError::new(&self.alias, "boom").into());
        }
        let values: Vec<_> = message.variables.iter().map(|v| v.value.as_str()).collect();
        Ok(message.reply(format!("{} done {}", self.alias, values.join(","))))
    }
}

/// The two-variable scenario used by most dispatcher tests.
pub fn write_message_scenario() -> Scenario {
    Scenario::builder()
        .name("write a message")
        .question(Question::trigger("write a message", "Ok"))
        .question(Question::variable("What I need to write?", "text"))
        .question(Question::variable(
            "Where I need to post this message?",
            "channel",
        ))
        .build()
        .unwrap()
}

pub fn registry_with(events: Vec<Arc<dyn ChatEvent>>) -> crate::registry::EventRegistry {
    let mut registry = crate::registry::EventRegistry::default();
    for event in events {
        registry.register(event).unwrap();
    }
    registry
}
