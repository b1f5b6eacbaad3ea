//! Stub ports and state shared by the handler tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use scenariobot_app::dispatcher::{DispatcherConfig, ScenarioDispatcher};
use scenariobot_app::outbox::InProcessOutbox;
use scenariobot_app::ports::{ChatEvent, DictionaryRepository, HistoryRepository};
use scenariobot_app::registry::EventRegistry;
use scenariobot_domain::dictionary::{DictionaryMessage, QuestionObject, QuestionRegex};
use scenariobot_domain::error::BotError;
use scenariobot_domain::event::Event;
use scenariobot_domain::history::ExecutionRecord;
use scenariobot_domain::id::{EventId, QuestionId, RegexId, ScenarioId};
use scenariobot_domain::message::BotMessage;
use scenariobot_domain::scenario::{Question, Scenario};

use crate::state::AppState;

/// A dictionary knowing a single `ping` trigger.
pub struct StubDictionary;

fn ping_envelope() -> DictionaryMessage {
    DictionaryMessage {
        scenario_id: ScenarioId::new(1),
        event_id: EventId::new(1),
        question_id: QuestionId::new(1),
        question: "ping".to_string(),
        answer: String::new(),
        regex: None,
        capture_group: None,
        reaction_type: "ping".to_string(),
    }
}

impl DictionaryRepository for StubDictionary {
    async fn regexes(&self) -> Result<Vec<QuestionRegex>, BotError> {
        Ok(vec![])
    }
    async fn find_by_regex(&self, _regex_id: RegexId) -> Result<Option<DictionaryMessage>, BotError> {
        Ok(None)
    }
    async fn find_by_prefix(&self, text: &str) -> Result<Option<DictionaryMessage>, BotError> {
        Ok(text.starts_with("ping").then(ping_envelope))
    }
    async fn questions_by_scenario(
        &self,
        _scenario_id: ScenarioId,
        _only_variables: bool,
    ) -> Result<Vec<QuestionObject>, BotError> {
        Ok(vec![QuestionObject {
            id: QuestionId::new(1),
            question: "ping".to_string(),
            answer: String::new(),
            is_variable: false,
        }])
    }
    async fn trigger_questions(&self) -> Result<Vec<String>, BotError> {
        Ok(vec!["ping".to_string()])
    }
    async fn find_event(&self, _alias: &str) -> Result<Option<Event>, BotError> {
        Ok(None)
    }
    async fn install_event(&self, _alias: &str, _version: &str) -> Result<EventId, BotError> {
        Ok(EventId::new(1))
    }
    async fn update_event_version(&self, _event_id: EventId, _version: &str) -> Result<(), BotError> {
        Ok(())
    }
    async fn find_scenario(
        &self,
        _event_id: EventId,
        _name: &str,
    ) -> Result<Option<ScenarioId>, BotError> {
        Ok(None)
    }
    async fn insert_scenario(&self, _name: &str, _event_id: EventId) -> Result<ScenarioId, BotError> {
        Ok(ScenarioId::new(1))
    }
    async fn insert_question(
        &self,
        _scenario_id: ScenarioId,
        _question: &Question,
    ) -> Result<QuestionId, BotError> {
        Ok(QuestionId::new(1))
    }
}

#[derive(Default)]
pub struct StubHistory {
    records: Mutex<Vec<ExecutionRecord>>,
}

impl HistoryRepository for StubHistory {
    async fn append(&self, record: ExecutionRecord) -> Result<ExecutionRecord, BotError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }
    async fn last_for(
        &self,
        _channel: &str,
        _user: &str,
        _exclude_event: EventId,
    ) -> Result<Option<ExecutionRecord>, BotError> {
        Ok(None)
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

struct PingEvent;

#[async_trait]
impl ChatEvent for PingEvent {
    fn alias(&self) -> &str {
        "ping"
    }
    fn help(&self) -> String {
        "ping: replies pong".to_string()
    }
    fn version(&self) -> &str {
        "1"
    }
    fn scenarios(&self) -> Vec<Scenario> {
        Vec::new()
    }
    async fn execute(&self, message: BotMessage) -> Result<BotMessage, BotError> {
        Ok(message.reply("pong!"))
    }
}

pub struct TestContext {
    pub state: AppState<StubDictionary, StubHistory>,
    pub history: Arc<StubHistory>,
    pub outbox: Arc<InProcessOutbox>,
}

pub fn test_context() -> TestContext {
    let history = Arc::new(StubHistory::default());
    let outbox = Arc::new(InProcessOutbox::new(16));
    let mut registry = EventRegistry::default();
    registry.register(Arc::new(PingEvent)).unwrap();
    let dispatcher = Arc::new(ScenarioDispatcher::new(
        Arc::new(StubDictionary),
        Arc::clone(&history),
        Arc::clone(&outbox),
        registry,
        DispatcherConfig::default(),
    ));
    TestContext {
        state: AppState::new(dispatcher, Arc::clone(&history), Arc::clone(&outbox)),
        history,
        outbox,
    }
}
