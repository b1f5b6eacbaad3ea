//! Scenario dispatcher: decides, per inbound message, whether to reply,
//! continue a conversation, or execute an event.
//!
//! Every message goes through the same fixed steps:
//!
//! 1. a cancel phrase deletes the channel's conversation and replies;
//! 2. an active conversation records the answer, then asks the next
//!    question or, once every variable is filled, executes;
//! 3. otherwise the text is resolved against the dictionary and either
//!    opens a conversation, answers a `--help` request, replays the last
//!    event, or executes right away;
//! 4. execution runs on a spawned task, posts the event's reply and appends
//!    a history record.
//!
//! Idle conversations are swept after each message.

use std::sync::Arc;

use chrono::Duration;
use tokio::task::JoinHandle;

use scenariobot_domain::conversation::{Conversation, join_values};
use scenariobot_domain::dictionary::DictionaryMessage;
use scenariobot_domain::error::BotError;
use scenariobot_domain::history::ExecutionRecord;
use scenariobot_domain::message::{BotMessage, IncomingMessage};
use scenariobot_domain::scenario::{Question, RequiredVariable, Scenario};
use scenariobot_domain::time::{self, Timestamp};

use crate::conversation_store::{Answer, ConversationStore, DEFAULT_IDLE_TIMEOUT_SECS};
use crate::ports::{ChatEvent, ChatTransport, DictionaryRepository, HistoryRepository};
use crate::registry::EventRegistry;
use crate::schedule_queue::ScheduleQueue;
use crate::services::intent_resolver::IntentResolver;

/// Tunables of the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Conversations idle for longer than this are dropped.
    pub idle_timeout: Duration,
    /// Alias of the event replaying the last execution.
    pub repeat_alias: String,
    pub cancel_reply: String,
    /// Sent when nothing matched and nothing similar exists.
    pub unknown_reply: String,
    pub suggestion_limit: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::seconds(DEFAULT_IDLE_TIMEOUT_SECS),
            repeat_alias: "repeat".to_string(),
            cancel_reply: "Ok, I stopped the current scenario.".to_string(),
            unknown_reply: "Sorry, I don't understand.".to_string(),
            suggestion_limit: 3,
        }
    }
}

/// What the dispatcher did with a message.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A cancel phrase was received.
    Cancelled,
    /// The channel's conversation is already complete and executing; the
    /// message was dropped.
    Ignored,
    /// The bot asked `question` and waits for the answer.
    AwaitingAnswer { question: String },
    /// The event `alias` is running on `task`.
    Executing { alias: String, task: JoinHandle<()> },
    /// The usage of `alias` was sent.
    HelpSent { alias: String },
    /// Nothing matched; `suggestions` were offered instead.
    Unhandled { suggestions: Vec<String> },
    /// The text resolved to `alias`, but no such event is registered.
    EventNotFound { alias: String },
}

impl DispatchOutcome {
    /// Short machine-readable name of the outcome.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Cancelled => "cancelled",
            Self::Ignored => "ignored",
            Self::AwaitingAnswer { .. } => "awaiting_answer",
            Self::Executing { .. } => "executing",
            Self::HelpSent { .. } => "help_sent",
            Self::Unhandled { .. } => "unhandled",
            Self::EventNotFound { .. } => "event_not_found",
        }
    }

    /// Wait for a spawned event task, if any, to finish.
    pub async fn wait(self) {
        if let Self::Executing { alias, task } = self
            && let Err(err) = task.await
        {
            tracing::error!(%alias, error = %err, "event task panicked");
        }
    }
}

/// How an execution is finalized once the event returns.
#[derive(Debug, Clone, Copy)]
struct Finalize {
    record: bool,
    conversation: bool,
}

/// Orchestrates intent resolution, conversations and event execution.
pub struct ScenarioDispatcher<D, H, T> {
    dictionary: Arc<D>,
    resolver: IntentResolver<Arc<D>>,
    history: Arc<H>,
    transport: Arc<T>,
    registry: Arc<EventRegistry>,
    conversations: Arc<ConversationStore>,
    config: DispatcherConfig,
}

impl<D, H, T> ScenarioDispatcher<D, H, T>
where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
    T: ChatTransport + Send + Sync + 'static,
{
    /// Create a dispatcher over the given ports and registry.
    pub fn new(
        dictionary: Arc<D>,
        history: Arc<H>,
        transport: Arc<T>,
        registry: EventRegistry,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            resolver: IntentResolver::new(Arc::clone(&dictionary)),
            dictionary,
            history,
            transport,
            registry: Arc::new(registry),
            conversations: Arc::new(ConversationStore::new()),
            config,
        }
    }

    #[must_use]
    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    #[must_use]
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Process one inbound message.
    ///
    /// # Errors
    ///
    /// Returns a storage error when resolving the message fails. Event
    /// failures are logged by the spawned task and never surface here.
    #[tracing::instrument(skip(self, message), fields(channel = %message.channel, user = %message.user))]
    pub async fn handle(&self, message: IncomingMessage) -> Result<DispatchOutcome, BotError> {
        let outcome = self.route(&message).await;
        self.conversations
            .sweep(self.config.idle_timeout, time::now());
        outcome
    }

    /// Dispatch every queued command due at `now` as if its user sent it.
    ///
    /// Failures are logged per item; the remaining items still run.
    pub async fn dispatch_due(&self, queue: &ScheduleQueue, now: Timestamp) -> Vec<DispatchOutcome> {
        let mut outcomes = Vec::new();
        for item in queue.take_due(now) {
            tracing::info!(id = %item.id, command = %item.command, "running scheduled command");
            let message = IncomingMessage::new(&item.channel, &item.user, &item.command);
            match self.handle(message).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => tracing::error!(id = %item.id, error = %err, "scheduled command failed"),
            }
        }
        outcomes
    }

    async fn route(&self, message: &IncomingMessage) -> Result<DispatchOutcome, BotError> {
        if ConversationStore::is_cancel_request(&message.text) {
            if self.conversations.delete(&message.channel).is_some() {
                tracing::info!("conversation cancelled");
            }
            self.reply(message, &self.config.cancel_reply).await;
            return Ok(DispatchOutcome::Cancelled);
        }

        match self
            .conversations
            .record_answer(&message.channel, &message.text, time::now())
        {
            Some(Answer::Recorded(conversation)) => {
                return Ok(self.continue_conversation(message, &conversation).await);
            }
            Some(Answer::Ignored) => return Ok(DispatchOutcome::Ignored),
            None => {}
        }

        self.resolve(message).await
    }

    async fn continue_conversation(
        &self,
        message: &IncomingMessage,
        conversation: &Conversation,
    ) -> DispatchOutcome {
        if let Some(next) = conversation.next_unanswered() {
            let question = next.question.clone();
            self.reply(message, &question).await;
            return DispatchOutcome::AwaitingAnswer { question };
        }

        if !self.conversations.mark_ready(&message.channel) {
            return DispatchOutcome::Ignored;
        }
        let dictionary = DictionaryMessage {
            scenario_id: conversation.scenario_id,
            event_id: conversation.event_id,
            question_id: conversation.last_question.id,
            question: conversation.last_question.text.clone(),
            reaction_type: conversation.reaction_type.clone(),
            ..DictionaryMessage::default()
        };
        let mut bot_message = BotMessage::from_incoming(message, dictionary);
        bot_message.text.clone_from(&conversation.command);
        bot_message.variables.clone_from(&conversation.required_variables);
        self.execute(
            bot_message,
            Finalize {
                record: true,
                conversation: true,
            },
        )
    }

    async fn resolve(&self, message: &IncomingMessage) -> Result<DispatchOutcome, BotError> {
        let dictionary = self.resolver.find_answer(&message.text).await?;
        if dictionary.is_empty() {
            let suggestions = self
                .resolver
                .suggest(&message.text, self.config.suggestion_limit)
                .await?;
            let reply = if suggestions.is_empty() {
                self.config.unknown_reply.clone()
            } else {
                format!("Did you mean:\n{}", suggestions.join("\n"))
            };
            self.reply(message, &reply).await;
            return Ok(DispatchOutcome::Unhandled { suggestions });
        }

        let alias = dictionary.reaction_type.clone();
        if message.is_help_request() {
            let Some(event) = self.registry.get(&alias) else {
                tracing::warn!(%alias, "help requested for unregistered event");
                return Ok(DispatchOutcome::EventNotFound { alias });
            };
            self.reply(message, &event.help()).await;
            return Ok(DispatchOutcome::HelpSent { alias });
        }

        if alias == self.config.repeat_alias {
            return self.repeat(message, dictionary).await;
        }

        let scenario = self.load_scenario(&dictionary).await?;
        let bot_message = BotMessage::from_incoming(message, dictionary);
        if scenario.needs_conversation() {
            let conversation = self
                .conversations
                .add_conversation(&scenario, &bot_message, time::now());
            let question = conversation
                .next_unanswered()
                .map(|variable| variable.question.clone())
                .unwrap_or_default();
            self.reply(message, &question).await;
            return Ok(DispatchOutcome::AwaitingAnswer { question });
        }

        self.reply(message, &bot_message.dictionary.answer).await;
        Ok(self.execute(
            bot_message,
            Finalize {
                record: true,
                conversation: false,
            },
        ))
    }

    /// Replay the most recent execution of another event for this user.
    async fn repeat(
        &self,
        message: &IncomingMessage,
        dictionary: DictionaryMessage,
    ) -> Result<DispatchOutcome, BotError> {
        let no_record = Finalize {
            record: false,
            conversation: false,
        };
        let previous = self
            .history
            .last_for(&message.channel, &message.user, dictionary.event_id)
            .await?;
        let replayed = match &previous {
            Some(record) => self.resolver.find_answer(&record.command).await?,
            None => DictionaryMessage::default(),
        };
        let Some(previous) = previous.filter(|_| !replayed.is_empty()) else {
            // The repeat event itself reports that there is nothing to replay.
            return Ok(self.execute(BotMessage::from_incoming(message, dictionary), no_record));
        };

        let variables = self
            .dictionary
            .questions_by_scenario(previous.scenario_id, true)
            .await?
            .into_iter()
            .zip(previous.variable_values())
            .map(|(question, value)| RequiredVariable {
                name: question.answer,
                question: question.question,
                value: value.to_string(),
            })
            .collect();
        tracing::info!(command = %previous.command, "repeating last event");
        let mut bot_message = BotMessage::from_incoming(message, replayed);
        bot_message.text = previous.command;
        bot_message.variables = variables;
        Ok(self.execute(bot_message, no_record))
    }

    async fn load_scenario(&self, dictionary: &DictionaryMessage) -> Result<Scenario, BotError> {
        let questions = self
            .dictionary
            .questions_by_scenario(dictionary.scenario_id, false)
            .await?
            .into_iter()
            .map(Question::from)
            .collect();
        Ok(Scenario::from_stored(
            dictionary.scenario_id,
            dictionary.question.clone(),
            dictionary.event_id,
            questions,
        ))
    }

    fn execute(&self, message: BotMessage, finalize: Finalize) -> DispatchOutcome {
        let alias = message.dictionary.reaction_type.clone();
        let Some(event) = self.registry.get(&alias) else {
            tracing::warn!(%alias, "no event registered for reaction type");
            if finalize.conversation {
                self.conversations.delete_if_ready(&message.channel);
            }
            return DispatchOutcome::EventNotFound { alias };
        };
        let finalize = Finalize {
            record: finalize.record && alias != self.config.repeat_alias,
            ..finalize
        };
        let task = tokio::spawn(run_event(
            event,
            message,
            finalize,
            Arc::clone(&self.history),
            Arc::clone(&self.transport),
            Arc::clone(&self.conversations),
        ));
        DispatchOutcome::Executing { alias, task }
    }

    async fn reply(&self, message: &IncomingMessage, text: &str) {
        send_reply(
            self.transport.as_ref(),
            &message.channel,
            text,
            message.thread_ts.as_deref(),
        )
        .await;
    }
}

async fn run_event<H, T>(
    event: Arc<dyn ChatEvent>,
    message: BotMessage,
    finalize: Finalize,
    history: Arc<H>,
    transport: Arc<T>,
    conversations: Arc<ConversationStore>,
) where
    H: HistoryRepository + Send + Sync,
    T: ChatTransport + Send + Sync,
{
    let channel = message.channel.clone();
    let record = finalize.record.then(|| {
        ExecutionRecord::builder()
            .event_id(message.dictionary.event_id)
            .scenario_id(message.dictionary.scenario_id)
            .user(&message.user)
            .channel(&message.channel)
            .command(&message.text)
            .variables(join_values(&message.variables))
            .last_question_id(message.dictionary.question_id)
            .created(time::now())
            .build()
    });

    match event.execute(message).await {
        Ok(reply) => {
            send_reply(
                transport.as_ref(),
                &reply.channel,
                &reply.text,
                reply.thread_ts.as_deref(),
            )
            .await;
            if let Some(record) = record
                && let Err(err) = history.append(record).await
            {
                tracing::error!(alias = event.alias(), error = %err, "failed to record execution");
            }
        }
        Err(err) => {
            tracing::error!(alias = event.alias(), error = %err, "event execution failed");
        }
    }

    if finalize.conversation {
        conversations.delete_if_ready(&channel);
    }
}

async fn send_reply<T: ChatTransport>(
    transport: &T,
    channel: &str,
    text: &str,
    thread_ts: Option<&str>,
) {
    if text.is_empty() {
        return;
    }
    if let Err(err) = transport.send_message(channel, text, thread_ts).await {
        tracing::warn!(%channel, error = %err, "failed to send reply");
    }
}
