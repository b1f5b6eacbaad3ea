//! Conversation store: at most one active conversation per channel.
//!
//! The store is owned by the dispatcher and shared by handle with the tasks
//! it spawns. None of its operations fail: a poisoned lock is recovered, since
//! every mutation leaves the map in a consistent state.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Duration;

use scenariobot_domain::conversation::Conversation;
use scenariobot_domain::message::BotMessage;
use scenariobot_domain::scenario::Scenario;
use scenariobot_domain::time::Timestamp;

/// Phrases that abort the active conversation, matched case-insensitively
/// anywhere in the message.
pub const CANCEL_PHRASES: [&str; 5] = ["stop!", "stop scenario!", "exit", "stop", "cancel"];

/// Default idle threshold, in seconds, after which a conversation is swept.
pub const DEFAULT_IDLE_TIMEOUT_SECS: i64 = 600;

/// What became of an answer sent to a channel with a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// The text filled the next empty variable; snapshot after the update.
    Recorded(Conversation),
    /// Every variable was already filled, the text was dropped.
    Ignored,
}

impl Answer {
    /// Snapshot of a recorded answer.
    #[must_use]
    pub fn recorded(self) -> Option<Conversation> {
        match self {
            Self::Recorded(conversation) => Some(conversation),
            Self::Ignored => None,
        }
    }
}

/// Mutex-guarded map of channel to [`Conversation`].
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: Mutex<HashMap<String, Conversation>>,
}

impl ConversationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Conversation>> {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Open (or replace) the conversation for the message's channel.
    ///
    /// The idle clock starts at `now`, the server time the message was
    /// handled, never the timestamp carried by the message.
    pub fn add_conversation(
        &self,
        scenario: &Scenario,
        message: &BotMessage,
        now: Timestamp,
    ) -> Conversation {
        let mut conversation = Conversation::start(scenario, message);
        conversation.last_question.ts = now;
        tracing::debug!(
            channel = %conversation.channel,
            scenario_id = %conversation.scenario_id,
            variables = conversation.required_variables.len(),
            "conversation opened"
        );
        self.lock()
            .insert(conversation.channel.clone(), conversation.clone());
        conversation
    }

    /// Write `text` into the first empty variable of the channel's conversation.
    ///
    /// Returns `None` when the channel has no conversation, and
    /// [`Answer::Ignored`] when every slot was already filled.
    pub fn record_answer(&self, channel: &str, text: &str, now: Timestamp) -> Option<Answer> {
        let mut conversations = self.lock();
        let conversation = conversations.get_mut(channel)?;
        if conversation.ready_to_execute || !conversation.record_answer(text, now) {
            tracing::debug!(%channel, "answer ignored, no empty variable left");
            return Some(Answer::Ignored);
        }
        Some(Answer::Recorded(conversation.clone()))
    }

    /// Flag the channel's conversation as ready to execute.
    ///
    /// Returns `true` only for the call that performs the transition: `false`
    /// when there is no conversation, a variable is still empty, or the
    /// conversation was already ready.
    pub fn mark_ready(&self, channel: &str) -> bool {
        let mut conversations = self.lock();
        match conversations.get_mut(channel) {
            Some(conversation) if conversation.is_complete() && !conversation.ready_to_execute => {
                conversation.ready_to_execute = true;
                true
            }
            _ => false,
        }
    }

    /// Whether `text` asks to abort the current conversation.
    #[must_use]
    pub fn is_cancel_request(text: &str) -> bool {
        let text = text.to_lowercase();
        CANCEL_PHRASES.iter().any(|phrase| text.contains(phrase))
    }

    #[must_use]
    pub fn get(&self, channel: &str) -> Option<Conversation> {
        self.lock().get(channel).cloned()
    }

    pub fn delete(&self, channel: &str) -> Option<Conversation> {
        self.lock().remove(channel)
    }

    /// Delete the channel's conversation only if it is flagged ready.
    ///
    /// A conversation opened in the same channel while an event was running
    /// is left untouched.
    pub fn delete_if_ready(&self, channel: &str) -> bool {
        let mut conversations = self.lock();
        if conversations
            .get(channel)
            .is_some_and(|conversation| conversation.ready_to_execute)
        {
            conversations.remove(channel);
            return true;
        }
        false
    }

    /// Drop conversations idle for strictly longer than `threshold` at `now`.
    ///
    /// Returns the number of conversations removed.
    pub fn sweep(&self, threshold: Duration, now: Timestamp) -> usize {
        let mut conversations = self.lock();
        let before = conversations.len();
        conversations.retain(|_, conversation| !conversation.is_idle(now, threshold));
        let removed = before - conversations.len();
        if removed > 0 {
            tracing::info!(removed, "idle conversations swept");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
