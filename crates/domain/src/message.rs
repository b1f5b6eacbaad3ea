//! Chat messages flowing in from the transport and through events.

use serde::{Deserialize, Serialize};

use crate::dictionary::DictionaryMessage;
use crate::scenario::RequiredVariable;
use crate::time::Timestamp;

/// A message delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub channel: String,
    pub text: String,
    pub user: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
    #[serde(default = "crate::time::now")]
    pub timestamp: Timestamp,
}

impl IncomingMessage {
    #[must_use]
    pub fn new(
        channel: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            user: user.into(),
            thread_ts: None,
            timestamp: crate::time::now(),
        }
    }

    /// `true` when the text asks for an event's help rather than running it.
    #[must_use]
    pub fn is_help_request(&self) -> bool {
        self.text.trim_end().to_lowercase().ends_with("--help")
    }
}

/// The payload handed to an event's `execute` and returned from it.
///
/// On the way in, `text` is the command that triggered the event; on the way
/// out, a non-empty `text` is posted back to `channel` as a follow-up reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessage {
    pub channel: String,
    pub text: String,
    pub user: String,
    pub thread_ts: Option<String>,
    pub timestamp: Timestamp,
    pub dictionary: DictionaryMessage,
    pub variables: Vec<RequiredVariable>,
}

impl BotMessage {
    /// Wrap an inbound message with its resolution result.
    #[must_use]
    pub fn from_incoming(message: &IncomingMessage, dictionary: DictionaryMessage) -> Self {
        Self {
            channel: message.channel.clone(),
            text: message.text.clone(),
            user: message.user.clone(),
            thread_ts: message.thread_ts.clone(),
            timestamp: message.timestamp,
            dictionary,
            variables: Vec::new(),
        }
    }

    /// Build a reply to this message carrying `text`.
    #[must_use]
    pub fn reply(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Look up a collected variable by name.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }
}

/// A reply sent out through the chat transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel: String,
    pub text: String,
    pub thread_ts: Option<String>,
}
