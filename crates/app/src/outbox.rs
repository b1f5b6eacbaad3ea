//! In-process outbox backed by a tokio broadcast channel.
//!
//! Stands in for a chat platform: every reply the dispatcher or an event sends
//! is broadcast to subscribers (the SSE stream of the HTTP adapter).

use std::future::Future;

use tokio::sync::broadcast;

use scenariobot_domain::error::{BotError, ValidationError};
use scenariobot_domain::message::OutgoingMessage;

use crate::ports::ChatTransport;

/// In-process transport using a tokio [`broadcast`] channel.
///
/// Sending succeeds even when there are no active subscribers
/// (the message is simply dropped).
pub struct InProcessOutbox {
    sender: broadcast::Sender<OutgoingMessage>,
}

impl InProcessOutbox {
    /// Create a new outbox with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to outgoing messages.
    ///
    /// Returns a receiver that will get all messages sent *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OutgoingMessage> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl ChatTransport for InProcessOutbox {
    fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> impl Future<Output = Result<(), BotError>> + Send {
        let result = if channel.trim().is_empty() {
            Err(ValidationError::EmptyChannel.into())
        } else {
            // Only fails when nobody listens, which is fine.
            let _ = self.sender.send(OutgoingMessage {
                channel: channel.to_string(),
                text: text.to_string(),
                thread_ts: thread_ts.map(str::to_string),
            });
            Ok(())
        };
        async { result }
    }
}
