//! Chat transport port: delivering replies back to the chat platform.

use std::future::Future;

use scenariobot_domain::error::BotError;

/// Sends messages to chat channels.
pub trait ChatTransport {
    /// Post `text` to `channel`, optionally inside the thread `thread_ts`.
    fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> impl Future<Output = Result<(), BotError>> + Send;
}

impl<T: ChatTransport + Send + Sync> ChatTransport for std::sync::Arc<T> {
    fn send_message(
        &self,
        channel: &str,
        text: &str,
        thread_ts: Option<&str>,
    ) -> impl Future<Output = Result<(), BotError>> + Send {
        (**self).send_message(channel, text, thread_ts)
    }
}
