//! `write_message`: post a text to another channel.

use std::sync::Arc;

use async_trait::async_trait;

use scenariobot_app::ports::{ChatEvent, ChatTransport};
use scenariobot_domain::error::{BotError, ExecutionError};
use scenariobot_domain::message::BotMessage;
use scenariobot_domain::scenario::{Question, Scenario};

pub const ALIAS: &str = "write_message";
const VERSION: &str = "1";

/// Collects a text and a target channel, then posts the text there.
pub struct WriteMessageEvent<T> {
    transport: Arc<T>,
}

impl<T> WriteMessageEvent<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T> ChatEvent for WriteMessageEvent<T>
where
    T: ChatTransport + Send + Sync + 'static,
{
    fn alias(&self) -> &str {
        ALIAS
    }

    fn help(&self) -> String {
        "write a message: I ask what to write and where to post it, then post it there.".to_string()
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn scenarios(&self) -> Vec<Scenario> {
        let questions = [
            Question::trigger("write a message", "Ok"),
            Question::variable("What I need to write?", "text"),
            Question::variable(
                "Where I need to post this message? (e.g. #general)",
                "channel",
            ),
        ];
        Scenario::builder()
            .name("write a message")
            .questions(questions)
            .build()
            .into_iter()
            .collect()
    }

    async fn execute(&self, message: BotMessage) -> Result<BotMessage, BotError> {
        let text = message
            .variable("text")
            .ok_or_else(|| ExecutionError::new(ALIAS, "missing `text` variable"))?;
        let channel = message
            .variable("channel")
            .ok_or_else(|| ExecutionError::new(ALIAS, "missing `channel` variable"))?;

        self.transport.send_message(channel, text, None).await?;
        tracing::info!(%channel, "message written");

        let reply = format!("Done, the message is posted to {channel}.");
        Ok(message.reply(reply))
    }
}
