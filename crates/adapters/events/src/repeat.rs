//! `repeat`: replay the previous event.
//!
//! The dispatcher recognises this alias and replays the user's last execution
//! itself. The event only runs when there is nothing to replay.

use async_trait::async_trait;

use scenariobot_app::ports::ChatEvent;
use scenariobot_domain::error::BotError;
use scenariobot_domain::message::BotMessage;
use scenariobot_domain::scenario::{Question, Scenario};

const VERSION: &str = "1";

pub struct RepeatEvent {
    alias: String,
}

impl RepeatEvent {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
        }
    }
}

#[async_trait]
impl ChatEvent for RepeatEvent {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn help(&self) -> String {
        "repeat: run the last command you gave me in this channel again.".to_string()
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn scenarios(&self) -> Vec<Scenario> {
        Scenario::builder()
            .name("repeat")
            .question(Question::trigger("repeat", ""))
            .question(Question::trigger("do it again", ""))
            .build()
            .into_iter()
            .collect()
    }

    async fn execute(&self, message: BotMessage) -> Result<BotMessage, BotError> {
        Ok(message.reply("There is nothing to repeat yet."))
    }
}
