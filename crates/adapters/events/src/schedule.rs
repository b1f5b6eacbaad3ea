//! `schedule`: run a command later, once or repeatedly.

use std::sync::Arc;

use async_trait::async_trait;

use scenariobot_app::ports::ChatEvent;
use scenariobot_app::schedule_queue::ScheduleQueue;
use scenariobot_domain::error::{BotError, ExecutionError};
use scenariobot_domain::message::BotMessage;
use scenariobot_domain::scenario::{Question, Scenario};
use scenariobot_domain::schedule::{ExecuteAt, ScheduledItem};

pub const ALIAS: &str = "schedule";
const VERSION: &str = "1";

/// Parses a natural-language time and queues the command for it.
pub struct ScheduleEvent {
    queue: Arc<ScheduleQueue>,
}

impl ScheduleEvent {
    pub fn new(queue: Arc<ScheduleQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl ChatEvent for ScheduleEvent {
    fn alias(&self) -> &str {
        ALIAS
    }

    fn help(&self) -> String {
        [
            "schedule: I ask for a command and a time, then run the command for you.",
            "Times: `in 2 hours`, `after 1 hour and 30 minutes`, `every monday at 9:10`,",
            "`friday at 18:00`, `in 3 days at 8:00`, `2026-12-01 10:30`.",
        ]
        .join("\n")
    }

    fn version(&self) -> &str {
        VERSION
    }

    fn scenarios(&self) -> Vec<Scenario> {
        Scenario::builder()
            .name("schedule a command")
            .question(Question::trigger("schedule", "Ok"))
            .question(Question::variable("What command should I run?", "command"))
            .question(Question::variable(
                "When should I run it? (e.g. in 2 hours, every monday at 9:10)",
                "when",
            ))
            .build()
            .into_iter()
            .collect()
    }

    async fn execute(&self, message: BotMessage) -> Result<BotMessage, BotError> {
        let command = message
            .variable("command")
            .ok_or_else(|| ExecutionError::new(ALIAS, "missing `command` variable"))?;
        let when = message
            .variable("when")
            .ok_or_else(|| ExecutionError::new(ALIAS, "missing `when` variable"))?;

        let now = scenariobot_domain::time::now();
        let execute_at = ExecuteAt::parse_at(when, now);
        if execute_at.is_empty() {
            return Ok(message.reply(format!("Sorry, I don't understand when `{when}` is.")));
        }

        let reply = format!("Ok, I will run `{command}` {execute_at}.");
        let item = ScheduledItem::new(
            &message.channel,
            &message.user,
            command,
            execute_at,
            now,
        );
        self.queue.push(item);
        Ok(message.reply(reply))
    }
}
