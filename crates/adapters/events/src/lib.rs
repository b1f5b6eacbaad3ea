//! # scenariobot-adapter-events
//!
//! Built-in [`ChatEvent`](scenariobot_app::ports::ChatEvent) implementations.
//!
//! | alias           | variables         | effect                                    |
//! |-----------------|-------------------|-------------------------------------------|
//! | `write_message` | `text`, `channel` | posts `text` to `channel`                 |
//! | `repeat`        | none              | fallback when there is nothing to replay  |
//! | `schedule`      | `command`, `when` | queues `command` for the time in `when`   |
//!
//! Replaying is done by the dispatcher itself; the `repeat` event only runs
//! when the user has no previous execution to replay.

pub mod repeat;
pub mod schedule;
pub mod write_message;

use std::sync::Arc;

use scenariobot_app::ports::ChatTransport;
use scenariobot_app::registry::EventRegistry;
use scenariobot_app::schedule_queue::ScheduleQueue;
use scenariobot_domain::error::BotError;

pub use repeat::RepeatEvent;
pub use schedule::ScheduleEvent;
pub use write_message::WriteMessageEvent;

/// Registry holding every built-in event.
///
/// # Errors
///
/// Returns [`BotError::Validation`] when `repeat_alias` is blank or clashes
/// with another built-in alias.
pub fn builtin_registry<T>(
    transport: Arc<T>,
    queue: Arc<ScheduleQueue>,
    repeat_alias: &str,
) -> Result<EventRegistry, BotError>
where
    T: ChatTransport + Send + Sync + 'static,
{
    let mut registry = EventRegistry::default();
    registry.register(Arc::new(WriteMessageEvent::new(transport)))?;
    registry.register(Arc::new(RepeatEvent::new(repeat_alias)))?;
    registry.register(Arc::new(ScheduleEvent::new(queue)))?;
    Ok(registry)
}
