//! Chat event port: pluggable automations invoked by the dispatcher.
//!
//! Unlike the storage ports, events are looked up dynamically by alias at
//! runtime, so this trait is object-safe and stored as `Arc<dyn ChatEvent>`.

use async_trait::async_trait;

use scenariobot_domain::error::BotError;
use scenariobot_domain::message::BotMessage;
use scenariobot_domain::scenario::Scenario;

/// A registered automation capability.
///
/// Implementations live in adapter crates (e.g. `adapter_events`). The
/// installer provisions [`scenarios`](Self::scenarios) into the dictionary on
/// startup, and the dispatcher calls [`execute`](Self::execute) once a
/// scenario resolving to [`alias`](Self::alias) is ready.
#[async_trait]
pub trait ChatEvent: Send + Sync {
    /// Unique alias; also the reaction type stored in the dictionary.
    fn alias(&self) -> &str;

    /// Human-readable usage shown for `--help` requests.
    fn help(&self) -> String;

    /// Version of the dictionary data returned by [`scenarios`](Self::scenarios).
    fn version(&self) -> &str;

    /// Scenarios provisioned on install, and added on update.
    fn scenarios(&self) -> Vec<Scenario>;

    /// Run the automation. A non-empty `text` in the result is posted back.
    async fn execute(&self, message: BotMessage) -> Result<BotMessage, BotError>;
}
