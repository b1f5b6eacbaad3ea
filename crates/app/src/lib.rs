//! # scenariobot-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DictionaryRepository`: questions, regexes, scenarios and events
//!   - `HistoryRepository`: append & query execution records
//!   - `ChatTransport`: deliver replies to a channel
//!   - `ChatEvent`: pluggable automations looked up by alias
//! - Define **driving/inbound ports** as use-case structs:
//!   - `ScenarioDispatcher`: cancel, continue, resolve, execute
//!   - `IntentResolver`: text to dictionary envelope
//!   - `InstallService`: provision events into the dictionary
//!   - `HistoryService`: read recent executions
//! - Provide **in-process infrastructure** that doesn't need IO: the
//!   conversation store, the schedule queue and the broadcast outbox
//!
//! ## Dependency rule
//! Depends on `scenariobot-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod conversation_store;
pub mod dispatcher;
pub mod outbox;
pub mod ports;
pub mod registry;
pub mod schedule_queue;
pub mod services;

#[cfg(test)]
mod testing;
