//! # scenariobot-domain
//!
//! Pure domain model for the scenariobot conversational automation agent.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Events** (registered automation capabilities, keyed by alias)
//! - Define **Scenarios** (trigger questions + variable slots gating one event)
//! - Define **Dictionary envelopes** (the result of resolving chat text)
//! - Define **Conversations** (per-channel multi-turn variable collection)
//! - Define **Messages** (inbound chat messages and event payloads)
//! - Define **Execution history** records
//! - Parse natural-language schedules into [`schedule::ExecuteAt`]
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod conversation;
pub mod dictionary;
pub mod event;
pub mod history;
pub mod message;
pub mod scenario;
pub mod schedule;
