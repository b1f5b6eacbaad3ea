//! # scenariobot-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Accept inbound chat messages as JSON (`POST /api/messages`) and hand
//!   them to the `ScenarioDispatcher` (driving adapter)
//! - Stream every outgoing reply as Server-Sent Events
//!   (`GET /api/messages/stream`), standing in for a chat platform
//! - Serve recent execution history (`GET /api/history`)
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `scenariobot-app` (for port traits and services) and
//! `scenariobot-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod test_support;
