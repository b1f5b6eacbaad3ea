//! Shared application state for axum handlers.

use std::sync::Arc;

use scenariobot_app::dispatcher::ScenarioDispatcher;
use scenariobot_app::outbox::InProcessOutbox;
use scenariobot_app::ports::{DictionaryRepository, HistoryRepository};
use scenariobot_app::services::history_service::HistoryService;

/// Application state shared across all axum handlers.
///
/// Generic over the dictionary and history repositories to avoid dynamic
/// dispatch. Replies always flow through the in-process outbox, which also
/// feeds the SSE stream. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone`; only the `Arc` wrappers are
/// cloned.
pub struct AppState<D, H> {
    /// Message dispatcher.
    pub dispatcher: Arc<ScenarioDispatcher<D, H, InProcessOutbox>>,
    /// Execution history queries.
    pub history_service: Arc<HistoryService<Arc<H>>>,
    /// Outgoing replies, subscribed to by SSE clients.
    pub outbox: Arc<InProcessOutbox>,
}

impl<D, H> Clone for AppState<D, H> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
            history_service: Arc::clone(&self.history_service),
            outbox: Arc::clone(&self.outbox),
        }
    }
}

impl<D, H> AppState<D, H>
where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` components.
    ///
    /// The dispatcher is shared with the scheduler tick, so it is passed in
    /// already wrapped.
    pub fn new(
        dispatcher: Arc<ScenarioDispatcher<D, H, InProcessOutbox>>,
        history: Arc<H>,
        outbox: Arc<InProcessOutbox>,
    ) -> Self {
        Self {
            dispatcher,
            history_service: Arc::new(HistoryService::new(history)),
            outbox,
        }
    }
}
