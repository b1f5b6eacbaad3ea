//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod history;
#[allow(clippy::missing_errors_doc)]
pub mod messages;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use scenariobot_app::ports::{DictionaryRepository, HistoryRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<D, H>() -> Router<AppState<D, H>>
where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/messages", post(messages::post::<D, H>))
        .route("/messages/stream", get(sse::stream::<D, H>))
        .route("/history", get(history::list::<D, H>))
}
