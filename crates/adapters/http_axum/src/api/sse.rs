//! Server-Sent Events (SSE) stream of outgoing replies.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use scenariobot_app::ports::{DictionaryRepository, HistoryRepository};

use crate::state::AppState;

/// `GET /api/messages/stream`: SSE stream of every reply the bot sends.
///
/// Subscribes to the outbox broadcast channel and sends JSON-encoded
/// messages as SSE `data:` frames. The stream continues until the client
/// disconnects or the outbox is closed.
pub async fn stream<D, H>(
    State(state): State<AppState<D, H>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
{
    let receiver = state.outbox.subscribe();
    let messages = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(message) => match serde_json::to_string(&message) {
            Ok(json) => Some(Ok(Event::default().event("message").data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize message for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some messages were dropped");
            None
        }
    });

    Sse::new(messages).keep_alive(KeepAlive::default())
}
