//! Execution history queries.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use scenariobot_app::ports::{DictionaryRepository, HistoryRepository};
use scenariobot_domain::history::ExecutionRecord;

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 20;

/// Query string of the list endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub channel: String,
    pub limit: Option<usize>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<ExecutionRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/history?channel=&limit=`: most recent executions, newest first.
pub async fn list<D, H>(
    State(state): State<AppState<D, H>>,
    Query(query): Query<HistoryQuery>,
) -> Result<ListResponse, ApiError>
where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
{
    let records = state
        .history_service
        .recent(&query.channel, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(ListResponse::Ok(Json(records)))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use scenariobot_domain::history::ExecutionRecord;

    use crate::router::build;
    use crate::test_support::test_context;

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn should_list_recent_records_for_channel() {
        let ctx = test_context();
        for command in ["first", "second"] {
            scenariobot_app::ports::HistoryRepository::append(
                ctx.history.as_ref(),
                ExecutionRecord::builder()
                    .channel("C1")
                    .command(command)
                    .build(),
            )
            .await
            .unwrap();
        }
        let app = build(ctx.state);

        let response = app
            .oneshot(get("/api/history?channel=C1&limit=1"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["command"], "second");
    }

    #[tokio::test]
    async fn should_reject_blank_channel() {
        let ctx = test_context();
        let app = build(ctx.state);

        let response = app.oneshot(get("/api/history?channel=")).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
