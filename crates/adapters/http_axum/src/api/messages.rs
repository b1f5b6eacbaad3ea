//! Inbound chat messages.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use scenariobot_app::dispatcher::DispatchOutcome;
use scenariobot_app::ports::{DictionaryRepository, HistoryRepository};
use scenariobot_domain::error::{BotError, ValidationError};
use scenariobot_domain::message::IncomingMessage;

use crate::error::ApiError;
use crate::state::AppState;

/// JSON summary of a [`DispatchOutcome`].
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl DispatchResponse {
    fn from_outcome(outcome: DispatchOutcome) -> Self {
        let mut response = Self {
            outcome: outcome.kind(),
            question: None,
            alias: None,
            suggestions: Vec::new(),
        };
        match outcome {
            DispatchOutcome::Cancelled | DispatchOutcome::Ignored => {}
            DispatchOutcome::AwaitingAnswer { question } => response.question = Some(question),
            // The task keeps running detached; its reply arrives on the stream.
            DispatchOutcome::Executing { alias, .. }
            | DispatchOutcome::HelpSent { alias }
            | DispatchOutcome::EventNotFound { alias } => response.alias = Some(alias),
            DispatchOutcome::Unhandled { suggestions } => response.suggestions = suggestions,
        }
        response
    }
}

/// Possible responses from the post endpoint.
pub enum PostResponse {
    /// The message was fully handled.
    Ok(Json<DispatchResponse>),
    /// An event is running in the background.
    Accepted(Json<DispatchResponse>),
}

impl IntoResponse for PostResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::Accepted(json) => (StatusCode::ACCEPTED, json).into_response(),
        }
    }
}

/// `POST /api/messages`: dispatch an inbound chat message.
pub async fn post<D, H>(
    State(state): State<AppState<D, H>>,
    Json(message): Json<IncomingMessage>,
) -> Result<PostResponse, ApiError>
where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
{
    if message.channel.trim().is_empty() {
        return Err(BotError::from(ValidationError::EmptyChannel).into());
    }
    let outcome = state.dispatcher.handle(message).await?;
    let executing = matches!(outcome, DispatchOutcome::Executing { .. });
    let body = Json(DispatchResponse::from_outcome(outcome));
    Ok(if executing {
        PostResponse::Accepted(body)
    } else {
        PostResponse::Ok(body)
    })
}
