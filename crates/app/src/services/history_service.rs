//! History service: read access to the execution log.

use scenariobot_domain::error::{BotError, ValidationError};
use scenariobot_domain::history::ExecutionRecord;

use crate::ports::HistoryRepository;

/// Upper bound for a single history page.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Application service over the execution history.
pub struct HistoryService<H> {
    repo: H,
}

impl<H: HistoryRepository> HistoryService<H> {
    pub fn new(repo: H) -> Self {
        Self { repo }
    }

    /// The most recent executions in `channel`, newest first.
    ///
    /// `limit` is clamped to `1..=MAX_HISTORY_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Validation`] when `channel` is blank, or a storage
    /// error propagated from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn recent(
        &self,
        channel: &str,
        limit: usize,
    ) -> Result<Vec<ExecutionRecord>, BotError> {
        if channel.trim().is_empty() {
            return Err(ValidationError::EmptyChannel.into());
        }
        self.repo
            .recent(channel, limit.clamp(1, MAX_HISTORY_LIMIT))
            .await
    }
}
