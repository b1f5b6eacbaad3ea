//! Execution-history port: append-only log of executed events.

use std::future::Future;

use scenariobot_domain::error::BotError;
use scenariobot_domain::history::ExecutionRecord;
use scenariobot_domain::id::EventId;

/// Append-only store of [`ExecutionRecord`]s keyed by channel and user.
pub trait HistoryRepository {
    /// Persist a new record, returning it with its assigned id.
    fn append(
        &self,
        record: ExecutionRecord,
    ) -> impl Future<Output = Result<ExecutionRecord, BotError>> + Send;

    /// The most recent record for `channel` + `user`, skipping `exclude_event`.
    fn last_for(
        &self,
        channel: &str,
        user: &str,
        exclude_event: EventId,
    ) -> impl Future<Output = Result<Option<ExecutionRecord>, BotError>> + Send;

    /// The most recent records for `channel`, newest first.
    fn recent(
        &self,
        channel: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, BotError>> + Send;
}

impl<T: HistoryRepository + Send + Sync> HistoryRepository for std::sync::Arc<T> {
    fn append(
        &self,
        record: ExecutionRecord,
    ) -> impl Future<Output = Result<ExecutionRecord, BotError>> + Send {
        (**self).append(record)
    }

    fn last_for(
        &self,
        channel: &str,
        user: &str,
        exclude_event: EventId,
    ) -> impl Future<Output = Result<Option<ExecutionRecord>, BotError>> + Send {
        (**self).last_for(channel, user, exclude_event)
    }

    fn recent(
        &self,
        channel: &str,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ExecutionRecord>, BotError>> + Send {
        (**self).recent(channel, limit)
    }
}
