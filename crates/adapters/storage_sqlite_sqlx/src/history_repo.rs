//! `SQLite` implementation of [`HistoryRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use scenariobot_app::ports::HistoryRepository;
use scenariobot_domain::error::BotError;
use scenariobot_domain::history::ExecutionRecord;
use scenariobot_domain::id::{EventId, HistoryId, QuestionId, ScenarioId};

use crate::error::{StorageError, decode};

struct Wrapper(ExecutionRecord);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let created: i64 = row.try_get("created")?;
        let created = scenariobot_domain::time::from_unix(created)
            .ok_or_else(|| decode(StorageError::InvalidTimestamp(created)))?;

        Ok(Self(ExecutionRecord {
            id: HistoryId::new(row.try_get("id")?),
            event_id: EventId::new(row.try_get("event_id")?),
            scenario_id: ScenarioId::new(row.try_get("scenario_id")?),
            user: row.try_get("user")?,
            channel: row.try_get("channel")?,
            command: row.try_get("command")?,
            variables: row.try_get("variables")?,
            last_question_id: QuestionId::new(row.try_get("last_question_id")?),
            created,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO events_history
        (event_id, scenario_id, user, channel, command, variables, last_question_id, created)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";

const SELECT_LAST_FOR: &str = r"
    SELECT * FROM events_history
    WHERE channel = ? AND user = ? AND event_id != ?
    ORDER BY id DESC LIMIT 1
";
const SELECT_RECENT: &str =
    "SELECT * FROM events_history WHERE channel = ? ORDER BY id DESC LIMIT ?";

/// `SQLite`-backed execution history.
pub struct SqliteHistoryRepository {
    pool: SqlitePool,
}

impl SqliteHistoryRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, mut record: ExecutionRecord) -> Result<ExecutionRecord, BotError> {
        let result = sqlx::query(INSERT)
            .bind(record.event_id.get())
            .bind(record.scenario_id.get())
            .bind(&record.user)
            .bind(&record.channel)
            .bind(&record.command)
            .bind(&record.variables)
            .bind(record.last_question_id.get())
            .bind(record.unix_timestamp())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        record.id = HistoryId::new(result.last_insert_rowid());
        Ok(record)
    }

    async fn last_for(
        &self,
        channel: &str,
        user: &str,
        exclude_event: EventId,
    ) -> Result<Option<ExecutionRecord>, BotError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_LAST_FOR)
            .bind(channel)
            .bind(user)
            .bind(exclude_event.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(row.map(|w| w.0))
    }

    async fn recent(&self, channel: &str, limit: usize) -> Result<Vec<ExecutionRecord>, BotError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(channel)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;

    async fn setup() -> SqliteHistoryRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteHistoryRepository::new(db.pool().clone())
    }

    fn record(event: i64, channel: &str, user: &str, command: &str) -> ExecutionRecord {
        ExecutionRecord::builder()
            .event_id(EventId::new(event))
            .scenario_id(ScenarioId::new(1))
            .channel(channel)
            .user(user)
            .command(command)
            .variables("Hello;#general")
            .last_question_id(QuestionId::new(3))
            .created(scenariobot_domain::time::from_unix(1_700_000_000).unwrap())
            .build()
    }

    #[tokio::test]
    async fn should_append_and_read_back_record() {
        let repo = setup().await;

        let stored = repo
            .append(record(1, "C1", "U1", "write a message"))
            .await
            .unwrap();

        assert!(!stored.id.is_unset());
        let recent = repo.recent("C1", 10).await.unwrap();
        assert_eq!(recent, [stored]);
        assert_eq!(recent[0].variable_values(), ["Hello", "#general"]);
        assert_eq!(recent[0].unix_timestamp(), 1_700_000_000);
    }

    #[tokio::test]
    async fn should_find_last_record_excluding_event() {
        let repo = setup().await;
        repo.append(record(1, "C1", "U1", "write a message"))
            .await
            .unwrap();
        repo.append(record(2, "C1", "U1", "repeat")).await.unwrap();
        repo.append(record(1, "C1", "U2", "other user"))
            .await
            .unwrap();

        let last = repo
            .last_for("C1", "U1", EventId::new(2))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(last.command, "write a message");
    }

    #[tokio::test]
    async fn should_return_none_without_history() {
        let repo = setup().await;
        let last = repo.last_for("C1", "U1", EventId::new(2)).await.unwrap();
        assert!(last.is_none());
    }

    #[tokio::test]
    async fn should_limit_recent_records_newest_first() {
        let repo = setup().await;
        for command in ["first", "second", "third"] {
            repo.append(record(1, "C1", "U1", command)).await.unwrap();
        }
        repo.append(record(1, "C2", "U1", "elsewhere"))
            .await
            .unwrap();

        let recent = repo.recent("C1", 2).await.unwrap();

        let commands: Vec<_> = recent.iter().map(|r| r.command.as_str()).collect();
        assert_eq!(commands, ["third", "second"]);
    }
}
