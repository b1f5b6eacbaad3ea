//! `SQLite` implementation of [`DictionaryRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use scenariobot_app::ports::DictionaryRepository;
use scenariobot_domain::dictionary::{DictionaryMessage, QuestionObject, QuestionRegex};
use scenariobot_domain::error::BotError;
use scenariobot_domain::event::Event;
use scenariobot_domain::id::{EventId, QuestionId, RegexId, ScenarioId};
use scenariobot_domain::scenario::Question;

use crate::error::{StorageError, decode};

fn capture_group(row: &SqliteRow, column: &str) -> Result<Option<usize>, sqlx::Error> {
    let group: Option<i64> = row.try_get(column)?;
    group
        .map(|g| usize::try_from(g).map_err(|_| decode(StorageError::InvalidCaptureGroup(g))))
        .transpose()
}

struct RegexRow(QuestionRegex);

impl<'r> FromRow<'r, SqliteRow> for RegexRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(QuestionRegex {
            id: RegexId::new(row.try_get("id")?),
            pattern: row.try_get("regex")?,
            capture_group: capture_group(row, "regex_group")?,
        }))
    }
}

struct EnvelopeRow(DictionaryMessage);

impl<'r> FromRow<'r, SqliteRow> for EnvelopeRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(DictionaryMessage {
            scenario_id: ScenarioId::new(row.try_get("scenario_id")?),
            event_id: EventId::new(row.try_get("event_id")?),
            question_id: QuestionId::new(row.try_get("question_id")?),
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            regex: row.try_get("regex")?,
            capture_group: capture_group(row, "regex_group")?,
            reaction_type: row.try_get("alias")?,
        }))
    }
}

struct QuestionRow(QuestionObject);

impl<'r> FromRow<'r, SqliteRow> for QuestionRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(QuestionObject {
            id: QuestionId::new(row.try_get("id")?),
            question: row.try_get("question")?,
            answer: row.try_get("answer")?,
            is_variable: row.try_get("is_variable")?,
        }))
    }
}

struct EventRow(Event);

impl<'r> FromRow<'r, SqliteRow> for EventRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self(Event {
            id: EventId::new(row.try_get("id")?),
            alias: row.try_get("alias")?,
            installed_version: row.try_get("installed_version")?,
        }))
    }
}

const SELECT_REGEXES: &str = "SELECT id, regex, regex_group FROM questions_regex ORDER BY id";

const SELECT_BY_REGEX: &str = r"
    SELECT q.id AS question_id, q.question, q.answer, q.scenario_id,
           s.event_id, e.alias, r.regex, r.regex_group
    FROM questions q
    JOIN scenarios s ON s.id = q.scenario_id
    JOIN events e ON e.id = s.event_id
    LEFT JOIN questions_regex r ON r.id = q.regex_id
    WHERE q.is_variable = 0 AND q.regex_id = ?
    ORDER BY q.id LIMIT 1
";

const SELECT_BY_PREFIX: &str = r"
    SELECT q.id AS question_id, q.question, q.answer, q.scenario_id,
           s.event_id, e.alias, r.regex, r.regex_group
    FROM questions q
    JOIN scenarios s ON s.id = q.scenario_id
    JOIN events e ON e.id = s.event_id
    LEFT JOIN questions_regex r ON r.id = q.regex_id
    WHERE q.is_variable = 0 AND substr(?, 1, length(q.question)) = q.question
    ORDER BY q.id LIMIT 1
";

const SELECT_BY_SCENARIO: &str = r"
    SELECT id, question, answer, is_variable FROM questions
    WHERE scenario_id = ? AND (is_variable = 1 OR ? = 0)
    ORDER BY id
";
const SELECT_TRIGGERS: &str = "SELECT question FROM questions WHERE is_variable = 0 ORDER BY id";

const SELECT_EVENT: &str = "SELECT id, alias, installed_version FROM events WHERE alias = ?";
const INSERT_EVENT: &str = "INSERT INTO events (alias, installed_version) VALUES (?, ?)";
const UPDATE_EVENT_VERSION: &str = "UPDATE events SET installed_version = ? WHERE id = ?";

const SELECT_SCENARIO: &str = "SELECT id FROM scenarios WHERE event_id = ? AND name = ?";
const INSERT_SCENARIO: &str = "INSERT INTO scenarios (name, event_id) VALUES (?, ?)";

const INSERT_REGEX: &str =
    "INSERT INTO questions_regex (regex, regex_group) VALUES (?, ?) ON CONFLICT (regex) DO NOTHING";
const SELECT_REGEX_ID: &str = "SELECT id FROM questions_regex WHERE regex = ?";
const INSERT_QUESTION: &str = r"
    INSERT INTO questions (question, answer, scenario_id, regex_id, is_variable)
    VALUES (?, ?, ?, ?, ?)
";

/// `SQLite`-backed question dictionary.
pub struct SqliteDictionary {
    pool: SqlitePool,
}

impl SqliteDictionary {
    /// Create a new dictionary using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DictionaryRepository for SqliteDictionary {
    async fn regexes(&self) -> Result<Vec<QuestionRegex>, BotError> {
        let rows: Vec<RegexRow> = sqlx::query_as(SELECT_REGEXES)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn find_by_regex(&self, regex_id: RegexId) -> Result<Option<DictionaryMessage>, BotError> {
        let row: Option<EnvelopeRow> = sqlx::query_as(SELECT_BY_REGEX)
            .bind(regex_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| r.0))
    }

    async fn find_by_prefix(&self, text: &str) -> Result<Option<DictionaryMessage>, BotError> {
        let row: Option<EnvelopeRow> = sqlx::query_as(SELECT_BY_PREFIX)
            .bind(text)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| r.0))
    }

    async fn questions_by_scenario(
        &self,
        scenario_id: ScenarioId,
        only_variables: bool,
    ) -> Result<Vec<QuestionObject>, BotError> {
        let rows: Vec<QuestionRow> = sqlx::query_as(SELECT_BY_SCENARIO)
            .bind(scenario_id.get())
            .bind(only_variables)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn trigger_questions(&self) -> Result<Vec<String>, BotError> {
        let rows: Vec<(String,)> = sqlx::query_as(SELECT_TRIGGERS)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|r| r.0).collect())
    }

    async fn find_event(&self, alias: &str) -> Result<Option<Event>, BotError> {
        let row: Option<EventRow> = sqlx::query_as(SELECT_EVENT)
            .bind(alias)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| r.0))
    }

    async fn install_event(&self, alias: &str, version: &str) -> Result<EventId, BotError> {
        let result = sqlx::query(INSERT_EVENT)
            .bind(alias)
            .bind(version)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(EventId::new(result.last_insert_rowid()))
    }

    async fn update_event_version(&self, event_id: EventId, version: &str) -> Result<(), BotError> {
        sqlx::query(UPDATE_EVENT_VERSION)
            .bind(version)
            .bind(event_id.get())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn find_scenario(
        &self,
        event_id: EventId,
        name: &str,
    ) -> Result<Option<ScenarioId>, BotError> {
        let row: Option<(i64,)> = sqlx::query_as(SELECT_SCENARIO)
            .bind(event_id.get())
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|r| ScenarioId::new(r.0)))
    }

    async fn insert_scenario(&self, name: &str, event_id: EventId) -> Result<ScenarioId, BotError> {
        let result = sqlx::query(INSERT_SCENARIO)
            .bind(name)
            .bind(event_id.get())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(ScenarioId::new(result.last_insert_rowid()))
    }

    async fn insert_question(
        &self,
        scenario_id: ScenarioId,
        question: &Question,
    ) -> Result<QuestionId, BotError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let regex_id = match &question.pattern {
            Some(pattern) => {
                let group = question
                    .capture_group
                    .map(|g| i64::try_from(g).unwrap_or(i64::MAX));
                sqlx::query(INSERT_REGEX)
                    .bind(pattern)
                    .bind(group)
                    .execute(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
                let (id,): (i64,) = sqlx::query_as(SELECT_REGEX_ID)
                    .bind(pattern)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(StorageError::from)?;
                Some(id)
            }
            None => None,
        };

        let result = sqlx::query(INSERT_QUESTION)
            .bind(&question.text)
            .bind(&question.answer)
            .bind(scenario_id.get())
            .bind(regex_id)
            .bind(question.is_variable)
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;
        Ok(QuestionId::new(result.last_insert_rowid()))
    }
}
