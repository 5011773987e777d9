//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `threadbot-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, writes through the
//! single-connection writer pool so appends on a thread serialize at the
//! database level as well.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use threadbot_core::store::SessionStore;
use threadbot_types::error::StoreError;
use threadbot_types::message::{Message, MessageRole};
use threadbot_types::model::ModelId;
use threadbot_types::session::{ConversationSession, ThreadId};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn load_messages(&self, thread_id: ThreadId) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query("SELECT role, content FROM messages WHERE thread_id = ? ORDER BY seq ASC")
            .bind(thread_id.to_string())
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = MessageRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }
        Ok(messages)
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct SessionRow {
    thread_id: String,
    model: String,
    created_at: String,
}

impl SessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            thread_id: row.try_get("thread_id")?,
            model: row.try_get("model")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_session(self, messages: Vec<Message>) -> Result<ConversationSession, StoreError> {
        let thread_id: ThreadId = self
            .thread_id
            .parse()
            .map_err(|e| StoreError::Query(format!("invalid thread_id: {e}")))?;
        let model: ModelId = self
            .model
            .parse()
            .map_err(|e: String| StoreError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(ConversationSession {
            thread_id,
            model,
            messages,
            created_at,
        })
    }
}

struct MessageRow {
    role: String,
    content: String,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            role: row.try_get("role")?,
            content: row.try_get("content")?,
        })
    }

    fn into_message(self) -> Result<Message, StoreError> {
        let role: MessageRole = self
            .role
            .parse()
            .map_err(|e: String| StoreError::Query(e))?;
        Ok(Message::new(role, self.content))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db| db.is_unique_violation())
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn create(
        &self,
        thread_id: ThreadId,
        model: ModelId,
    ) -> Result<ConversationSession, StoreError> {
        let session = ConversationSession::new(thread_id, model);

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        sqlx::query("INSERT INTO sessions (thread_id, model, created_at) VALUES (?, ?, ?)")
            .bind(thread_id.to_string())
            .bind(model.to_string())
            .bind(format_datetime(&session.created_at))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::AlreadyExists
                } else {
                    StoreError::Query(e.to_string())
                }
            })?;

        // Seed the system persona atomically with the session row.
        let persona = &session.messages[0];
        sqlx::query(
            "INSERT INTO messages (id, thread_id, seq, role, content, created_at) VALUES (?, ?, 0, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(thread_id.to_string())
        .bind(persona.role.to_string())
        .bind(&persona.content)
        .bind(format_datetime(&session.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(session)
    }

    async fn get(&self, thread_id: ThreadId) -> Result<Option<ConversationSession>, StoreError> {
        let row = sqlx::query("SELECT * FROM sessions WHERE thread_id = ?")
            .bind(thread_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row =
                    SessionRow::from_row(&row).map_err(|e| StoreError::Query(e.to_string()))?;
                let messages = self.load_messages(thread_id).await?;
                Ok(Some(session_row.into_session(messages)?))
            }
            None => Ok(None),
        }
    }

    async fn append_message(
        &self,
        thread_id: ThreadId,
        message: Message,
    ) -> Result<ConversationSession, StoreError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        // Next slot in the append-only history; also verifies the session
        // exists before inserting.
        let (session_count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM sessions WHERE thread_id = ?")
                .bind(thread_id.to_string())
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| StoreError::Query(e.to_string()))?;
        if session_count == 0 {
            return Err(StoreError::NotFound);
        }

        let (next_seq,): (i64,) = sqlx::query_as(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM messages WHERE thread_id = ?",
        )
        .bind(thread_id.to_string())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        sqlx::query(
            "INSERT INTO messages (id, thread_id, seq, role, content, created_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(thread_id.to_string())
        .bind(next_seq)
        .bind(message.role.to_string())
        .bind(&message.content)
        .bind(format_datetime(&Utc::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        self.get(thread_id).await?.ok_or(StoreError::NotFound)
    }
}
