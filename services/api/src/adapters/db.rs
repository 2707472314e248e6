//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! `MessageStore` port from the `core` crate. It stores submitted messages in
//! PostgreSQL using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linguaverse_core::domain::Message;
use linguaverse_core::ports::{MessageStore, PortError, PortResult};
use sqlx::migrate::MigrateError;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `MessageStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the embedded migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

//=========================================================================================
// Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    text: String,
    author_id: String,
    created_at: DateTime<Utc>,
}

impl MessageRecord {
    fn to_domain(self) -> Message {
        Message {
            id: self.id.to_string(),
            text: self.text,
            author_id: self.author_id,
            timestamp: self.created_at,
        }
    }
}

//=========================================================================================
// `MessageStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl MessageStore for DbAdapter {
    async fn add_message(&self, text: &str, author_id: &str) -> PortResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            "INSERT INTO messages (id, text, author_id) VALUES ($1, $2, $3) \
             RETURNING id, text, author_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(text)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }
}
