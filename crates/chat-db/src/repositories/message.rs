//! PostgreSQL implementation of MessageStore

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::Message;
use chat_core::traits::{HistoryQuery, MessageStore, RepoResult};
use chat_core::value_objects::{MessageId, UserId};

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::map_db_error;

/// PostgreSQL implementation of MessageStore
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Rows come back newest-first; callers want oldest-first.
    fn into_chronological(rows: Vec<MessageModel>) -> RepoResult<Vec<Message>> {
        let mut messages = rows
            .into_iter()
            .map(Message::try_from)
            .collect::<RepoResult<Vec<_>>>()?;
        messages.reverse();
        Ok(messages)
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    #[instrument(skip(self, message), fields(message_id = %message.id, sender_id = %message.sender_id))]
    async fn append(&self, message: &Message) -> RepoResult<MessageId> {
        let row = MessageInsert::new(message);

        sqlx::query(
            r"
            INSERT INTO messages (id, sender_id, room, recipients, text, meta, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(row.id)
        .bind(row.sender_id)
        .bind(row.room)
        .bind(row.recipients)
        .bind(row.text)
        .bind(row.meta)
        .bind(row.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(message.id)
    }

    #[instrument(skip(self))]
    async fn room_history(&self, room: &str, query: HistoryQuery) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, room, recipients, text, meta, created_at
            FROM messages
            WHERE room = $1 AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            ",
        )
        .bind(room)
        .bind(query.before)
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::into_chronological(rows)
    }

    #[instrument(skip(self))]
    async fn private_history(
        &self,
        a: UserId,
        b: UserId,
        query: HistoryQuery,
    ) -> RepoResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, sender_id, room, recipients, text, meta, created_at
            FROM messages
            WHERE recipients @> ARRAY[$1, $2]::uuid[]
              AND cardinality(recipients) = CASE WHEN $1 = $2 THEN 1 ELSE 2 END
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            ",
        )
        .bind(a.into_inner())
        .bind(b.into_inner())
        .bind(query.before)
        .bind(i64::from(query.limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Self::into_chronological(rows)
    }
}
