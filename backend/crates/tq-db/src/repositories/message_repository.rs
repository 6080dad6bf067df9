use crate::{DbError, MAX_PAGE_LIMIT, Result as DbErrorResult};

use tq_core::{CoreError, CoreResult, MessagePage, MessageSink, StoredMessage};

use async_trait::async_trait;
use chrono::DateTime;
use log::debug;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// SQLite-backed message store.
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn create(&self, message: &StoredMessage) -> DbErrorResult<()> {
        let payload = serde_json::to_string(&message.payload)
            .map_err(|e| DbError::decode(&message.id.to_string(), e.to_string()))?;

        sqlx::query(
            r#"
              INSERT INTO tq_messages (id, tenant_id, payload, created_at)
              VALUES (?, ?, ?, ?)
              "#,
        )
        .bind(message.id.to_string())
        .bind(&message.tenant_id)
        .bind(payload)
        .bind(message.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> DbErrorResult<Option<StoredMessage>> {
        let row = sqlx::query(
            r#"
              SELECT id, tenant_id, payload, created_at
              FROM tq_messages
              WHERE id = ?
              "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row).transpose()
    }

    /// Newest-first page of a tenant's messages.
    ///
    /// `cursor` is the `next_cursor` of the previous page; the page starts
    /// just after that message. `limit` is clamped to `1..=MAX_PAGE_LIMIT`.
    pub async fn find_by_tenant(
        &self,
        tenant_id: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> DbErrorResult<MessagePage> {
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);

        let before_seq = match cursor {
            Some(cursor) => Some(self.cursor_seq(tenant_id, cursor).await?),
            None => None,
        };

        // One extra row tells us whether an older page exists
        let rows = sqlx::query(
            r#"
              SELECT id, tenant_id, payload, created_at
              FROM tq_messages
              WHERE tenant_id = ? AND (? IS NULL OR seq < ?)
              ORDER BY seq DESC
              LIMIT ?
              "#,
        )
        .bind(tenant_id)
        .bind(before_seq)
        .bind(before_seq)
        .bind(i64::from(limit) + 1)
        .fetch_all(&self.pool)
        .await?;

        let mut data = rows
            .iter()
            .map(map_row)
            .collect::<DbErrorResult<Vec<_>>>()?;

        let next_cursor = if data.len() > limit as usize {
            data.truncate(limit as usize);
            data.last().map(|m| m.id.to_string())
        } else {
            None
        };

        Ok(MessagePage { data, next_cursor })
    }

    pub async fn count_by_tenant(&self, tenant_id: &str) -> DbErrorResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tq_messages WHERE tenant_id = ?")
            .bind(tenant_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Delete every message for a tenant, returning how many were removed.
    pub async fn delete_by_tenant(&self, tenant_id: &str) -> DbErrorResult<u64> {
        let result = sqlx::query("DELETE FROM tq_messages WHERE tenant_id = ?")
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        debug!(
            "Deleted {} messages for tenant {}",
            result.rows_affected(),
            tenant_id
        );
        Ok(result.rows_affected())
    }

    async fn cursor_seq(&self, tenant_id: &str, cursor: &str) -> DbErrorResult<i64> {
        let seq: Option<i64> =
            sqlx::query_scalar("SELECT seq FROM tq_messages WHERE id = ? AND tenant_id = ?")
                .bind(cursor)
                .bind(tenant_id)
                .fetch_optional(&self.pool)
                .await?;

        seq.ok_or_else(|| DbError::invalid_cursor(cursor))
    }
}

fn map_row(row: &SqliteRow) -> DbErrorResult<StoredMessage> {
    let id: String = row.try_get("id")?;
    let payload: String = row.try_get("payload")?;
    let created_at: i64 = row.try_get("created_at")?;

    Ok(StoredMessage {
        id: Uuid::parse_str(&id).map_err(|e| DbError::decode(&id, e.to_string()))?,
        tenant_id: row.try_get("tenant_id")?,
        payload: serde_json::from_str(&payload).map_err(|e| DbError::decode(&id, e.to_string()))?,
        created_at: DateTime::from_timestamp_millis(created_at)
            .ok_or_else(|| DbError::decode(&id, format!("bad timestamp {created_at}")))?,
    })
}

#[async_trait]
impl MessageSink for MessageRepository {
    async fn persist(&self, tenant_id: &str, payload: Value) -> CoreResult<StoredMessage> {
        let message = StoredMessage::new(tenant_id, payload);

        self.create(&message)
            .await
            .map_err(|e| CoreError::sink(tenant_id, e.to_string()))?;

        Ok(message)
    }
}
