use async_trait::async_trait;
use sqlx::types::Json;
use users_shared::{User, UserRecord};

use super::{generate_id, StoreError, StoreResult, UserStore};
use crate::db::DbPool;

type DocumentRow = (String, serde_json::Value);

/// `users` collection kept as JSONB documents in Postgres.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: DbPool,
}

impl PgUserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode((id, data): DocumentRow) -> StoreResult<User> {
    match serde_json::from_value::<UserRecord>(data) {
        Ok(record) => Ok(record.with_id(id)),
        Err(source) => Err(StoreError::CorruptDocument { id, source }),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, record: &UserRecord) -> StoreResult<String> {
        let id = generate_id();

        sqlx::query("INSERT INTO users (id, data) VALUES ($1, $2)")
            .bind(&id)
            .bind(Json(record))
            .execute(&self.pool)
            .await?;

        Ok(id)
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<DocumentRow> = sqlx::query_as("SELECT id, data FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(decode).collect()
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        let row: Option<DocumentRow> = sqlx::query_as("SELECT id, data FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(decode).transpose()
    }

    async fn update(&self, id: &str, record: &UserRecord) -> StoreResult<()> {
        // Merge, so keys written by other clients survive.
        let result = sqlx::query("UPDATE users SET data = data || $2 WHERE id = $1")
            .bind(id)
            .bind(Json(record))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
