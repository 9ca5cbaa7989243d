//! PostgreSQL backend: one `client_state` row per key, JSONB values.

use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::StateError;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and runs the bundled migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StateError> {
        let pool = PgPoolOptions::new().max_connections(max_connections).connect(url).await?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(sqlx::Error::from)?;
        Ok(Self { pool })
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>, StateError> {
        let value = sqlx::query_scalar::<_, Value>("SELECT value FROM client_state WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<(), StateError> {
        sqlx::query("INSERT INTO client_state (key, value, updated_at) VALUES ($1, $2, NOW()) ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), StateError> {
        sqlx::query("DELETE FROM client_state WHERE key = $1").bind(key).execute(&self.pool).await?;
        Ok(())
    }
}
