//! PostgreSQL backend - one table holding every namespace

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use super::{Backend, BackendError};

/// Key-value view over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the key-value table exists
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, BackendError> {
        let pool = create_pool(database_url, max_connections).await?;
        run_migrations(&pool).await?;
        Ok(Self::new(pool))
    }
}

/// Create database connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Key-value schema applied successfully");
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS a1_kv (
    namespace VARCHAR(255) NOT NULL,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    created_at TIMESTAMPTZ DEFAULT NOW(),
    PRIMARY KEY (namespace, key)
);
"#;

#[async_trait]
impl Backend for PgBackend {
    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, BackendError> {
        let rows = sqlx::query("SELECT key FROM a1_kv WHERE namespace = $1")
            .bind(namespace)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("key").map_err(BackendError::from))
            .collect()
    }

    async fn get_by_keys(
        &self,
        namespace: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Option<String>>, BackendError> {
        let rows = sqlx::query("SELECT key, value FROM a1_kv WHERE namespace = $1 AND key = ANY($2)")
            .bind(namespace)
            .bind(keys)
            .fetch_all(&self.pool)
            .await?;

        let mut values = HashMap::with_capacity(rows.len());
        for row in rows {
            values.insert(row.try_get("key")?, Some(row.try_get("value")?));
        }
        Ok(values)
    }

    async fn set_if_absent(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<bool, BackendError> {
        // The primary key makes this a single atomic check-and-set
        let result = sqlx::query(
            r#"
            INSERT INTO a1_kv (namespace, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (namespace, key) DO NOTHING
            "#
        )
        .bind(namespace)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn healthcheck(&self) -> Result<(), BackendError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
