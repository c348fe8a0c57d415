//! Key-value backend port
//!
//! The policy type store only needs three things from the shared key-value
//! system: enumerate a namespace, read a batch of keys and write a key only if
//! it is absent. Any backend offering those, with `set_if_absent` atomic per
//! key, can hold the A1 namespace.

pub mod key;
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub mod testing;

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

/// Default namespace of the A1 mediator
pub const A1_NAMESPACE: &str = "A1m_ns";

/// Failures reported by a backend. All of them are potentially transient.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Backend could not be reached
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the operation
    #[error("rejected by backend: {0}")]
    Rejected(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                BackendError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(db_err) => BackendError::Rejected(db_err.to_string()),
            other => BackendError::Database(other),
        }
    }
}

/// Operations the policy type store requires from the key-value system
#[async_trait]
pub trait Backend: Send + Sync {
    /// All keys currently stored in `namespace`, in backend order
    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, BackendError>;

    /// Values for `keys`. Absent keys are either omitted or mapped to `None`.
    async fn get_by_keys(
        &self,
        namespace: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Option<String>>, BackendError>;

    /// Store `value` under `key` unless the key exists.
    /// Returns `true` when this call created the key.
    async fn set_if_absent(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<bool, BackendError>;

    /// Cheap liveness probe
    async fn healthcheck(&self) -> Result<(), BackendError>;
}
