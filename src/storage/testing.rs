//! Test doubles for the backend port

use std::collections::HashMap;

use async_trait::async_trait;

use super::{Backend, BackendError};

/// Backend whose every call fails as if the store were down
pub struct FailingBackend;

fn refused() -> BackendError {
    BackendError::Unavailable("connection refused".to_string())
}

#[async_trait]
impl Backend for FailingBackend {
    async fn list_keys(&self, _namespace: &str) -> Result<Vec<String>, BackendError> {
        Err(refused())
    }

    async fn get_by_keys(
        &self,
        _namespace: &str,
        _keys: &[String],
    ) -> Result<HashMap<String, Option<String>>, BackendError> {
        Err(refused())
    }

    async fn set_if_absent(
        &self,
        _namespace: &str,
        _key: &str,
        _value: &str,
    ) -> Result<bool, BackendError> {
        Err(refused())
    }

    async fn healthcheck(&self) -> Result<(), BackendError> {
        Err(refused())
    }
}
