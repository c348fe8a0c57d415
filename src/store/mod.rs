//! Policy Type Store
//!
//! Stateless facade over a [`Backend`] implementing the policy type rules:
//!
//! - a type is created at most once (first writer wins, never replaced)
//! - the id in the request path must match the id inside the document
//! - enumeration only reports keys of the policy type family
//!
//! All durable state lives in the backend. Create-once relies on the backend's
//! atomic `set_if_absent`; this module never reads before writing.

#[cfg(test)]
mod tests;

use std::sync::Arc;

use thiserror::Error;
use tracing::{Id, Span};

use crate::models::{PolicyTypeId, PolicyTypeSchema, PolicyTypeStatus};
use crate::storage::key;
use crate::storage::{Backend, BackendError};

/// Failures of policy type operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// Path id and document id disagree
    #[error("policy type id mismatch: path {path}, body {body}")]
    IdentifierMismatch {
        path: PolicyTypeId,
        body: PolicyTypeId,
    },

    #[error("policy type {0} already exists")]
    AlreadyExists(PolicyTypeId),

    #[error("policy type {0} not found")]
    NotFound(PolicyTypeId),

    /// Stored value under `key` cannot be decoded
    #[error("corrupt value stored under {key}: {source}")]
    CorruptStoredValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize policy type: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Policy type operations bound to one namespace
#[derive(Clone)]
pub struct PolicyTypeStore {
    backend: Arc<dyn Backend>,
    namespace: String,
    span: Option<Span>,
}

impl PolicyTypeStore {
    pub fn new(backend: Arc<dyn Backend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            span: None,
        }
    }

    /// Nest every store event under `span` instead of the caller's current span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    fn parent_span(&self) -> Option<Id> {
        match &self.span {
            Some(span) => span.id(),
            None => Span::current().id(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Ids of all stored policy types, in backend order
    #[tracing::instrument(parent = self.parent_span(), skip(self))]
    pub async fn list_policy_type_ids(&self) -> StoreResult<Vec<PolicyTypeId>> {
        let keys = self.backend.list_keys(&self.namespace).await?;
        tracing::debug!(total_keys = keys.len(), "listed namespace");

        let ids: Vec<PolicyTypeId> = keys.iter().filter_map(|k| key::decode_type_id(k)).collect();
        tracing::debug!(?ids, "policy types found");
        Ok(ids)
    }

    /// Fetch one policy type
    #[tracing::instrument(parent = self.parent_span(), skip(self))]
    pub async fn get_policy_type(&self, id: PolicyTypeId) -> StoreResult<PolicyTypeSchema> {
        let type_key = key::type_key(id);
        let mut values = self
            .backend
            .get_by_keys(&self.namespace, std::slice::from_ref(&type_key))
            .await?;

        let decoded = match values.remove(&type_key).flatten() {
            Some(raw) => key::decode_stored_value(&raw).map_err(|source| {
                tracing::error!(%type_key, error = %source, "stored policy type is corrupt");
                StoreError::CorruptStoredValue { key: type_key.clone(), source }
            })?,
            None => None,
        };

        decoded.ok_or_else(|| {
            tracing::debug!(%type_key, "policy type not present");
            StoreError::NotFound(id)
        })
    }

    /// Store a new policy type; never replaces an existing one
    #[tracing::instrument(parent = self.parent_span(), skip(self, schema), fields(name = %schema.name))]
    pub async fn create_policy_type(
        &self,
        id: PolicyTypeId,
        schema: &PolicyTypeSchema,
    ) -> StoreResult<()> {
        if schema.policy_type_id != id {
            tracing::debug!(body = %schema.policy_type_id, "policy type id mismatch");
            return Err(StoreError::IdentifierMismatch {
                path: id,
                body: schema.policy_type_id,
            });
        }

        let type_key = key::type_key(id);
        let value = key::encode_stored_value(schema).map_err(StoreError::Serialize)?;

        let created = self
            .backend
            .set_if_absent(&self.namespace, &type_key, &value)
            .await?;

        if !created {
            tracing::debug!(%type_key, "policy type already exists");
            return Err(StoreError::AlreadyExists(id));
        }

        tracing::info!(%type_key, "policy type created");
        Ok(())
    }

    /// Existence check plus the number of instances stored under the type
    #[tracing::instrument(parent = self.parent_span(), skip(self))]
    pub async fn get_policy_type_status(&self, id: PolicyTypeId) -> StoreResult<PolicyTypeStatus> {
        let type_key = key::type_key(id);
        let prefix = key::instance_prefix(id);

        let keys = self.backend.list_keys(&self.namespace).await?;

        let mut found = false;
        let mut num_instances = 0;
        for k in keys.iter().map(|k| k.trim()) {
            if k == type_key {
                found = true;
            } else if k.starts_with(&prefix) {
                num_instances += 1;
            }
        }

        if !found {
            return Err(StoreError::NotFound(id));
        }

        Ok(PolicyTypeStatus {
            policy_type_id: id,
            num_instances,
        })
    }

    /// Probe the backend
    pub async fn healthcheck(&self) -> StoreResult<()> {
        self.backend.healthcheck().await?;
        Ok(())
    }
}
