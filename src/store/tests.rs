use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio_test::block_on;

use super::{PolicyTypeStore, StoreError};
use crate::models::{PolicyTypeId, PolicyTypeSchema};
use crate::storage::testing::FailingBackend;
use crate::storage::{Backend, BackendError, MemoryBackend, A1_NAMESPACE};

fn schema(id: i64, name: &str) -> PolicyTypeSchema {
    PolicyTypeSchema {
        policy_type_id: PolicyTypeId(id),
        name: name.to_string(),
        description: "various parameters to control admission of dual connection".to_string(),
        create_schema: json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "properties": {
                "enforce": {"type": "boolean", "default": "true"},
                "blocking_rate": {"type": "number", "default": 10, "minimum": 1, "maximum": 100}
            },
            "additionalProperties": false
        }),
    }
}

fn memory_store() -> (Arc<MemoryBackend>, PolicyTypeStore) {
    let backend = Arc::new(MemoryBackend::new());
    let store = PolicyTypeStore::new(backend.clone(), A1_NAMESPACE);
    (backend, store)
}

/// Memory backend that counts writes
#[derive(Default)]
struct RecordingBackend {
    inner: MemoryBackend,
    writes: AtomicUsize,
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn list_keys(&self, namespace: &str) -> Result<Vec<String>, BackendError> {
        self.inner.list_keys(namespace).await
    }

    async fn get_by_keys(
        &self,
        namespace: &str,
        keys: &[String],
    ) -> Result<HashMap<String, Option<String>>, BackendError> {
        self.inner.get_by_keys(namespace, keys).await
    }

    async fn set_if_absent(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> Result<bool, BackendError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(namespace, key, value).await
    }

    async fn healthcheck(&self) -> Result<(), BackendError> {
        self.inner.healthcheck().await
    }
}

#[test]
fn test_create_then_get_round_trip() {
    let (_, store) = memory_store();
    let original = schema(20001, "admission_control_policy_mine");

    block_on(store.create_policy_type(PolicyTypeId(20001), &original)).unwrap();
    let fetched = block_on(store.get_policy_type(PolicyTypeId(20001))).unwrap();

    assert_eq!(fetched, original);
}

#[test]
fn test_second_create_is_rejected_and_first_value_kept() {
    let (_, store) = memory_store();
    let first = schema(20001, "first");
    let second = schema(20001, "second");

    block_on(store.create_policy_type(PolicyTypeId(20001), &first)).unwrap();
    let err = block_on(store.create_policy_type(PolicyTypeId(20001), &second)).unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(PolicyTypeId(20001))));

    let stored = block_on(store.get_policy_type(PolicyTypeId(20001))).unwrap();
    assert_eq!(stored.name, "first");
}

#[test]
fn test_identifier_mismatch_skips_backend() {
    let backend = Arc::new(RecordingBackend::default());
    let store = PolicyTypeStore::new(backend.clone(), A1_NAMESPACE);

    let err = block_on(store.create_policy_type(PolicyTypeId(5), &schema(6, "mismatch"))).unwrap_err();

    match err {
        StoreError::IdentifierMismatch { path, body } => {
            assert_eq!(path, PolicyTypeId(5));
            assert_eq!(body, PolicyTypeId(6));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    assert!(block_on(backend.list_keys(A1_NAMESPACE)).unwrap().is_empty());
}

#[test]
fn test_create_issues_single_write() {
    let backend = Arc::new(RecordingBackend::default());
    let store = PolicyTypeStore::new(backend.clone(), A1_NAMESPACE);

    block_on(store.create_policy_type(PolicyTypeId(1), &schema(1, "one"))).unwrap();
    assert_eq!(backend.writes.load(Ordering::SeqCst), 1);
}

#[test]
fn test_list_filters_other_key_families() {
    let (backend, store) = memory_store();
    for k in [
        "a1.policy_instance.1006001.qos",
        "a1.policy_type.1006001",
        "a1.policy_type.20000",
        "a1.policy_inst_metadata.1006001.qos",
    ] {
        backend.insert(A1_NAMESPACE, k, "{}");
    }

    let ids: HashSet<PolicyTypeId> = block_on(store.list_policy_type_ids())
        .unwrap()
        .into_iter()
        .collect();

    assert_eq!(ids, HashSet::from([PolicyTypeId(1006001), PolicyTypeId(20000)]));
}

#[test]
fn test_list_skips_undecodable_type_keys() {
    let (backend, store) = memory_store();
    backend.insert(A1_NAMESPACE, "a1.policy_type.notanumber", "{}");
    backend.insert(A1_NAMESPACE, "a1.policy_type.42", "{}");

    let ids = block_on(store.list_policy_type_ids()).unwrap();
    assert_eq!(ids, vec![PolicyTypeId(42)]);
}

#[test]
fn test_list_empty_namespace() {
    let (_, store) = memory_store();
    assert!(block_on(store.list_policy_type_ids()).unwrap().is_empty());
}

#[test]
fn test_list_ignores_other_namespaces() {
    let (backend, store) = memory_store();
    backend.insert("other_ns", "a1.policy_type.1", "{}");
    assert!(block_on(store.list_policy_type_ids()).unwrap().is_empty());
}

#[test]
fn test_get_missing_is_not_found() {
    let (_, store) = memory_store();
    let err = block_on(store.get_policy_type(PolicyTypeId(999))).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(PolicyTypeId(999))));
}

#[test]
fn test_get_empty_value_is_not_found() {
    let (backend, store) = memory_store();
    backend.insert(A1_NAMESPACE, "a1.policy_type.3", "");
    let err = block_on(store.get_policy_type(PolicyTypeId(3))).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn test_get_null_value_is_not_found() {
    let (backend, store) = memory_store();
    backend.insert(A1_NAMESPACE, "a1.policy_type.9", "null");
    backend.insert(A1_NAMESPACE, "a1.policy_type.10", "\"null\"");

    for id in [9, 10] {
        let err = block_on(store.get_policy_type(PolicyTypeId(id))).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(found) if found == PolicyTypeId(id)));
    }
}

#[test]
fn test_get_corrupt_value() {
    let (backend, store) = memory_store();
    backend.insert(A1_NAMESPACE, "a1.policy_type.4", "{\"policy_type_id\": 4,");

    let err = block_on(store.get_policy_type(PolicyTypeId(4))).unwrap_err();
    match err {
        StoreError::CorruptStoredValue { key, .. } => assert_eq!(key, "a1.policy_type.4"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_get_quoted_value() {
    let (backend, store) = memory_store();
    let original = schema(20001, "quoted");
    let quoted = serde_json::to_string(&serde_json::to_string(&original).unwrap()).unwrap();
    backend.insert(A1_NAMESPACE, "a1.policy_type.20001", quoted);

    assert_eq!(block_on(store.get_policy_type(PolicyTypeId(20001))).unwrap(), original);
}

#[test]
fn test_negative_and_zero_ids_accepted() {
    let (_, store) = memory_store();
    block_on(store.create_policy_type(PolicyTypeId(0), &schema(0, "zero"))).unwrap();
    block_on(store.create_policy_type(PolicyTypeId(-1), &schema(-1, "negative"))).unwrap();

    let mut ids = block_on(store.list_policy_type_ids()).unwrap();
    ids.sort();
    assert_eq!(ids, vec![PolicyTypeId(-1), PolicyTypeId(0)]);
}

#[test]
fn test_backend_errors_propagate() {
    let store = PolicyTypeStore::new(Arc::new(FailingBackend), A1_NAMESPACE);

    assert!(matches!(
        block_on(store.list_policy_type_ids()),
        Err(StoreError::Backend(BackendError::Unavailable(_)))
    ));
    assert!(matches!(
        block_on(store.get_policy_type(PolicyTypeId(1))),
        Err(StoreError::Backend(_))
    ));
    assert!(matches!(
        block_on(store.create_policy_type(PolicyTypeId(1), &schema(1, "x"))),
        Err(StoreError::Backend(_))
    ));
    assert!(block_on(store.healthcheck()).is_err());
}

#[test]
fn test_status_counts_instances_of_type_only() {
    let (backend, store) = memory_store();
    block_on(store.create_policy_type(PolicyTypeId(20000), &schema(20000, "t"))).unwrap();
    backend.insert(A1_NAMESPACE, "a1.policy_instance.20000.qos", "{}");
    backend.insert(A1_NAMESPACE, "a1.policy_instance.20000.video", "{}");
    backend.insert(A1_NAMESPACE, "a1.policy_instance.200001.qos", "{}");
    backend.insert(A1_NAMESPACE, "a1.policy_inst_metadata.20000.qos", "{}");

    let status = block_on(store.get_policy_type_status(PolicyTypeId(20000))).unwrap();
    assert_eq!(status.policy_type_id, PolicyTypeId(20000));
    assert_eq!(status.num_instances, 2);
}

#[test]
fn test_status_of_missing_type() {
    let (backend, store) = memory_store();
    backend.insert(A1_NAMESPACE, "a1.policy_instance.7.orphan", "{}");

    let err = block_on(store.get_policy_type_status(PolicyTypeId(7))).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(PolicyTypeId(7))));
}

#[tokio::test]
async fn test_concurrent_creates_single_success() {
    let (_, store) = memory_store();
    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .create_policy_type(PolicyTypeId(77), &schema(77, &format!("writer-{i}")))
                .await
        }));
    }

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => created += 1,
            Err(StoreError::AlreadyExists(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!((created, conflicts), (1, 7));
}

#[tokio::test]
async fn test_injected_span() {
    let (_, store) = memory_store();
    let store = store.with_span(tracing::info_span!("a1", component = "policy_types"));
    assert_eq!(store.namespace(), "A1m_ns");
    assert!(store.list_policy_type_ids().await.unwrap().is_empty());
}
