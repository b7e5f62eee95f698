//! In-memory collaborator fakes shared by the coordinator tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::{AssetStoreError, RecordIndexError};
use crate::traits::{
    BatchDeleteOutcome, IncompleteRecord, ObjectInfo, ObjectStoreClient, RecordAssetKey,
    RecordIndex,
};
use crate::types::{AssetReference, ResourceKind, UploadMetadata};

/// A stored object in the fake store.
#[derive(Debug, Clone)]
struct StoredObject {
    byte_size: u64,
    last_modified: Option<i64>,
}

/// In-memory `ObjectStoreClient` with failure injection.
pub(crate) struct InMemoryObjectStore {
    /// Key -> stored object, ordered for deterministic listings.
    objects: Mutex<BTreeMap<String, StoredObject>>,
    /// Keys whose uploads fail.
    fail_upload_keys: Mutex<HashSet<String>>,
    /// Keys whose uploads never complete.
    stall_upload_keys: Mutex<HashSet<String>>,
    /// When true, every bulk delete returns an error without deleting.
    fail_delete_batch: Mutex<bool>,
    /// Keys that bulk deletes refuse to remove.
    fail_delete_keys: Mutex<HashSet<String>>,
    /// When true, listings return an error.
    fail_list: Mutex<bool>,
    /// Upload attempts per key.
    upload_attempts: Mutex<BTreeMap<String, u32>>,
}

impl InMemoryObjectStore {
    pub(crate) fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            fail_upload_keys: Mutex::new(HashSet::new()),
            stall_upload_keys: Mutex::new(HashSet::new()),
            fail_delete_batch: Mutex::new(false),
            fail_delete_keys: Mutex::new(HashSet::new()),
            fail_list: Mutex::new(false),
            upload_attempts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Make uploads to the given key fail with a network error.
    pub(crate) fn fail_uploads_for(&self, key: &str) {
        self.fail_upload_keys.lock().unwrap().insert(key.to_string());
    }

    /// Make uploads to the given key hang until cancelled.
    pub(crate) fn stall_uploads_for(&self, key: &str) {
        self.stall_upload_keys
            .lock()
            .unwrap()
            .insert(key.to_string());
    }

    /// Make every bulk delete fail outright.
    pub(crate) fn fail_delete_batches(&self) {
        *self.fail_delete_batch.lock().unwrap() = true;
    }

    /// Make bulk deletes refuse to remove the given key.
    pub(crate) fn fail_deletes_for(&self, key: &str) {
        self.fail_delete_keys.lock().unwrap().insert(key.to_string());
    }

    /// Make listings fail with a network error.
    pub(crate) fn fail_listings(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    /// Seed an object whose timestamp is `age` before now.
    pub(crate) fn insert_aged_object(&self, key: &str, age: Duration) {
        let last_modified: i64 = current_epoch_seconds() - age.as_secs() as i64;
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                byte_size: 64,
                last_modified: Some(last_modified),
            },
        );
    }

    /// Seed an object whose timestamp the store does not report.
    pub(crate) fn insert_untimed_object(&self, key: &str) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                byte_size: 64,
                last_modified: None,
            },
        );
    }

    pub(crate) fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub(crate) fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect()
    }

    /// Number of upload attempts observed for a key.
    pub(crate) fn upload_attempts(&self, key: &str) -> u32 {
        self.upload_attempts
            .lock()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        payload: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<AssetReference, AssetStoreError> {
        *self
            .upload_attempts
            .lock()
            .unwrap()
            .entry(key.to_string())
            .or_insert(0) += 1;

        if self.stall_upload_keys.lock().unwrap().contains(key) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        if self.fail_upload_keys.lock().unwrap().contains(key) {
            return Err(AssetStoreError::NetworkError {
                message: "injected upload failure".to_string(),
                retryable: true,
            });
        }

        let now: i64 = current_epoch_seconds();
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                byte_size: payload.len() as u64,
                last_modified: Some(now),
            },
        );

        Ok(AssetReference {
            remote_key: key.to_string(),
            delivery_url: format!("https://{}.store.test/{}", bucket, key),
            format: metadata.format.clone(),
            pixel_width: metadata.pixel_width,
            pixel_height: metadata.pixel_height,
            byte_size: payload.len() as u64,
            created_at: now,
            resource_kind: metadata.resource_kind.unwrap_or(ResourceKind::Raw),
        })
    }

    async fn delete(&self, _bucket: &str, key: &str) -> Result<bool, AssetStoreError> {
        Ok(self.objects.lock().unwrap().remove(key).is_some())
    }

    async fn delete_batch(
        &self,
        _bucket: &str,
        keys: &[String],
    ) -> Result<BatchDeleteOutcome, AssetStoreError> {
        if *self.fail_delete_batch.lock().unwrap() {
            return Err(AssetStoreError::NetworkError {
                message: "injected delete batch failure".to_string(),
                retryable: true,
            });
        }

        let refused = self.fail_delete_keys.lock().unwrap();
        let mut objects = self.objects.lock().unwrap();
        let mut outcome = BatchDeleteOutcome::default();
        for key in keys {
            if refused.contains(key) {
                outcome
                    .failed
                    .push((key.clone(), "injected delete failure".to_string()));
                continue;
            }
            objects.remove(key);
            outcome.deleted.push(key.clone());
        }
        Ok(outcome)
    }

    async fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
        max_keys: usize,
    ) -> Result<Vec<ObjectInfo>, AssetStoreError> {
        if *self.fail_list.lock().unwrap() {
            return Err(AssetStoreError::NetworkError {
                message: "injected list failure".to_string(),
                retryable: true,
            });
        }

        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .take(max_keys)
            .map(|(key, object)| ObjectInfo {
                key: key.clone(),
                size: object.byte_size,
                last_modified: object.last_modified,
            })
            .collect())
    }
}

/// In-memory `RecordIndex` for reconciliation tests.
pub(crate) struct FakeRecordIndex {
    references: Mutex<Vec<RecordAssetKey>>,
    incomplete: Mutex<Vec<IncompleteRecord>>,
    fail_reads: Mutex<bool>,
}

impl FakeRecordIndex {
    pub(crate) fn new() -> Self {
        Self {
            references: Mutex::new(Vec::new()),
            incomplete: Mutex::new(Vec::new()),
            fail_reads: Mutex::new(false),
        }
    }

    /// Register a record's reference to a remote key.
    pub(crate) fn reference(&self, record_id: &str, remote_key: &str) {
        self.references.lock().unwrap().push(RecordAssetKey {
            record_id: record_id.to_string(),
            remote_key: remote_key.to_string(),
        });
    }

    /// Register an incomplete record for the diagnostic query.
    pub(crate) fn add_incomplete(&self, record: IncompleteRecord) {
        self.incomplete.lock().unwrap().push(record);
    }

    /// Make every read fail.
    pub(crate) fn fail_reads(&self) {
        *self.fail_reads.lock().unwrap() = true;
    }
}

#[async_trait]
impl RecordIndex for FakeRecordIndex {
    async fn read_all_asset_keys(&self) -> Result<Vec<RecordAssetKey>, RecordIndexError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(RecordIndexError::new("injected index failure"));
        }
        Ok(self.references.lock().unwrap().clone())
    }

    async fn find_incomplete_records(&self) -> Result<Vec<IncompleteRecord>, RecordIndexError> {
        if *self.fail_reads.lock().unwrap() {
            return Err(RecordIndexError::new("injected index failure"));
        }
        Ok(self.incomplete.lock().unwrap().clone())
    }
}

/// Get current time as epoch seconds.
fn current_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
