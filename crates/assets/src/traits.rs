//! Collaborator interfaces for asset storage.

use async_trait::async_trait;

use crate::error::{AssetStoreError, RecordIndexError};
use crate::status::UploadStatus;
use crate::types::{AssetReference, UploadMetadata};

/// Information about a stored object from list operations.
#[derive(Debug, Clone)]
pub struct ObjectInfo {
    /// Object key.
    pub key: String,
    /// Object size in bytes.
    pub size: u64,
    /// Creation timestamp (Unix epoch seconds), when the store reports one.
    pub last_modified: Option<i64>,
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteOutcome {
    /// Keys confirmed deleted.
    pub deleted: Vec<String>,
    /// Keys that could not be deleted, with their error messages.
    pub failed: Vec<(String, String)>,
}

/// Low-level object store operations - implemented by each backend.
#[async_trait]
pub trait ObjectStoreClient: Send + Sync {
    /// Store a payload at the given key, overwriting any existing object.
    ///
    /// Keys are deterministic (derived from the owning record and slot),
    /// so a re-attempt replaces the prior object instead of accumulating
    /// copies.
    ///
    /// # Returns
    /// A reference describing the stored object.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        payload: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<AssetReference, AssetStoreError>;

    /// Delete a single object.
    ///
    /// # Returns
    /// True if an object was removed, false if the key was already absent.
    async fn delete(&self, bucket: &str, key: &str) -> Result<bool, AssetStoreError>;

    /// Delete a batch of objects in one request.
    ///
    /// Callers bound the batch to the store's bulk-delete limit. Per-key
    /// failures are reported in the outcome, not as an error.
    async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<BatchDeleteOutcome, AssetStoreError>;

    /// List objects under a prefix, up to `max_keys`.
    ///
    /// Implementations page internally and stop once `max_keys` objects
    /// have been collected.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: usize,
    ) -> Result<Vec<ObjectInfo>, AssetStoreError>;
}

/// One (record, remote key) pair from the record index.
#[derive(Debug, Clone)]
pub struct RecordAssetKey {
    /// The record holding the reference.
    pub record_id: String,
    /// The referenced remote key.
    pub remote_key: String,
}

/// A record whose upload state needs operator follow-up.
#[derive(Debug, Clone)]
pub struct IncompleteRecord {
    /// The record's identifier.
    pub record_id: String,
    /// Current upload status (never `Complete`).
    pub status: UploadStatus,
    /// Upload batches attempted so far.
    pub attempt_count: u32,
    /// When the last batch ran (Unix epoch seconds).
    pub last_attempt_at: Option<i64>,
}

/// Read-side view of the document database used by reconciliation.
#[async_trait]
pub trait RecordIndex: Send + Sync {
    /// Read every record's asset remote keys.
    ///
    /// The result is the complete reference set; reconciliation treats any
    /// stored object outside it as an orphan candidate.
    async fn read_all_asset_keys(&self) -> Result<Vec<RecordAssetKey>, RecordIndexError>;

    /// Report every record whose upload state is not complete.
    async fn find_incomplete_records(&self) -> Result<Vec<IncompleteRecord>, RecordIndexError>;
}
