//! Shared data structures for asset storage operations.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::status::UploadStatus;

/// Default concurrency for uploads within one batch.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 4;

/// Default bound on each remote call, in seconds.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

/// Kind of binary resource held in a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// Image document (ID scans, portrait photos).
    Image,
    /// Opaque binary payload.
    Raw,
}

/// A stored asset as referenced from a record.
///
/// Populated by the upload coordinators and persisted on the record by the
/// caller. Never mutated in place - a retry replaces the whole reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReference {
    /// Opaque storage identifier (the deterministic remote key).
    pub remote_key: String,
    /// Public URL the stored object is served from.
    pub delivery_url: String,
    /// File format, e.g. `"jpg"` or `"pdf"`.
    pub format: Option<String>,
    /// Pixel width, when known for image resources.
    pub pixel_width: Option<u32>,
    /// Pixel height, when known for image resources.
    pub pixel_height: Option<u32>,
    /// Stored size in bytes.
    pub byte_size: u64,
    /// Upload timestamp (Unix epoch seconds).
    pub created_at: i64,
    /// Kind of resource stored.
    pub resource_kind: ResourceKind,
}

/// Caller-supplied metadata accompanying one upload.
///
/// Pixel dimensions come from the form layer that decoded the image; the
/// store cannot infer them from an opaque payload.
#[derive(Debug, Clone, Default)]
pub struct UploadMetadata {
    /// Content type to store with the object, e.g. `"image/jpeg"`.
    pub content_type: Option<String>,
    /// File format recorded on the reference, e.g. `"jpg"`.
    pub format: Option<String>,
    /// Kind of resource being stored.
    pub resource_kind: Option<ResourceKind>,
    /// Pixel width, when the caller decoded an image.
    pub pixel_width: Option<u32>,
    /// Pixel height, when the caller decoded an image.
    pub pixel_height: Option<u32>,
}

impl UploadMetadata {
    /// Metadata for an image document with known dimensions.
    pub fn image(format: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            content_type: None,
            format: Some(format.into()),
            resource_kind: Some(ResourceKind::Image),
            pixel_width: Some(width),
            pixel_height: Some(height),
        }
    }
}

/// One slot's payload within an upload batch.
#[derive(Debug, Clone)]
pub struct SlotUpload {
    /// Slot name, e.g. `"portrait"`.
    pub slot: String,
    /// Binary payload to store.
    pub payload: Vec<u8>,
    /// Metadata recorded alongside the payload.
    pub metadata: UploadMetadata,
}

impl SlotUpload {
    /// Create a slot upload with default metadata.
    pub fn new(slot: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            slot: slot.into(),
            payload,
            metadata: UploadMetadata::default(),
        }
    }

    /// Attach metadata to this upload.
    pub fn with_metadata(mut self, metadata: UploadMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Bucket and prefix configuration for the managed asset namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreLocation {
    /// Bucket name.
    pub bucket: String,
    /// Root prefix for all managed objects (e.g. `"records"`).
    pub root_prefix: String,
}

impl StoreLocation {
    /// Create a new store location.
    pub fn new(bucket: impl Into<String>, root_prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            root_prefix: root_prefix.into(),
        }
    }

    /// Deterministic remote key for a record's slot.
    ///
    /// Returns: `"{root_prefix}/{owner_key}/{slot}"`. The key depends only
    /// on the owning record and slot name, so a re-attempt overwrites the
    /// prior object instead of accumulating copies.
    pub fn asset_key(&self, owner_key: &str, slot: &str) -> String {
        if self.root_prefix.is_empty() {
            format!("{}/{}", owner_key, slot)
        } else {
            format!("{}/{}/{}", self.root_prefix, owner_key, slot)
        }
    }

    /// Prefix covering every slot of one record.
    pub fn owner_prefix(&self, owner_key: &str) -> String {
        if self.root_prefix.is_empty() {
            format!("{}/", owner_key)
        } else {
            format!("{}/{}/", self.root_prefix, owner_key)
        }
    }

    /// Prefix covering the whole managed namespace.
    pub fn namespace_prefix(&self) -> String {
        if self.root_prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", self.root_prefix)
        }
    }
}

/// Options for upload and retry batches.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Maximum concurrent uploads within one batch.
    pub max_concurrency: usize,
    /// Bound on each remote call.
    pub call_timeout: Duration,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_UPLOAD_CONCURRENCY,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }
}

impl UploadOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum concurrency for uploads within one batch.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Set the bound on each remote call.
    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }
}

/// Per-record upload bookkeeping persisted alongside the asset slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAttemptState {
    /// Aggregate status of the record's required slots.
    pub status: UploadStatus,
    /// Number of upload batches attempted, including the creation batch.
    pub attempt_count: u32,
    /// When the last batch ran (Unix epoch seconds).
    pub last_attempt_at: Option<i64>,
    /// Slot name -> last error message. Entries are removed on success.
    pub errors_by_slot: HashMap<String, String>,
}

impl Default for UploadAttemptState {
    fn default() -> Self {
        Self {
            status: UploadStatus::Pending,
            attempt_count: 0,
            last_attempt_at: None,
            errors_by_slot: HashMap::new(),
        }
    }
}

impl UploadAttemptState {
    /// State for a record that has never attempted an upload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the outcome of one upload batch.
    ///
    /// Increments the attempt count, stamps the attempt time, clears
    /// errors for slots now populated, records errors for slots that
    /// failed, and reclassifies the status.
    ///
    /// # Arguments
    /// * `required_slots` - The record's required slot set
    /// * `populated_slots` - Every slot currently holding a reference
    /// * `failures_by_slot` - Per-slot errors from this batch
    /// * `now` - Attempt time (Unix epoch seconds)
    pub fn record_attempt(
        &mut self,
        required_slots: &HashSet<String>,
        populated_slots: &HashSet<String>,
        failures_by_slot: &HashMap<String, String>,
        now: i64,
    ) {
        self.attempt_count += 1;
        self.last_attempt_at = Some(now);

        self.errors_by_slot
            .retain(|slot, _| !populated_slots.contains(slot));
        for (slot, message) in failures_by_slot {
            self.errors_by_slot.insert(slot.clone(), message.clone());
        }

        self.status = UploadStatus::compute(required_slots, populated_slots, true);
    }
}
