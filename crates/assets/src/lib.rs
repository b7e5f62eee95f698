//! Asset upload lifecycle for sacco records.
//!
//! Every membership, loan, and application record owns a fixed set of
//! named attachment slots (identity documents, portrait photo) stored in
//! an external object store. This crate provides the storage-facing half
//! of record creation and review:
//!
//! - **UploadCoordinator** - all-or-nothing creation-time batch upload
//!   with a compensating delete on partial failure
//! - **RetryCoordinator** - idempotent re-upload of only the missing slots
//! - **UploadStatus** - pure classification of a record's slot state
//! - **ReconciliationScanner** - scheduled audit removing stored objects
//!   no record references, bounded by an age threshold
//!
//! # Deterministic keys
//!
//! Every remote key is derived from the owning record's identifier and the
//! slot name. A re-attempted upload overwrites the prior object instead of
//! accumulating copies, which is what makes retries idempotent and lets
//! reconciliation compare stored keys directly against record references.
//!
//! # Collaborators
//!
//! The object store and the document database are remote dependencies
//! reached through the `ObjectStoreClient` and `RecordIndex` traits. The
//! two cannot be transactionally coordinated, so the creation batch
//! carries an explicit compensating action instead of pretending to
//! commit atomically.

mod error;
mod reconcile;
mod retry;
mod status;
mod traits;
mod types;
mod upload;

#[cfg(test)]
mod test_support;

pub use error::{AssetStoreError, BatchDeleteError, ReconcileError, RecordIndexError};
pub use reconcile::{ReconciliationScanner, ScanOptions, ScanReport};
pub use retry::{RetryCoordinator, RetryOutcome};
pub use status::UploadStatus;
pub use traits::{
    BatchDeleteOutcome, IncompleteRecord, ObjectInfo, ObjectStoreClient, RecordAssetKey,
    RecordIndex,
};
pub use types::{
    AssetReference, ResourceKind, SlotUpload, StoreLocation, UploadAttemptState, UploadMetadata,
    UploadOptions, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_UPLOAD_CONCURRENCY,
};
pub use upload::{BatchUploadOutcome, UploadCoordinator};
