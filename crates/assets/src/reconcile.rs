//! Reconciliation of stored objects against record references.
//!
//! Upload and record-update are separate remote calls, so storage can hold
//! objects no record knows about: a rollback whose compensating delete
//! failed, or a crash between upload and the record update. The scanner
//! audits the managed namespace against the record index and removes such
//! orphans.
//!
//! The age threshold protects in-flight work. An upload may have just
//! succeeded while the record update that registers it has not committed
//! yet; without the threshold such objects would be misclassified as
//! orphans and deleted.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sacco_records_common::constants::{DEFAULT_SCAN_OBJECT_CAP, DELETE_BATCH_LIMIT};

use crate::error::{BatchDeleteError, ReconcileError};
use crate::traits::{IncompleteRecord, ObjectInfo, ObjectStoreClient, RecordIndex};
use crate::types::StoreLocation;

/// Options for a reconciliation run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum objects examined per run.
    pub max_objects: usize,
    /// Keys per delete batch (clamped to the store's bulk-delete limit).
    pub delete_batch_size: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_objects: DEFAULT_SCAN_OBJECT_CAP,
            delete_batch_size: DELETE_BATCH_LIMIT,
        }
    }
}

impl ScanOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum objects examined per run.
    pub fn with_max_objects(mut self, max_objects: usize) -> Self {
        self.max_objects = max_objects;
        self
    }

    /// Set the keys per delete batch.
    pub fn with_delete_batch_size(mut self, delete_batch_size: usize) -> Self {
        self.delete_batch_size = delete_batch_size;
        self
    }
}

/// Report from a reconciliation run.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// Keys classified as orphaned (deleted unless the run was a dry run).
    pub orphaned_keys: Vec<String>,
    /// Objects confirmed deleted.
    pub deleted_count: usize,
    /// Delete batches that failed; remaining batches still ran.
    pub errors: Vec<BatchDeleteError>,
}

/// Audits the managed namespace and removes orphaned objects.
pub struct ReconciliationScanner<'a, C: ObjectStoreClient, R: RecordIndex> {
    /// The object store client.
    client: &'a C,
    /// Read-side view of the document database.
    index: &'a R,
    /// Managed namespace configuration.
    location: StoreLocation,
    /// Scan options.
    options: ScanOptions,
}

impl<'a, C: ObjectStoreClient, R: RecordIndex> ReconciliationScanner<'a, C, R> {
    /// Create a new reconciliation scanner.
    ///
    /// # Arguments
    /// * `client` - Object store client
    /// * `index` - Record index to audit against
    /// * `location` - Managed namespace configuration
    pub fn new(client: &'a C, index: &'a R, location: StoreLocation) -> Self {
        Self {
            client,
            index,
            location,
            options: ScanOptions::default(),
        }
    }

    /// Set scan options.
    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Audit storage against the record index and remove orphans.
    ///
    /// An object is orphaned when no record references its key AND it is
    /// older than `older_than`. Objects with unknown timestamps are never
    /// classified as orphans - an unprovable age gets the same in-flight
    /// protection as a young one.
    ///
    /// # Arguments
    /// * `older_than` - Minimum object age before deletion is allowed
    /// * `dry_run` - Report the candidate set without deleting
    ///
    /// # Errors
    /// A failed index read or listing is fatal to the run - a partial
    /// orphan set must never be trusted. Failed delete batches are
    /// accumulated in the report instead.
    pub async fn scan(
        &self,
        older_than: Duration,
        dry_run: bool,
    ) -> Result<ScanReport, ReconcileError> {
        let valid_keys: HashSet<String> = self
            .index
            .read_all_asset_keys()
            .await
            .map_err(|error| ReconcileError::IndexReadFailed {
                message: error.to_string(),
            })?
            .into_iter()
            .map(|reference| reference.remote_key)
            .collect();

        let prefix: String = self.location.namespace_prefix();
        let listing: Vec<ObjectInfo> = self
            .client
            .list_objects(&self.location.bucket, &prefix, self.options.max_objects)
            .await
            .map_err(|error| ReconcileError::ListFailed {
                prefix: prefix.clone(),
                message: error.to_string(),
            })?;

        let cutoff: i64 = current_epoch_seconds() - older_than.as_secs() as i64;
        let orphaned_keys: Vec<String> = listing
            .into_iter()
            .filter(|object| !valid_keys.contains(&object.key))
            .filter(|object| matches!(object.last_modified, Some(ts) if ts < cutoff))
            .map(|object| object.key)
            .collect();

        if dry_run || orphaned_keys.is_empty() {
            return Ok(ScanReport {
                orphaned_keys,
                ..Default::default()
            });
        }

        let batch_size: usize = self.options.delete_batch_size.clamp(1, DELETE_BATCH_LIMIT);
        let mut deleted_count: usize = 0;
        let mut errors: Vec<BatchDeleteError> = Vec::new();

        for batch in orphaned_keys.chunks(batch_size) {
            match self.client.delete_batch(&self.location.bucket, batch).await {
                Ok(outcome) => {
                    deleted_count += outcome.deleted.len();
                    if !outcome.failed.is_empty() {
                        log::warn!(
                            "Reconciliation delete left {} of {} keys in place",
                            outcome.failed.len(),
                            batch.len()
                        );
                        let message: String = outcome.failed[0].1.clone();
                        errors.push(BatchDeleteError::new(
                            outcome.failed.into_iter().map(|(key, _)| key).collect(),
                            message,
                        ));
                    }
                }
                Err(error) => {
                    log::warn!("Reconciliation delete batch failed: {}", error);
                    errors.push(BatchDeleteError::new(batch.to_vec(), error.to_string()));
                }
            }
        }

        Ok(ScanReport {
            orphaned_keys,
            deleted_count,
            errors,
        })
    }

    /// Report every record whose upload state is not complete.
    ///
    /// Read-only diagnostic for operator follow-up; mutates nothing.
    pub async fn find_incomplete_records(
        &self,
    ) -> Result<Vec<IncompleteRecord>, ReconcileError> {
        self.index
            .find_incomplete_records()
            .await
            .map_err(|error| ReconcileError::IndexReadFailed {
                message: error.to_string(),
            })
    }
}

/// Get current time as epoch seconds.
fn current_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
