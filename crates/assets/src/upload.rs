//! Create-time batch upload with compensating rollback.
//!
//! A record is persisted before any of its attachments exist; the creation
//! batch then either populates every slot or leaves storage exactly as it
//! found it. Downstream review logic assumes a partially populated record
//! can only result from an explicit retry, never from initial submission,
//! so the creation batch is all-or-nothing:
//!
//! - Phase 1: attempt each upload independently (one failure does not
//!   abort the others), bounded by the configured concurrency and per-call
//!   timeout.
//! - Phase 2: if any upload failed, bulk-delete every key that succeeded.
//!   If the compensating delete itself fails, the outcome carries a
//!   distinct `rollback_incomplete` flag so operators know orphaned
//!   objects may remain until the reconciliation scan removes them.
//!
//! The coordinator performs no database writes - the caller persists the
//! returned references and status.

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::error::AssetStoreError;
use crate::traits::ObjectStoreClient;
use crate::types::{AssetReference, SlotUpload, StoreLocation, UploadOptions};

/// Result of a create-time batch upload.
///
/// Always returned as data, never as an error - per-slot failures are part
/// of the outcome so the caller can still persist the record in failed
/// status instead of losing it.
#[derive(Debug, Clone, Default)]
pub struct BatchUploadOutcome {
    /// True if every slot in the batch uploaded successfully.
    pub all_succeeded: bool,
    /// Slot name -> stored reference. Empty unless `all_succeeded`.
    pub populated_slots: HashMap<String, AssetReference>,
    /// Slot name -> error message for slots that failed.
    pub failures_by_slot: HashMap<String, String>,
    /// True if the compensating delete after a failed batch did not remove
    /// every uploaded object.
    pub rollback_incomplete: bool,
}

/// Uploads a new record's attachment batch, all-or-nothing.
pub struct UploadCoordinator<'a, C: ObjectStoreClient> {
    /// The object store client.
    client: &'a C,
    /// Managed namespace configuration.
    location: StoreLocation,
    /// Upload options.
    options: UploadOptions,
}

impl<'a, C: ObjectStoreClient> UploadCoordinator<'a, C> {
    /// Create a new upload coordinator.
    ///
    /// # Arguments
    /// * `client` - Object store client
    /// * `location` - Managed namespace configuration
    pub fn new(client: &'a C, location: StoreLocation) -> Self {
        Self {
            client,
            location,
            options: UploadOptions::default(),
        }
    }

    /// Set upload options.
    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = options;
        self
    }

    /// Upload every asset in the batch for a newly created record.
    ///
    /// # Arguments
    /// * `owner_key` - The record's canonical identifier
    /// * `assets` - Slot payloads to store
    ///
    /// # Returns
    /// The batch outcome. On any failure the batch is rolled back and
    /// `populated_slots` is empty; the record should be persisted with
    /// failed status and retried later.
    pub async fn upload_batch(
        &self,
        owner_key: &str,
        assets: Vec<SlotUpload>,
    ) -> BatchUploadOutcome {
        if assets.is_empty() {
            return BatchUploadOutcome {
                all_succeeded: true,
                ..Default::default()
            };
        }

        // Phase 1: attempt every upload independently.
        let attempts: Vec<SlotAttempt> = upload_slots(
            self.client,
            &self.location,
            &self.options,
            owner_key,
            assets,
        )
        .await;

        let mut populated: HashMap<String, AssetReference> = HashMap::new();
        let mut failures: HashMap<String, String> = HashMap::new();
        let mut uploaded_keys: Vec<String> = Vec::new();
        for attempt in attempts {
            match attempt.result {
                Ok(reference) => {
                    uploaded_keys.push(reference.remote_key.clone());
                    populated.insert(attempt.slot, reference);
                }
                Err(error) => {
                    failures.insert(attempt.slot, error.to_string());
                }
            }
        }

        if failures.is_empty() {
            return BatchUploadOutcome {
                all_succeeded: true,
                populated_slots: populated,
                ..Default::default()
            };
        }

        // Phase 2: roll back the slots that did succeed, so the record
        // never points at some-but-not-all of its documents.
        let rollback_incomplete: bool = !self.rollback(&uploaded_keys).await;

        BatchUploadOutcome {
            all_succeeded: false,
            populated_slots: HashMap::new(),
            failures_by_slot: failures,
            rollback_incomplete,
        }
    }

    /// Delete the uploaded keys of a failed batch.
    ///
    /// # Returns
    /// True if every uploaded object was removed.
    async fn rollback(&self, keys: &[String]) -> bool {
        if keys.is_empty() {
            return true;
        }

        match self.client.delete_batch(&self.location.bucket, keys).await {
            Ok(outcome) => {
                for (key, message) in &outcome.failed {
                    log::warn!("Rollback delete left {} in place: {}", key, message);
                }
                outcome.failed.is_empty()
            }
            Err(error) => {
                log::warn!("Rollback delete batch failed: {}", error);
                false
            }
        }
    }
}

/// One slot's upload attempt.
pub(crate) struct SlotAttempt {
    /// Slot name.
    pub(crate) slot: String,
    /// The upload result.
    pub(crate) result: Result<AssetReference, AssetStoreError>,
}

/// Attempt every upload in the batch with bounded concurrency.
///
/// Failure of one upload does not abort the others; each attempt's result
/// is collected for the caller to aggregate.
pub(crate) async fn upload_slots<C: ObjectStoreClient>(
    client: &C,
    location: &StoreLocation,
    options: &UploadOptions,
    owner_key: &str,
    assets: Vec<SlotUpload>,
) -> Vec<SlotAttempt> {
    let max_concurrency: usize = options.max_concurrency.max(1);
    let call_timeout: Duration = options.call_timeout;

    stream::iter(assets)
        .map(|asset| async move {
            let key: String = location.asset_key(owner_key, &asset.slot);
            let result: Result<AssetReference, AssetStoreError> =
                upload_with_timeout(client, &location.bucket, &key, &asset, call_timeout).await;
            SlotAttempt {
                slot: asset.slot,
                result,
            }
        })
        .buffer_unordered(max_concurrency)
        .collect()
        .await
}

/// Upload one payload with the configured per-call bound.
///
/// A timed-out call counts as a failure exactly like an error response.
async fn upload_with_timeout<C: ObjectStoreClient>(
    client: &C,
    bucket: &str,
    key: &str,
    asset: &SlotUpload,
    call_timeout: Duration,
) -> Result<AssetReference, AssetStoreError> {
    match tokio::time::timeout(
        call_timeout,
        client.upload(bucket, key, &asset.payload, &asset.metadata),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(AssetStoreError::Timeout {
            operation: format!("upload {}", key),
            seconds: call_timeout.as_secs(),
        }),
    }
}
