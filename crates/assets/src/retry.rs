//! Idempotent re-upload of missing attachment slots.
//!
//! Retries run after the record already exists and may be in active use,
//! so unlike the creation batch there is no rollback: a slot that uploads
//! successfully stays uploaded even when a sibling slot fails. Only slots
//! absent from the record's populated set are attempted, which makes
//! repeated calls with the same candidate set safe - a previously
//! successful slot is never re-uploaded and can never regress.
//!
//! A slot that failed before is re-attempted at the same deterministic
//! remote key, overwriting whatever partial object may exist there.

use std::collections::{HashMap, HashSet};

use crate::traits::ObjectStoreClient;
use crate::types::{AssetReference, SlotUpload, StoreLocation, UploadOptions};
use crate::upload::{upload_slots, SlotAttempt};

/// Result of a retry batch.
#[derive(Debug, Clone, Default)]
pub struct RetryOutcome {
    /// Slot name -> stored reference for slots uploaded on this attempt.
    pub populated_slots: HashMap<String, AssetReference>,
    /// Slot name -> error message for slots that failed on this attempt.
    pub failures_by_slot: HashMap<String, String>,
    /// Candidate slots skipped because they were already populated.
    pub skipped_slots: Vec<String>,
}

/// Re-uploads the missing slots of an existing record.
pub struct RetryCoordinator<'a, C: ObjectStoreClient> {
    /// The object store client.
    client: &'a C,
    /// Managed namespace configuration.
    location: StoreLocation,
    /// Upload options.
    options: UploadOptions,
}

impl<'a, C: ObjectStoreClient> RetryCoordinator<'a, C> {
    /// Create a new retry coordinator.
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

    /// Upload the candidates whose slots are not yet populated.
    ///
    /// # Arguments
    /// * `owner_key` - The record's canonical identifier
    /// * `current_populated` - Slots already holding a reference
    /// * `candidates` - Slot payloads offered for this attempt
    ///
    /// # Returns
    /// Per-slot results for this attempt. Failures never abort the batch
    /// and nothing is rolled back; the caller merges `populated_slots`
    /// into the record and updates its attempt state.
    pub async fn retry_batch(
        &self,
        owner_key: &str,
        current_populated: &HashSet<String>,
        candidates: Vec<SlotUpload>,
    ) -> RetryOutcome {
        let (skipped, to_attempt): (Vec<SlotUpload>, Vec<SlotUpload>) = candidates
            .into_iter()
            .partition(|candidate| current_populated.contains(&candidate.slot));

        let mut outcome = RetryOutcome {
            skipped_slots: skipped.into_iter().map(|candidate| candidate.slot).collect(),
            ..Default::default()
        };

        if to_attempt.is_empty() {
            return outcome;
        }

        let attempts: Vec<SlotAttempt> = upload_slots(
            self.client,
            &self.location,
            &self.options,
            owner_key,
            to_attempt,
        )
        .await;

        for attempt in attempts {
            match attempt.result {
                Ok(reference) => {
                    outcome.populated_slots.insert(attempt.slot, reference);
                }
                Err(error) => {
                    outcome.failures_by_slot.insert(attempt.slot, error.to_string());
                }
            }
        }

        outcome
    }
}
