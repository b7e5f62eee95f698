//! Upload status classification.
//!
//! This module contains pure logic for classifying a record's slot state.
//! No I/O operations - just set comparison.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Aggregate upload state of a record's attachment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    /// No upload has been attempted yet.
    Pending,
    /// Some required slots are populated, but not all.
    Partial,
    /// Every required slot is populated.
    Complete,
    /// An attempted batch left zero slots populated.
    Failed,
}

impl UploadStatus {
    /// Classify a record's slot state.
    ///
    /// Complete iff the populated set covers every required slot. Partial
    /// iff at least one required slot is populated but not all. Otherwise
    /// Failed when an upload has ever been attempted, Pending when not.
    ///
    /// # Arguments
    /// * `required_slots` - The record's required slot set
    /// * `populated_slots` - Every slot currently holding a reference
    /// * `attempted` - Whether an upload batch has ever run for the record
    pub fn compute(
        required_slots: &HashSet<String>,
        populated_slots: &HashSet<String>,
        attempted: bool,
    ) -> Self {
        let populated_required: usize = required_slots
            .iter()
            .filter(|slot| populated_slots.contains(*slot))
            .count();

        if populated_required == required_slots.len() {
            UploadStatus::Complete
        } else if populated_required > 0 {
            UploadStatus::Partial
        } else if attempted {
            UploadStatus::Failed
        } else {
            UploadStatus::Pending
        }
    }

    /// True for statuses that need operator follow-up.
    pub fn needs_followup(&self) -> bool {
        !matches!(self, UploadStatus::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot_set(slots: &[&str]) -> HashSet<String> {
        slots.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compute_pending_before_any_attempt() {
        let status: UploadStatus =
            UploadStatus::compute(&slot_set(&["a", "b", "c"]), &HashSet::new(), false);
        assert_eq!(status, UploadStatus::Pending);
    }

    #[test]
    fn test_compute_failed_after_attempt_with_nothing_populated() {
        let status: UploadStatus =
            UploadStatus::compute(&slot_set(&["a", "b", "c"]), &HashSet::new(), true);
        assert_eq!(status, UploadStatus::Failed);
    }

    #[test]
    fn test_compute_partial() {
        let status: UploadStatus =
            UploadStatus::compute(&slot_set(&["a", "b", "c"]), &slot_set(&["a"]), true);
        assert_eq!(status, UploadStatus::Partial);
    }

    #[test]
    fn test_compute_complete() {
        let status: UploadStatus = UploadStatus::compute(
            &slot_set(&["a", "b", "c"]),
            &slot_set(&["a", "b", "c"]),
            true,
        );
        assert_eq!(status, UploadStatus::Complete);
    }

    #[test]
    fn test_compute_ignores_extra_populated_slots() {
        // A populated slot outside the required set neither completes nor
        // partials the record on its own.
        let status: UploadStatus =
            UploadStatus::compute(&slot_set(&["a", "b"]), &slot_set(&["x"]), true);
        assert_eq!(status, UploadStatus::Failed);
    }

    #[test]
    fn test_compute_empty_required_set_is_complete() {
        let status: UploadStatus =
            UploadStatus::compute(&HashSet::new(), &HashSet::new(), false);
        assert_eq!(status, UploadStatus::Complete);
    }

    #[test]
    fn test_needs_followup() {
        assert!(UploadStatus::Pending.needs_followup());
        assert!(UploadStatus::Partial.needs_followup());
        assert!(UploadStatus::Failed.needs_followup());
        assert!(!UploadStatus::Complete.needs_followup());
    }
}
