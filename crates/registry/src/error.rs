//! Error types for identifier allocation.

use thiserror::Error;

/// Errors from the counter store backend.
#[derive(Error, Debug, Clone)]
pub enum CounterStoreError {
    /// The backing store rejected or could not complete the operation.
    #[error("Counter store unavailable: {message}")]
    Unavailable { message: String },

    /// The store returned a value that cannot be used as a sequence.
    #[error("Counter {name} returned invalid sequence value {value}")]
    InvalidSequence { name: String, value: i64 },
}

/// Errors surfaced to record-creation callers.
#[derive(Error, Debug, Clone)]
pub enum AllocationError {
    /// The atomic increment could not complete. No identifier was assigned,
    /// and the dependent record must not be created without one.
    #[error("Failed to allocate sequence for counter {name}: {source}")]
    AllocationFailed {
        name: String,
        #[source]
        source: CounterStoreError,
    },
}

impl AllocationError {
    /// Name of the counter whose allocation failed.
    pub fn counter_name(&self) -> &str {
        match self {
            AllocationError::AllocationFailed { name, .. } => name,
        }
    }
}
