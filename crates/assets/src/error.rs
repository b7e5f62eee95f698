//! Error types for asset storage operations.

use thiserror::Error;

/// Errors that can occur talking to the object store.
#[derive(Error, Debug, Clone)]
pub enum AssetStoreError {
    /// Object not found in the store.
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Access denied.
    #[error("Access denied to {bucket}/{key}: {message}")]
    AccessDenied {
        bucket: String,
        key: String,
        message: String,
    },

    /// Network error.
    #[error("Network error: {message}")]
    NetworkError { message: String, retryable: bool },

    /// A remote call exceeded its bounded timeout.
    #[error("Timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Other error.
    #[error("{message}")]
    Other { message: String },
}

impl AssetStoreError {
    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            AssetStoreError::NotFound { .. } => false,
            AssetStoreError::AccessDenied { .. } => false,
            AssetStoreError::NetworkError { retryable, .. } => *retryable,
            AssetStoreError::Timeout { .. } => true,
            AssetStoreError::InvalidConfig { .. } => false,
            AssetStoreError::Other { .. } => false,
        }
    }
}

/// Error reading from the record index.
#[derive(Error, Debug, Clone)]
#[error("Record index error: {message}")]
pub struct RecordIndexError {
    /// Error message from the document database.
    pub message: String,
}

impl RecordIndexError {
    /// Create a new record index error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fatal errors for a reconciliation run.
///
/// A run whose inputs cannot be read is abandoned whole - a partial orphan
/// set must never be trusted for deletion.
#[derive(Error, Debug, Clone)]
pub enum ReconcileError {
    /// Reading asset references from the record index failed.
    #[error("Failed to read asset references from the record index: {message}")]
    IndexReadFailed { message: String },

    /// Listing the managed storage namespace failed.
    #[error("Failed to list objects under {prefix}: {message}")]
    ListFailed { prefix: String, message: String },
}

/// Non-fatal failure of one delete batch during reconciliation.
///
/// Accumulated into the scan report; remaining batches still run.
#[derive(Debug, Clone)]
pub struct BatchDeleteError {
    /// Keys left in place by the failed batch.
    pub keys: Vec<String>,
    /// The error that occurred.
    pub message: String,
}

impl BatchDeleteError {
    /// Create a new batch delete error.
    pub fn new(keys: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            keys,
            message: message.into(),
        }
    }
}
