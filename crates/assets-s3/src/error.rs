//! Error types for the S3 object store client.

use sacco_records_assets::AssetStoreError;
use thiserror::Error;

/// Errors specific to the S3 client.
#[derive(Error, Debug)]
pub enum S3ClientError {
    /// AWS SDK error.
    #[error("AWS SDK error: {message}")]
    SdkError { message: String, retryable: bool },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<S3ClientError> for AssetStoreError {
    fn from(err: S3ClientError) -> Self {
        match err {
            S3ClientError::SdkError { message, retryable } => {
                AssetStoreError::NetworkError { message, retryable }
            }
            S3ClientError::ConfigError(message) => AssetStoreError::InvalidConfig { message },
        }
    }
}
