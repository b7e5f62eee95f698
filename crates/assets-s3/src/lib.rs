//! AWS S3 backend for sacco-records asset storage.
//!
//! This crate provides an `ObjectStoreClient` implementation using the
//! AWS SDK for Rust. It supports all operations the upload coordinators
//! and the reconciliation scanner require: overwriting puts at
//! deterministic keys, single and bulk deletes, and paged listings.
//!
//! # Example
//!
//! ```ignore
//! use sacco_records_assets::{StoreLocation, UploadCoordinator};
//! use sacco_records_assets_s3::{S3ObjectStoreClient, S3Settings};
//!
//! let settings = S3Settings::default();
//! let client = S3ObjectStoreClient::new(settings).await?;
//!
//! let location = StoreLocation::new("records-bucket", "records");
//! let coordinator = UploadCoordinator::new(&client, location);
//! ```

mod client;
mod error;
mod settings;

pub use client::S3ObjectStoreClient;
pub use error::S3ClientError;
pub use settings::{AwsCredentials, S3Settings};
