//! AWS SDK S3 client implementation.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client as S3Client;

use sacco_records_assets::{
    AssetReference, AssetStoreError, BatchDeleteOutcome, ObjectInfo, ObjectStoreClient,
    ResourceKind, UploadMetadata,
};
use sacco_records_common::constants::DELETE_BATCH_LIMIT;

use crate::error::S3ClientError;
use crate::settings::S3Settings;

/// `ObjectStoreClient` implementation using the AWS SDK for Rust.
///
/// Puts are plain overwrites, which is what gives the coordinators their
/// deterministic-key semantics: re-uploading a slot replaces the object.
pub struct S3ObjectStoreClient {
    /// The underlying S3 client.
    s3_client: S3Client,
    /// Region, used to build delivery URLs.
    region: String,
    /// Expected bucket owner for security validation.
    expected_bucket_owner: Option<String>,
}

impl S3ObjectStoreClient {
    /// Create a new S3 client with the default credential chain.
    ///
    /// # Arguments
    /// * `settings` - Region and optional explicit credentials
    pub async fn new(settings: S3Settings) -> Result<Self, S3ClientError> {
        let config_loader = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(settings.region.clone()));

        let config_loader = if let Some(ref creds) = settings.credentials {
            let credentials = Credentials::new(
                &creds.access_key_id,
                &creds.secret_access_key,
                creds.session_token.clone(),
                None,
                "sacco-records",
            );
            config_loader.credentials_provider(credentials)
        } else {
            config_loader
        };

        let sdk_config = config_loader.load().await;
        let s3_client = S3Client::new(&sdk_config);

        Ok(Self {
            s3_client,
            region: settings.region,
            expected_bucket_owner: settings.expected_bucket_owner,
        })
    }

    /// Create a client from an existing S3Client (for testing).
    ///
    /// # Arguments
    /// * `s3_client` - Pre-configured S3 client
    /// * `region` - Region used to build delivery URLs
    /// * `expected_bucket_owner` - Optional expected bucket owner
    pub fn from_client(
        s3_client: S3Client,
        region: impl Into<String>,
        expected_bucket_owner: Option<String>,
    ) -> Self {
        Self {
            s3_client,
            region: region.into(),
            expected_bucket_owner,
        }
    }

    /// Public URL the stored object is served from.
    fn delivery_url(&self, bucket: &str, key: &str) -> String {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, self.region, key)
    }
}

#[async_trait]
impl ObjectStoreClient for S3ObjectStoreClient {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        payload: &[u8],
        metadata: &UploadMetadata,
    ) -> Result<AssetReference, AssetStoreError> {
        let body = ByteStream::from(payload.to_vec());

        let mut request = self
            .s3_client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body);

        if let Some(ref owner) = self.expected_bucket_owner {
            request = request.expected_bucket_owner(owner);
        }

        if let Some(ref content_type) = metadata.content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .map_err(|err| AssetStoreError::NetworkError {
                message: err.to_string(),
                retryable: true,
            })?;

        Ok(AssetReference {
            remote_key: key.to_string(),
            delivery_url: self.delivery_url(bucket, key),
            format: metadata.format.clone(),
            pixel_width: metadata.pixel_width,
            pixel_height: metadata.pixel_height,
            byte_size: payload.len() as u64,
            created_at: current_epoch_seconds(),
            resource_kind: metadata.resource_kind.unwrap_or(ResourceKind::Raw),
        })
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<bool, AssetStoreError> {
        // DeleteObject succeeds whether or not the key exists, so check
        // first to report whether an object was actually removed.
        let mut head = self.s3_client.head_object().bucket(bucket).key(key);
        if let Some(ref owner) = self.expected_bucket_owner {
            head = head.expected_bucket_owner(owner);
        }

        match head.send().await {
            Ok(_) => {}
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    return Ok(false);
                }
                return Err(AssetStoreError::NetworkError {
                    message: service_err.to_string(),
                    retryable: true,
                });
            }
        }

        let mut request = self.s3_client.delete_object().bucket(bucket).key(key);
        if let Some(ref owner) = self.expected_bucket_owner {
            request = request.expected_bucket_owner(owner);
        }

        request
            .send()
            .await
            .map_err(|err| AssetStoreError::NetworkError {
                message: err.to_string(),
                retryable: true,
            })?;

        Ok(true)
    }

    async fn delete_batch(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<BatchDeleteOutcome, AssetStoreError> {
        if keys.is_empty() {
            return Ok(BatchDeleteOutcome::default());
        }
        if keys.len() > DELETE_BATCH_LIMIT {
            return Err(AssetStoreError::InvalidConfig {
                message: format!(
                    "delete batch of {} keys exceeds the limit of {}",
                    keys.len(),
                    DELETE_BATCH_LIMIT
                ),
            });
        }

        let mut identifiers: Vec<ObjectIdentifier> = Vec::with_capacity(keys.len());
        for key in keys {
            let identifier: ObjectIdentifier = ObjectIdentifier::builder()
                .key(key)
                .build()
                .map_err(|err| AssetStoreError::Other {
                    message: err.to_string(),
                })?;
            identifiers.push(identifier);
        }

        let delete: Delete = Delete::builder()
            .set_objects(Some(identifiers))
            .build()
            .map_err(|err| AssetStoreError::Other {
                message: err.to_string(),
            })?;

        let mut request = self
            .s3_client
            .delete_objects()
            .bucket(bucket)
            .delete(delete);

        if let Some(ref owner) = self.expected_bucket_owner {
            request = request.expected_bucket_owner(owner);
        }

        let response = request
            .send()
            .await
            .map_err(|err| AssetStoreError::NetworkError {
                message: err.to_string(),
                retryable: true,
            })?;

        let mut outcome = BatchDeleteOutcome::default();
        for deleted in response.deleted() {
            if let Some(key) = deleted.key() {
                outcome.deleted.push(key.to_string());
            }
        }
        for error in response.errors() {
            outcome.failed.push((
                error.key().unwrap_or_default().to_string(),
                error.message().unwrap_or("delete failed").to_string(),
            ));
        }

        Ok(outcome)
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        max_keys: usize,
    ) -> Result<Vec<ObjectInfo>, AssetStoreError> {
        let mut objects: Vec<ObjectInfo> = Vec::new();
        let mut continuation_token: Option<String> = None;

        while objects.len() < max_keys {
            let mut request = self
                .s3_client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix);

            if let Some(ref owner) = self.expected_bucket_owner {
                request = request.expected_bucket_owner(owner);
            }

            if let Some(ref token) = continuation_token {
                request = request.continuation_token(token);
            }

            let response =
                request
                    .send()
                    .await
                    .map_err(|err| AssetStoreError::NetworkError {
                        message: err.to_string(),
                        retryable: true,
                    })?;

            for obj in response.contents() {
                let last_modified: Option<i64> = obj
                    .last_modified()
                    .and_then(|dt| dt.to_millis().ok())
                    .map(|ms| ms / 1000);

                objects.push(ObjectInfo {
                    key: obj.key().unwrap_or_default().to_string(),
                    size: obj.size().map(|s| s as u64).unwrap_or(0),
                    last_modified,
                });
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token.clone();
            } else {
                break;
            }
        }

        objects.truncate(max_keys);
        Ok(objects)
    }
}

/// Get current time as epoch seconds.
fn current_epoch_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_client_implements_object_store_client() {
        // Compile-time check that the trait is implemented.
        fn assert_object_store_client<T: ObjectStoreClient>() {}
        assert_object_store_client::<S3ObjectStoreClient>();
    }
}
