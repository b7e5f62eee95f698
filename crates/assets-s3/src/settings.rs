//! Configuration for the S3 object store client.

/// Settings for connecting to S3.
#[derive(Debug, Clone)]
pub struct S3Settings {
    /// AWS region.
    pub region: String,
    /// AWS credentials (access key, secret key, session token).
    /// Falls back to the default credential chain when absent.
    pub credentials: Option<AwsCredentials>,
    /// Expected bucket owner for security validation.
    pub expected_bucket_owner: Option<String>,
}

impl Default for S3Settings {
    fn default() -> Self {
        Self {
            region: "af-south-1".into(),
            credentials: None,
            expected_bucket_owner: None,
        }
    }
}

impl S3Settings {
    /// Create settings for the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Default::default()
        }
    }

    /// Set explicit credentials instead of the default chain.
    pub fn with_credentials(mut self, credentials: AwsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the expected bucket owner.
    pub fn with_expected_bucket_owner(mut self, owner: impl Into<String>) -> Self {
        self.expected_bucket_owner = Some(owner.into());
        self
    }
}

/// AWS credentials.
#[derive(Debug, Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}
