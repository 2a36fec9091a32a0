//! S3-compatible client implementation.

use std::path::Path;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{Builder, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};
use crate::store::ObjectStore;

/// Bucket used when `VIDEO_STORAGE_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "videos";

/// Configuration for the storage client.
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region (usually "auto" for R2 and Supabase)
    pub region: String,
    /// Base URL under which objects are publicly reachable
    pub public_base_url: Option<String>,
}

impl S3Config {
    /// Create config from environment variables.
    ///
    /// Fails with [`StorageError::ConfigError`] when the endpoint or
    /// credentials are missing; callers treat that as "not configured".
    pub fn from_env() -> StorageResult<Self> {
        Ok(Self {
            endpoint_url: required_env("STORAGE_ENDPOINT_URL")?,
            access_key_id: required_env("STORAGE_ACCESS_KEY_ID")?,
            secret_access_key: required_env("STORAGE_SECRET_ACCESS_KEY")?,
            bucket_name: bucket_from_env(),
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        })
    }

    /// Base URL for public object links.
    ///
    /// Defaults to the path-style bucket URL on the API endpoint.
    pub fn resolved_public_base(&self) -> String {
        match &self.public_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!(
                "{}/{}",
                self.endpoint_url.trim_end_matches('/'),
                self.bucket_name
            ),
        }
    }
}

/// Bucket name from `VIDEO_STORAGE_BUCKET`, defaulting to [`DEFAULT_BUCKET`].
pub fn bucket_from_env() -> String {
    std::env::var("VIDEO_STORAGE_BUCKET")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BUCKET.to_string())
}

fn required_env(key: &str) -> StorageResult<String> {
    std::env::var(key)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| StorageError::config_error(format!("{} not set", key)))
}

/// S3-compatible storage client.
#[derive(Clone)]
pub struct S3Client {
    client: Client,
    bucket: String,
    public_base: String,
}

impl S3Client {
    /// Create a new client from configuration.
    pub async fn new(config: S3Config) -> StorageResult<Self> {
        let public_base = config.resolved_public_base();

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "static",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        let client = Client::from_conf(sdk_config);

        info!(bucket = %config.bucket_name, endpoint = %config.endpoint_url, "Storage client configured");

        Ok(Self {
            client,
            bucket: config.bucket_name,
            public_base,
        })
    }

    /// Create from environment variables.
    pub async fn from_env() -> StorageResult<Self> {
        let config = S3Config::from_env()?;
        Self::new(config).await
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()> {
        validate_key(key)?;
        debug!("Uploading {} to {}", path.display(), key);

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(DisplayErrorContext(&e).to_string()))?;

        info!("Uploaded {} to {}/{}", path.display(), self.bucket, key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url(&self.public_base, key)
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| {
                StorageError::AwsSdk(format!(
                    "Storage connectivity check failed: {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }
}

/// Join a public base URL and an object key, percent-encoding each segment.
pub fn public_object_url(base: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|s| s == "." || s == "..") {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
