//! Object storage abstraction.

use std::path::Path;

use async_trait::async_trait;

use crate::error::StorageResult;

/// A bucket that published artifacts are uploaded to.
///
/// One instance is built at process start and shared by every job, so
/// implementations must be safe to call concurrently.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the target bucket.
    fn bucket(&self) -> &str;

    /// Upload a local file under `key`.
    async fn upload_file(&self, path: &Path, key: &str, content_type: &str) -> StorageResult<()>;

    /// Publicly reachable URL for `key`.
    fn public_url(&self, key: &str) -> String;

    /// Round-trip to the backend to verify it is reachable.
    async fn check_connectivity(&self) -> StorageResult<()>;
}
