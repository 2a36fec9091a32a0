//! Artifact publishing.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use vcat_models::JobId;
use vcat_storage::ObjectStore;

use crate::error::UploadFailure;

/// Content type of published artifacts.
pub const ARTIFACT_CONTENT_TYPE: &str = "video/mp4";

/// Where an artifact ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    /// Object key inside the bucket
    pub storage_path: String,
    pub public_url: String,
}

/// Uploads merged files to object storage.
#[derive(Clone)]
pub struct ArtifactPublisher {
    store: Option<Arc<dyn ObjectStore>>,
}

impl ArtifactPublisher {
    /// `None` means no backend is configured; every publish then fails with
    /// [`UploadFailure::NotConfigured`].
    pub fn new(store: Option<Arc<dyn ObjectStore>>) -> Self {
        Self { store }
    }

    /// Upload `file` and resolve its public URL.
    pub async fn publish(
        &self,
        file: &Path,
        campaign_id: &str,
        job_id: &JobId,
    ) -> Result<PublishedArtifact, UploadFailure> {
        let store = self.store.as_ref().ok_or(UploadFailure::NotConfigured)?;

        let storage_path = storage_key(campaign_id, job_id, Utc::now());
        store
            .upload_file(file, &storage_path, ARTIFACT_CONTENT_TYPE)
            .await?;

        let public_url = store.public_url(&storage_path);
        info!(
            job_id = %job_id,
            bucket = store.bucket(),
            key = %storage_path,
            "Published artifact"
        );

        Ok(PublishedArtifact {
            storage_path,
            public_url,
        })
    }
}

/// `<campaign_id>/<YYYYMMDD_HHMMSS>_<job_id>.mp4`, stamped in UTC.
pub fn storage_key(campaign_id: &str, job_id: &JobId, at: DateTime<Utc>) -> String {
    format!(
        "{}/{}_{}.mp4",
        campaign_id,
        at.format("%Y%m%d_%H%M%S"),
        job_id
    )
}
