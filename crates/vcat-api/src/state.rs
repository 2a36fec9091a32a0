//! Application state.

use std::sync::Arc;

use tracing::{info, warn};
use vcat_storage::{bucket_from_env, ObjectStore, S3Client, StorageError};
use vcat_worker::{JobManager, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub jobs: Arc<JobManager>,
    /// `None` when no storage backend is configured
    pub storage: Option<Arc<dyn ObjectStore>>,
    /// Bucket reported by the health endpoint
    pub storage_bucket: String,
}

impl AppState {
    /// Create new application state.
    ///
    /// Missing storage configuration is not an error: the service starts and
    /// fails uploads instead.
    pub async fn new(config: ApiConfig, worker: WorkerConfig) -> anyhow::Result<Self> {
        let storage: Option<Arc<dyn ObjectStore>> = match S3Client::from_env().await {
            Ok(client) => Some(Arc::new(client)),
            Err(StorageError::ConfigError(reason)) => {
                warn!("Object storage not configured ({}); uploads will fail", reason);
                None
            }
            Err(e) => return Err(e.into()),
        };

        let jobs = JobManager::from_config(worker, storage.clone())?;
        info!(
            work_dir = %jobs.config().work_dir.display(),
            max_ffmpeg = jobs.config().max_ffmpeg_processes,
            max_fetches = jobs.config().max_concurrent_fetches,
            "Job manager ready"
        );

        Ok(Self::from_parts(config, jobs, storage))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        config: ApiConfig,
        jobs: JobManager,
        storage: Option<Arc<dyn ObjectStore>>,
    ) -> Self {
        let storage_bucket = storage
            .as_ref()
            .map(|s| s.bucket().to_string())
            .unwrap_or_else(bucket_from_env);

        Self {
            config,
            jobs: Arc::new(jobs),
            storage,
            storage_bucket,
        }
    }
}
