//! Scene retrieval.
//!
//! Scenes are downloaded concurrently into `scene_<ordinal>.mp4` files.
//! Concurrency is bounded twice: per job by `max_download_parallel`, and
//! across all jobs by a shared fetch semaphore. Order is carried by the file
//! names, never by completion order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;
use tracing::debug;
use vcat_models::Scene;

use crate::config::WorkerConfig;
use crate::error::{DownloadCause, JobError};
use crate::metrics;
use crate::retry::{retry_async, RetryConfig};
use crate::workspace::JobWorkspace;

/// Downloads scene sources into a job workspace.
#[derive(Clone)]
pub struct SceneFetcher {
    http: Client,
    permits: Arc<Semaphore>,
    per_job_parallel: usize,
    scene_timeout: Duration,
    retry: RetryConfig,
}

impl SceneFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: &WorkerConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(config.scene_timeout.min(Duration::from_secs(10)))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(config.max_download_parallel)
            .user_agent(concat!("vcat-worker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self::with_client(http, config))
    }

    /// Create a fetcher around an existing HTTP client.
    pub fn with_client(http: Client, config: &WorkerConfig) -> Self {
        Self {
            http,
            permits: Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1))),
            per_job_parallel: config.max_download_parallel.max(1),
            scene_timeout: config.scene_timeout,
            retry: RetryConfig::new("scene_fetch").with_max_retries(config.fetch_max_retries),
        }
    }

    /// Override the backoff between retries.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Fetch every scene, returning local paths in manifest order.
    ///
    /// The first failure aborts the remaining fetches. Files already written
    /// are left for the workspace to clean up.
    pub async fn fetch_all(
        &self,
        scenes: &[Scene],
        workspace: &JobWorkspace,
    ) -> Result<Vec<PathBuf>, JobError> {
        stream::iter(scenes.iter().enumerate().map(Ok::<_, JobError>))
            .try_for_each_concurrent(self.per_job_parallel, |(ordinal, scene)| {
                let dest = workspace.scene_path(ordinal);
                async move { self.fetch_scene(ordinal, &scene.url, &dest).await }
            })
            .await?;

        Ok((0..scenes.len()).map(|i| workspace.scene_path(i)).collect())
    }

    async fn fetch_scene(&self, ordinal: usize, url: &str, dest: &Path) -> Result<(), JobError> {
        let bytes = retry_async(&self.retry, DownloadCause::is_transient, || {
            self.fetch_attempt(url, dest)
        })
        .await
        .map_err(|cause| JobError::download(ordinal, cause))?;

        metrics::record_scene_fetched();
        debug!(ordinal, bytes, url, "Fetched scene");
        Ok(())
    }

    async fn fetch_attempt(&self, url: &str, dest: &Path) -> Result<u64, DownloadCause> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DownloadCause::Network("fetch limiter closed".to_string()))?;

        match tokio::time::timeout(self.scene_timeout, self.download_to(url, dest)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_cause()),
        }
    }

    async fn download_to(&self, url: &str, dest: &Path) -> Result<u64, DownloadCause> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.cause_from_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadCause::Status(status.as_u16()));
        }

        // Truncates anything a failed earlier attempt left behind
        let mut file = tokio::fs::File::create(dest).await?;
        let mut body = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| self.cause_from_reqwest(e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(written)
    }

    fn timeout_cause(&self) -> DownloadCause {
        DownloadCause::Timeout {
            secs: self.scene_timeout.as_secs(),
        }
    }

    fn cause_from_reqwest(&self, err: reqwest::Error) -> DownloadCause {
        if err.is_timeout() {
            return self.timeout_cause();
        }
        DownloadCause::Network(error_chain(&err))
    }
}

/// Render an error with its sources, `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        out.push_str(": ");
        out.push_str(&inner.to_string());
        source = inner.source();
    }
    out
}
