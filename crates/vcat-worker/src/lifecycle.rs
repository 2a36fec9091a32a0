//! Job lifecycle management.
//!
//! [`JobManager::submit`] runs one request end to end:
//! validate, allocate a workspace, fetch, concatenate, publish, clean up.
//! Stages run strictly in sequence and none of them is retried here; the
//! first failure decides the reported error.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::Semaphore;
use tracing::Instrument;
use vcat_media::{ConcatExecutor, FfmpegConcat};
use vcat_models::{ConcatRequest, JobId, JobState};
use vcat_storage::ObjectStore;

use crate::config::WorkerConfig;
use crate::error::{JobError, JobFailure, JobResult};
use crate::fetcher::SceneFetcher;
use crate::job::Job;
use crate::metrics::{self, InFlightJob};
use crate::publisher::ArtifactPublisher;
use crate::workspace::JobWorkspace;

/// A published job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobOutcome {
    pub job_id: JobId,
    pub scene_count: usize,
    pub storage_path: String,
    pub output_url: String,
    pub output_bytes: u64,
    /// Probed media duration of the merged file
    pub output_duration_secs: Option<f64>,
}

/// Drives concatenation jobs.
///
/// One instance is shared by all requests. The fetch and encoder semaphores
/// it holds are the only cross-job limits.
#[derive(Clone)]
pub struct JobManager {
    config: WorkerConfig,
    fetcher: SceneFetcher,
    executor: Arc<dyn ConcatExecutor>,
    publisher: ArtifactPublisher,
    encoder_permits: Arc<Semaphore>,
}

impl JobManager {
    pub fn new(
        config: WorkerConfig,
        fetcher: SceneFetcher,
        executor: Arc<dyn ConcatExecutor>,
        publisher: ArtifactPublisher,
    ) -> Self {
        let encoder_permits = Arc::new(Semaphore::new(config.max_ffmpeg_processes.max(1)));
        Self {
            config,
            fetcher,
            executor,
            publisher,
            encoder_permits,
        }
    }

    /// Build the production pipeline: HTTP fetcher and ffmpeg concat.
    pub fn from_config(
        config: WorkerConfig,
        store: Option<Arc<dyn ObjectStore>>,
    ) -> Result<Self, reqwest::Error> {
        let fetcher = SceneFetcher::new(&config)?;
        let executor = FfmpegConcat::new().with_timeout(config.encode_timeout.as_secs());
        Ok(Self::new(
            config,
            fetcher,
            Arc::new(executor),
            ArtifactPublisher::new(store),
        ))
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Run a concatenation request to completion.
    ///
    /// The workspace is gone by the time this returns, whatever the outcome.
    /// If the returned future is dropped early, the workspace guard removes
    /// the directory and any running encoder is killed.
    pub async fn submit(&self, request: ConcatRequest) -> JobResult<JobOutcome> {
        if let Err(e) = request.validate(self.config.max_scenes) {
            metrics::record_job_outcome(Some(vcat_models::ErrorKind::ValidationError));
            return Err(JobFailure::rejected(e));
        }

        let mut job = Job::new(request);
        let logger = job.logger().clone();
        let _in_flight = InFlightJob::start();

        logger.log_accepted(job.scene_count(), &job.output_path_hint);

        let workspace = match JobWorkspace::create(&self.config.work_dir, &job.id) {
            Ok(ws) => ws,
            Err(e) => {
                let stage = job.fail();
                let failure = JobFailure::at_stage(
                    job.id.clone(),
                    stage,
                    JobError::internal(format!("Failed to create job workspace: {}", e)),
                );
                logger.log_failure(stage, &failure);
                metrics::record_job_outcome(Some(failure.kind()));
                return Err(failure);
            }
        };

        let deadline = self.config.job_timeout;
        let pipeline = AssertUnwindSafe(self.run_pipeline(&mut job, &workspace)).catch_unwind();
        let finished = tokio::time::timeout(deadline, pipeline)
            .instrument(logger.create_span())
            .await;

        let result = match finished {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(JobError::internal(format!(
                "Job panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => Err(JobError::internal(format!(
                "Job exceeded its deadline of {:?} while {}",
                deadline,
                job.state()
            ))),
        };

        let result = match result {
            Ok(outcome) => {
                logger.log_completion(&outcome.storage_path, outcome.output_bytes);
                Ok(outcome)
            }
            Err(error) => {
                let stage = job.fail();
                let failure = JobFailure::at_stage(job.id.clone(), stage, error);
                logger.log_failure(stage, &failure);
                Err(failure)
            }
        };

        if let Err(e) = workspace.close().await {
            logger.log_warning(&format!("Failed to remove job workspace: {}", e));
        }

        metrics::record_job_outcome(result.as_ref().err().map(JobFailure::kind));
        result
    }

    async fn run_pipeline(
        &self,
        job: &mut Job,
        workspace: &JobWorkspace,
    ) -> Result<JobOutcome, JobError> {
        job.transition(JobState::Fetching)?;
        let inputs: Vec<PathBuf> = timed(
            JobState::Fetching,
            self.fetcher.fetch_all(&job.scenes, workspace),
        )
        .await?;
        job.logger().log_stage_done(
            JobState::Fetching,
            &format!("Fetched {} scenes", inputs.len()),
        );

        job.transition(JobState::Concatenating)?;
        let output = workspace.output_path();
        let merged = timed(JobState::Concatenating, async {
            let _permit = self
                .encoder_permits
                .acquire()
                .await
                .map_err(|_| JobError::internal("encoder limiter closed"))?;
            self.executor
                .concat(&inputs, &output)
                .await
                .map_err(JobError::from)
        })
        .await?;
        metrics::record_output_bytes(merged.size_bytes);
        job.logger().log_stage_done(
            JobState::Concatenating,
            &format!(
                "Merged {} bytes, duration {:?}",
                merged.size_bytes, merged.duration_secs
            ),
        );

        job.transition(JobState::Publishing)?;
        let artifact = timed(
            JobState::Publishing,
            self.publisher.publish(&merged.path, &job.campaign_id, &job.id),
        )
        .await?;

        job.transition(JobState::Completed)?;

        Ok(JobOutcome {
            job_id: job.id.clone(),
            scene_count: job.scene_count(),
            storage_path: artifact.storage_path,
            output_url: artifact.public_url,
            output_bytes: merged.size_bytes,
            output_duration_secs: merged.duration_secs,
        })
    }
}

async fn timed<F: Future>(stage: JobState, fut: F) -> F::Output {
    let started = Instant::now();
    let out = fut.await;
    metrics::record_stage_duration(stage, started.elapsed().as_secs_f64());
    out
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
