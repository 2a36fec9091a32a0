//! Structured job logging.
//!
//! Every event carries `job_id` and `operation` so a job can be followed
//! through the log stream without a span-aware collector.

use std::fmt::Display;

use tracing::{error, info, warn, Span};
use vcat_models::{JobId, JobState};

/// Value of the `operation` field on every job event.
const OPERATION: &str = "concat";

/// Emits the lifecycle events of one concatenation job.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: JobId,
    campaign_id: String,
}

impl JobLogger {
    pub fn new(job_id: &JobId, campaign_id: &str) -> Self {
        Self {
            job_id: job_id.clone(),
            campaign_id: campaign_id.to_string(),
        }
    }

    /// The request passed validation and got a job id.
    pub fn log_accepted(&self, scene_count: usize, output_hint: &str) {
        info!(
            job_id = %self.job_id,
            operation = OPERATION,
            campaign_id = %self.campaign_id,
            scenes = scene_count,
            output_hint = %output_hint,
            "Job accepted"
        );
    }

    pub fn log_transition(&self, from: JobState, to: JobState) {
        info!(
            job_id = %self.job_id,
            operation = OPERATION,
            from = %from,
            to = %to,
            "Job state: {} -> {}", from, to
        );
    }

    /// A stage finished; `summary` says what it produced.
    pub fn log_stage_done(&self, stage: JobState, summary: &str) {
        info!(
            job_id = %self.job_id,
            operation = OPERATION,
            stage = %stage,
            "{}", summary
        );
    }

    /// Something went wrong that does not change the job's result.
    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = OPERATION,
            "Job warning: {}", message
        );
    }

    pub fn log_failure(&self, stage: JobState, error: &dyn Display) {
        error!(
            job_id = %self.job_id,
            operation = OPERATION,
            stage = %stage,
            "Job failed while {}: {}", stage, error
        );
    }

    pub fn log_completion(&self, storage_path: &str, output_bytes: u64) {
        info!(
            job_id = %self.job_id,
            operation = OPERATION,
            campaign_id = %self.campaign_id,
            storage_path = %storage_path,
            output_bytes,
            "Job completed"
        );
    }

    /// Span wrapping the whole pipeline of this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = OPERATION,
            campaign_id = %self.campaign_id
        )
    }
}
