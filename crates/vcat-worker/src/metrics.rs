//! Job metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder. Without a recorder these calls are no-ops.

use metrics::{counter, gauge, histogram};
use vcat_models::{ErrorKind, JobState};

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_TOTAL: &str = "vcat_jobs_total";
    pub const JOBS_IN_PROGRESS: &str = "vcat_jobs_in_progress";
    pub const STAGE_DURATION_SECONDS: &str = "vcat_job_stage_duration_seconds";
    pub const SCENES_FETCHED_TOTAL: &str = "vcat_scenes_fetched_total";
    pub const OUTPUT_BYTES: &str = "vcat_output_bytes";
}

/// Record a job that reached a terminal state.
pub fn record_job_outcome(error: Option<ErrorKind>) {
    let labels = match error {
        None => [("outcome", "completed".to_string()), ("error", "none".to_string())],
        Some(kind) => [("outcome", "failed".to_string()), ("error", kind.to_string())],
    };
    counter!(names::JOBS_TOTAL, &labels).increment(1);
}

/// Holds the in-progress gauge up until dropped, including on cancellation.
#[must_use]
pub struct InFlightJob(());

impl InFlightJob {
    pub fn start() -> Self {
        gauge!(names::JOBS_IN_PROGRESS).increment(1.0);
        Self(())
    }
}

impl Drop for InFlightJob {
    fn drop(&mut self) {
        gauge!(names::JOBS_IN_PROGRESS).decrement(1.0);
    }
}

/// Record how long a stage took, whether or not it succeeded.
pub fn record_stage_duration(stage: JobState, duration_secs: f64) {
    let labels = [("stage", stage.as_str().to_string())];
    histogram!(names::STAGE_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_scene_fetched() {
    counter!(names::SCENES_FETCHED_TOTAL).increment(1);
}

pub fn record_output_bytes(bytes: u64) {
    histogram!(names::OUTPUT_BYTES).record(bytes as f64);
}
