//! In-flight job record.

use chrono::{DateTime, Utc};
use vcat_models::{ConcatRequest, JobId, JobState, Scene};

use crate::error::JobError;
use crate::logging::JobLogger;

/// One accepted concatenation request.
///
/// Lives only for the duration of a `submit` call; nothing is persisted.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub campaign_id: String,
    /// Caller's output hint, logged but never used for the storage key
    pub output_path_hint: String,
    pub scenes: Vec<Scene>,
    pub created_at: DateTime<Utc>,
    state: JobState,
    logger: JobLogger,
}

impl Job {
    pub fn new(request: ConcatRequest) -> Self {
        let id = JobId::new();
        let logger = JobLogger::new(&id, &request.campaign_id);
        Self {
            id,
            campaign_id: request.campaign_id,
            output_path_hint: request.output_path,
            scenes: request.scenes,
            created_at: Utc::now(),
            state: JobState::Pending,
            logger,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn logger(&self) -> &JobLogger {
        &self.logger
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Move to `to`, rejecting anything but a forward step or `Failed`.
    pub fn transition(&mut self, to: JobState) -> Result<(), JobError> {
        if !self.state.can_transition_to(to) {
            return Err(JobError::internal(format!(
                "illegal job state transition {} -> {}",
                self.state, to
            )));
        }
        self.logger.log_transition(self.state, to);
        self.state = to;
        Ok(())
    }

    /// Mark the job failed, returning the stage it failed in.
    ///
    /// Calling this on a terminal job leaves it unchanged.
    pub fn fail(&mut self) -> JobState {
        let stage = self.state;
        if self.state.can_transition_to(JobState::Failed) {
            self.logger.log_transition(self.state, JobState::Failed);
            self.state = JobState::Failed;
        }
        stage
    }
}
