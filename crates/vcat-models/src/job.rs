//! Job identifiers and lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a concatenation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a job.
///
/// Jobs move strictly forward through
/// `Pending -> Fetching -> Concatenating -> Publishing -> Completed`,
/// and may enter `Failed` from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted, workspace allocated, nothing fetched yet
    #[default]
    Pending,
    /// Scenes are being retrieved
    Fetching,
    /// The encoder is merging scenes
    Concatenating,
    /// The merged file is being uploaded
    Publishing,
    /// Artifact published
    Completed,
    /// A stage failed
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Fetching => "fetching",
            JobState::Concatenating => "concatenating",
            JobState::Publishing => "publishing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// The state that follows this one on the success path.
    pub fn next(&self) -> Option<JobState> {
        match self {
            JobState::Pending => Some(JobState::Fetching),
            JobState::Fetching => Some(JobState::Concatenating),
            JobState::Concatenating => Some(JobState::Publishing),
            JobState::Publishing => Some(JobState::Completed),
            JobState::Completed | JobState::Failed => None,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(&self, to: JobState) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == JobState::Failed || self.next() == Some(to)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
