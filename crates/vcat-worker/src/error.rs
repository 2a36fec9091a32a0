//! Job error types.

use thiserror::Error;
use vcat_media::MediaError;
use vcat_models::{ErrorKind, JobId, JobState, ManifestError};
use vcat_storage::StorageError;

/// Outcome of a submitted job.
pub type JobResult<T> = Result<T, JobFailure>;

/// Why a scene could not be retrieved.
#[derive(Debug, Error)]
pub enum DownloadCause {
    #[error("timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("local write failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadCause {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            DownloadCause::Timeout { .. } | DownloadCause::Network(_) => true,
            DownloadCause::Status(code) => *code == 429 || (500..600).contains(code),
            DownloadCause::Io(_) => false,
        }
    }
}

/// Why the artifact could not be published.
#[derive(Debug, Error)]
pub enum UploadFailure {
    #[error("storage backend is not configured")]
    NotConfigured,

    #[error(transparent)]
    Backend(#[from] StorageError),
}

/// A failure at one stage of a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("{0}")]
    Validation(#[from] ManifestError),

    #[error("Failed to download scene {ordinal}: {cause}")]
    Download { ordinal: usize, cause: DownloadCause },

    #[error("Concatenation failed: {0}")]
    Encoding(#[from] MediaError),

    #[error("Upload failed: {0}")]
    Upload(#[from] UploadFailure),

    #[error("{0}")]
    Internal(String),
}

impl JobError {
    pub fn download(ordinal: usize, cause: impl Into<DownloadCause>) -> Self {
        Self::Download {
            ordinal,
            cause: cause.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Wire-level error kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JobError::Validation(_) => ErrorKind::ValidationError,
            JobError::Download { .. } => ErrorKind::DownloadError,
            JobError::Encoding(_) => ErrorKind::EncodingError,
            JobError::Upload(_) => ErrorKind::UploadError,
            JobError::Internal(_) => ErrorKind::InternalError,
        }
    }

    /// Machine-readable code refining the kind, when there is one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            JobError::Upload(UploadFailure::NotConfigured) => Some("storage_not_configured"),
            JobError::Upload(UploadFailure::Backend(_)) => Some("storage_failure"),
            JobError::Download {
                cause: DownloadCause::Timeout { .. },
                ..
            } => Some("scene_timeout"),
            JobError::Encoding(MediaError::FfmpegNotFound) => Some("ffmpeg_not_found"),
            JobError::Encoding(MediaError::Timeout(_)) => Some("encode_timeout"),
            _ => None,
        }
    }

    /// Ordinal of the scene that failed, for download errors.
    pub fn ordinal(&self) -> Option<usize> {
        match self {
            JobError::Download { ordinal, .. } => Some(*ordinal),
            _ => None,
        }
    }

    /// Encoder stderr tail, for encoding errors.
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            JobError::Encoding(e) => e.diagnostics(),
            _ => None,
        }
    }
}

/// A job failure as reported to the caller.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct JobFailure {
    /// Absent when the request was rejected before a job was created.
    pub job_id: Option<JobId>,
    /// Stage the job was in when it failed.
    pub stage: Option<JobState>,
    #[source]
    pub error: JobError,
}

impl JobFailure {
    /// A rejection before any job was created.
    pub fn rejected(error: impl Into<JobError>) -> Self {
        Self {
            job_id: None,
            stage: None,
            error: error.into(),
        }
    }

    pub fn at_stage(job_id: JobId, stage: JobState, error: impl Into<JobError>) -> Self {
        Self {
            job_id: Some(job_id),
            stage: Some(stage),
            error: error.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}
