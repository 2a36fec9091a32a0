//! Response payloads and error taxonomy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::JobId;

/// Successful `POST /concat` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcatResponse {
    pub success: bool,
    /// Public URL of the published artifact
    pub output_url: String,
    pub job_id: JobId,
    pub scene_count: usize,
    /// Object key inside the storage bucket
    pub storage_path: String,
    /// Probed duration of the merged file, when ffprobe succeeded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// The kind of failure reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    AuthError,
    ValidationError,
    DownloadError,
    EncodingError,
    UploadError,
    InternalError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::AuthError => "AuthError",
            ErrorKind::ValidationError => "ValidationError",
            ErrorKind::DownloadError => "DownloadError",
            ErrorKind::EncodingError => "EncodingError",
            ErrorKind::UploadError => "UploadError",
            ErrorKind::InternalError => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
