//! Concatenation job worker.
//!
//! This crate provides:
//! - The job lifecycle manager ([`JobManager`])
//! - Concurrent, ordered scene fetching with transient-error retry
//! - Artifact publishing to object storage
//! - A per-job workspace that is always removed
//! - Structured job logging and job metrics

pub mod config;
pub mod error;
pub mod fetcher;
pub mod job;
pub mod lifecycle;
pub mod logging;
pub mod metrics;
pub mod publisher;
pub mod retry;
pub mod workspace;

pub use config::WorkerConfig;
pub use error::{DownloadCause, JobError, JobFailure, JobResult, UploadFailure};
pub use fetcher::SceneFetcher;
pub use job::Job;
pub use lifecycle::{JobManager, JobOutcome};
pub use logging::JobLogger;
pub use publisher::{storage_key, ArtifactPublisher, PublishedArtifact, ARTIFACT_CONTENT_TYPE};
pub use retry::RetryConfig;
pub use workspace::JobWorkspace;
