//! Shared data models for the scene concatenation service.
//!
//! This crate provides Serde-serializable types for:
//! - Job identifiers and lifecycle states
//! - The scene manifest accepted by `POST /concat`, with validation
//! - Response payloads and the error taxonomy reported to callers

pub mod job;
pub mod response;
pub mod scene;

// Re-export common types
pub use job::{JobId, JobState};
pub use response::{ConcatResponse, ErrorKind};
pub use scene::{validate_scene_url, ConcatRequest, ManifestError, Scene};
