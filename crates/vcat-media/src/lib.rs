//! FFmpeg CLI wrapper for stream-copy concatenation.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building
//! - Progress parsing from `-progress pipe:2`, with a diagnostic stderr tail
//! - Process termination on timeout or cancellation
//! - The [`ConcatExecutor`] capability and its ffmpeg adapter
//! - Duration probing with ffprobe

pub mod command;
pub mod concat;
pub mod error;
pub mod probe;
pub mod progress;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use concat::{
    render_concat_manifest, write_concat_manifest, ConcatExecutor, ConcatOutput, FfmpegConcat,
    MANIFEST_FILE_NAME,
};
pub use error::{MediaError, MediaResult};
pub use probe::probe_duration;
pub use progress::FfmpegProgress;
