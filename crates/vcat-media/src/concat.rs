//! Stream-copy concatenation.
//!
//! [`ConcatExecutor`] is the seam between job orchestration and the tool
//! that actually merges files. [`FfmpegConcat`] backs it with the ffmpeg
//! concat demuxer: inputs are listed in order in a manifest file and copied
//! into one container without re-encoding. This only yields a valid file
//! when every input shares codec and container parameters; a mismatch
//! surfaces as an encoder failure.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_duration;

/// File name of the concat manifest, written next to the output.
pub const MANIFEST_FILE_NAME: &str = "concat.txt";

/// Result of a successful concatenation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatOutput {
    /// Merged file
    pub path: PathBuf,
    /// Size of the merged file in bytes
    pub size_bytes: u64,
    /// Media duration of the merged file, when it could be probed
    pub duration_secs: Option<f64>,
}

/// Merges an ordered list of media files into one output file.
#[async_trait]
pub trait ConcatExecutor: Send + Sync {
    /// Concatenate `inputs` in the given order into `output`.
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<ConcatOutput>;
}

/// [`ConcatExecutor`] backed by the ffmpeg binary on `PATH`.
#[derive(Debug, Clone)]
pub struct FfmpegConcat {
    runner: FfmpegRunner,
}

impl Default for FfmpegConcat {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegConcat {
    pub fn new() -> Self {
        Self {
            runner: FfmpegRunner::new(),
        }
    }

    /// Kill the encoder if it runs longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }
}

#[async_trait]
impl ConcatExecutor for FfmpegConcat {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<ConcatOutput> {
        if inputs.is_empty() {
            return Err(MediaError::NoInputs);
        }

        for input in inputs {
            if !input.exists() {
                return Err(MediaError::FileNotFound(input.clone()));
            }
        }

        let manifest = output.with_file_name(MANIFEST_FILE_NAME);
        write_concat_manifest(inputs, &manifest).await?;

        let cmd = FfmpegCommand::new(&manifest, output)
            .concat_demuxer()
            .stream_copy()
            .faststart();

        info!(inputs = inputs.len(), output = %output.display(), "Running stream-copy concat");

        self.runner
            .run_with_progress(&cmd, |progress| {
                debug!(
                    out_time_ms = progress.out_time_ms,
                    speed = progress.speed,
                    complete = progress.is_complete,
                    "Concat progress"
                );
            })
            .await?;

        let size_bytes = tokio::fs::metadata(output).await?.len();

        let duration_secs = match probe_duration(output).await {
            Ok(d) => Some(d),
            Err(e) => {
                warn!(output = %output.display(), "Could not probe merged duration: {}", e);
                None
            }
        };

        Ok(ConcatOutput {
            path: output.to_path_buf(),
            size_bytes,
            duration_secs,
        })
    }
}

/// Render a concat demuxer list for `inputs`, one `file` directive per line.
pub fn render_concat_manifest(inputs: &[PathBuf]) -> String {
    let mut out = String::new();
    for input in inputs {
        let _ = writeln!(out, "file '{}'", escape_manifest_path(&input.to_string_lossy()));
    }
    out
}

/// Write the concat demuxer list to `path`.
pub async fn write_concat_manifest(inputs: &[PathBuf], path: &Path) -> MediaResult<()> {
    tokio::fs::write(path, render_concat_manifest(inputs)).await?;
    Ok(())
}

/// Quote a path for the concat demuxer: close the quote, emit an escaped
/// quote, reopen.
fn escape_manifest_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}
