//! FFprobe media information.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::command::check_ffprobe;
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Get the container duration of a media file in seconds.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::FfprobeFailed {
            message: "FFprobe failed".to_string(),
            stderr: Some(String::from_utf8_lossy(&output.stderr).to_string()),
        });
    }

    parse_duration(&output.stdout)
}

fn parse_duration(stdout: &[u8]) -> MediaResult<f64> {
    let probe: FfprobeOutput = serde_json::from_slice(stdout)?;

    probe
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::FfprobeFailed {
            message: "No duration reported".to_string(),
            stderr: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let json = br#"{"format": {"filename": "output.mp4", "duration": "10.024000"}}"#;
        assert!((parse_duration(json).unwrap() - 10.024).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_missing() {
        let json = br#"{"format": {"filename": "output.mp4"}}"#;
        assert!(matches!(
            parse_duration(json),
            Err(MediaError::FfprobeFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_probe_missing_file() {
        let result = probe_duration("/nonexistent/scene.mp4").await;
        assert!(matches!(result, Err(MediaError::FileNotFound(_))));
    }
}
