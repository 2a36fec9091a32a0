//! FFmpeg progress parsing.
//!
//! FFmpeg is run with `-progress pipe:2`, so stderr interleaves
//! `key=value` progress records with ordinary diagnostic lines. This module
//! tells the two apart and folds progress records into [`FfmpegProgress`].

/// Progress information from FFmpeg.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FfmpegProgress {
    /// Current frame number
    pub frame: u64,
    /// Output time in milliseconds
    pub out_time_ms: i64,
    /// Total bytes written so far
    pub total_size: u64,
    /// Processing speed (e.g., 40.0 = 40x realtime for stream copy)
    pub speed: f64,
    /// Whether the run is complete
    pub is_complete: bool,
}

/// Whether a stderr line is a `-progress` record rather than a diagnostic.
pub fn is_progress_line(line: &str) -> bool {
    let line = line.trim();
    match line.split_once('=') {
        Some((key, value)) => {
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Parse a progress line, returning a snapshot at the end of each record.
pub fn parse_progress_line(line: &str, current: &mut FfmpegProgress) -> Option<FfmpegProgress> {
    let line = line.trim();

    if let Some((key, value)) = line.split_once('=') {
        match key {
            "out_time_ms" | "out_time_us" => {
                // Despite its name, out_time_ms is reported in microseconds
                if let Ok(us) = value.parse::<i64>() {
                    current.out_time_ms = us / 1000;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    current.frame = frame;
                }
            }
            "total_size" => {
                if let Ok(size) = value.parse() {
                    current.total_size = size;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    current.speed = speed;
                }
            }
            "progress" => {
                if value == "end" {
                    current.is_complete = true;
                }
                return Some(current.clone());
            }
            _ => {}
        }
    }

    None
}
