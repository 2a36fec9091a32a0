//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum concurrent FFmpeg processes across all jobs
    pub max_ffmpeg_processes: usize,
    /// Maximum concurrent outbound scene fetches across all jobs
    pub max_concurrent_fetches: usize,
    /// Maximum concurrent scene fetches within a single job
    pub max_download_parallel: usize,
    /// Timeout for a single scene fetch attempt
    pub scene_timeout: Duration,
    /// Timeout for the encoder process
    pub encode_timeout: Duration,
    /// Deadline for a whole job
    pub job_timeout: Duration,
    /// Retries for transient fetch failures (not counting the first attempt)
    pub fetch_max_retries: u32,
    /// Largest accepted manifest
    pub max_scenes: usize,
    /// Parent directory for job workspaces
    pub work_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_ffmpeg_processes: 4,
            max_concurrent_fetches: 16,
            max_download_parallel: 4,
            scene_timeout: Duration::from_secs(120),
            encode_timeout: Duration::from_secs(600),
            job_timeout: Duration::from_secs(1800), // 30 minutes
            fetch_max_retries: 2,
            max_scenes: 200,
            work_dir: std::env::temp_dir(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_ffmpeg_processes: env_parse("WORKER_MAX_FFMPEG")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_ffmpeg_processes),
            max_concurrent_fetches: env_parse("WORKER_MAX_CONCURRENT_FETCHES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_fetches),
            max_download_parallel: env_parse("WORKER_MAX_DOWNLOAD_PARALLEL")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_download_parallel),
            scene_timeout: env_parse("WORKER_SCENE_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.scene_timeout),
            encode_timeout: env_parse("WORKER_ENCODE_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.encode_timeout),
            job_timeout: env_parse("WORKER_JOB_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.job_timeout),
            fetch_max_retries: env_parse("WORKER_FETCH_MAX_RETRIES")
                .unwrap_or(defaults.fetch_max_retries),
            max_scenes: env_parse("WORKER_MAX_SCENES")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_scenes),
            work_dir: std::env::var("WORKER_WORK_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.max_ffmpeg_processes, 4);
        assert_eq!(config.max_concurrent_fetches, 16);
        assert_eq!(config.max_download_parallel, 4);
        assert_eq!(config.scene_timeout, Duration::from_secs(120));
        assert_eq!(config.encode_timeout, Duration::from_secs(600));
        assert_eq!(config.job_timeout, Duration::from_secs(1800));
        assert_eq!(config.fetch_max_retries, 2);
        assert_eq!(config.max_scenes, 200);
    }

    #[test]
    fn test_from_env_ignores_garbage() {
        std::env::set_var("WORKER_MAX_SCENES", "not-a-number");
        std::env::set_var("WORKER_MAX_CONCURRENT_FETCHES", "0");
        let config = WorkerConfig::from_env();
        assert_eq!(config.max_scenes, 200);
        assert_eq!(config.max_concurrent_fetches, 16);
        std::env::remove_var("WORKER_MAX_SCENES");
        std::env::remove_var("WORKER_MAX_CONCURRENT_FETCHES");
    }
}
