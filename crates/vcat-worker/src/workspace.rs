//! Per-job scratch directory.
//!
//! A [`JobWorkspace`] owns a uniquely named directory for the lifetime of one
//! job. It is removed exactly once: by [`JobWorkspace::close`] on the normal
//! path, or by `Drop` if the job future is cancelled or unwinds first.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};
use vcat_models::JobId;

/// Name of the merged output inside a workspace.
pub const OUTPUT_FILE_NAME: &str = "output.mp4";

/// Exclusive temporary directory for a single job.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: Option<TempDir>,
    path: PathBuf,
}

impl JobWorkspace {
    /// Create `concat_<job_id>_*` under `parent`.
    pub fn create(parent: &Path, job_id: &JobId) -> io::Result<Self> {
        std::fs::create_dir_all(parent)?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("concat_{}_", job_id))
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();

        debug!(job_id = %job_id, path = %path.display(), "Created job workspace");

        Ok(Self {
            dir: Some(dir),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local file for the scene at `ordinal`.
    pub fn scene_path(&self, ordinal: usize) -> PathBuf {
        self.path.join(format!("scene_{:04}.mp4", ordinal))
    }

    pub fn output_path(&self) -> PathBuf {
        self.path.join(OUTPUT_FILE_NAME)
    }

    /// Remove the directory and everything in it.
    pub async fn close(mut self) -> io::Result<()> {
        let Some(dir) = self.dir.take() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || dir.close())
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            debug!(path = %self.path.display(), "Removing job workspace on drop");
            if let Err(e) = dir.close() {
                warn!(
                    path = %self.path.display(),
                    "Failed to remove job workspace: {}", e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_workspace_layout() {
        let parent = tempfile::tempdir().unwrap();
        let job_id = JobId::from_string("job-123");
        let ws = JobWorkspace::create(parent.path(), &job_id).unwrap();

        let name = ws.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("concat_job-123_"));
        assert_eq!(ws.scene_path(7).file_name().unwrap(), "scene_0007.mp4");
        assert_eq!(ws.output_path().file_name().unwrap(), "output.mp4");

        ws.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_removes_directory_and_contents() {
        let parent = tempfile::tempdir().unwrap();
        let ws = JobWorkspace::create(parent.path(), &JobId::new()).unwrap();
        let path = ws.path().to_path_buf();
        std::fs::write(ws.scene_path(0), b"data").unwrap();

        ws.close().await.unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_directory() {
        let parent = tempfile::tempdir().unwrap();
        let ws = JobWorkspace::create(parent.path(), &JobId::new()).unwrap();
        let path = ws.path().to_path_buf();
        std::fs::write(ws.output_path(), b"partial").unwrap();

        drop(ws);
        assert!(!path.exists());
    }

    #[test]
    fn test_workspaces_are_distinct() {
        let parent = tempfile::tempdir().unwrap();
        let job_id = JobId::new();
        let a = JobWorkspace::create(parent.path(), &job_id).unwrap();
        let b = JobWorkspace::create(parent.path(), &job_id).unwrap();
        assert_ne!(a.path(), b.path());
    }
}
