//! End-to-end job lifecycle tests against a mock scene host.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use vcat_media::{ConcatExecutor, ConcatOutput, MediaError, MediaResult};
use vcat_models::{ConcatRequest, ErrorKind, JobState, Scene};
use vcat_storage::{public_object_url, ObjectStore, StorageResult};
use vcat_worker::{ArtifactPublisher, JobManager, SceneFetcher, WorkerConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Appends inputs byte-for-byte, in the order given.
#[derive(Default)]
struct ByteConcat {
    calls: AtomicUsize,
}

#[async_trait]
impl ConcatExecutor for ByteConcat {
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> MediaResult<ConcatOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut merged = Vec::new();
        for input in inputs {
            merged.extend(tokio::fs::read(input).await?);
        }
        tokio::fs::write(output, &merged).await?;
        Ok(ConcatOutput {
            path: output.to_path_buf(),
            size_bytes: merged.len() as u64,
            duration_secs: Some(inputs.len() as f64),
        })
    }
}

struct FailingConcat;

#[async_trait]
impl ConcatExecutor for FailingConcat {
    async fn concat(&self, _inputs: &[PathBuf], _output: &Path) -> MediaResult<ConcatOutput> {
        Err(MediaError::ffmpeg_failed(
            "FFmpeg exited with status 1",
            Some("concat.txt: Invalid data found when processing input".to_string()),
            Some(1),
        ))
    }
}

struct PanickingConcat;

#[async_trait]
impl ConcatExecutor for PanickingConcat {
    async fn concat(&self, _inputs: &[PathBuf], _output: &Path) -> MediaResult<ConcatOutput> {
        panic!("encoder adapter bug");
    }
}

/// Keeps a copy of every uploaded object.
#[derive(Default)]
struct MemoryStore {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        "videos"
    }

    async fn upload_file(&self, path: &Path, key: &str, _content_type: &str) -> StorageResult<()> {
        let bytes = tokio::fs::read(path).await?;
        self.objects.lock().unwrap().push((key.to_string(), bytes));
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url("https://cdn.example.com/videos", key)
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        Ok(())
    }
}

fn test_config(work_dir: &Path) -> WorkerConfig {
    WorkerConfig {
        work_dir: work_dir.to_path_buf(),
        scene_timeout: Duration::from_secs(5),
        fetch_max_retries: 0,
        ..WorkerConfig::default()
    }
}

fn manager(
    config: WorkerConfig,
    executor: Arc<dyn ConcatExecutor>,
    store: Option<Arc<dyn ObjectStore>>,
) -> JobManager {
    let fetcher = SceneFetcher::new(&config).unwrap();
    JobManager::new(config, fetcher, executor, ArtifactPublisher::new(store))
}

fn request(urls: &[String]) -> ConcatRequest {
    ConcatRequest {
        scenes: urls
            .iter()
            .map(|url| Scene {
                url: url.clone(),
                duration: 4.0,
            })
            .collect(),
        output_path: "renders/final.mp4".to_string(),
        campaign_id: "camp-42".to_string(),
    }
}

async fn serve(server: &MockServer, route: &str, body: &[u8], delay: Duration) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
    format!("{}{}", server.uri(), route)
}

fn assert_empty(dir: &Path) {
    let leftovers: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
    assert!(leftovers.is_empty(), "workspace left behind: {leftovers:?}");
}

#[tokio::test]
async fn test_two_scenes_publish_in_manifest_order() {
    let server = MockServer::start().await;
    // The first scene arrives last
    let first = serve(&server, "/one.mp4", b"AAAA", Duration::from_millis(300)).await;
    let second = serve(&server, "/two.mp4", b"BBBB", Duration::ZERO).await;

    let work = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::default());
    let jobs = manager(
        test_config(work.path()),
        Arc::new(ByteConcat::default()),
        Some(store.clone()),
    );

    let outcome = jobs.submit(request(&[first, second])).await.unwrap();

    assert_eq!(outcome.scene_count, 2);
    assert!(outcome.storage_path.starts_with("camp-42/"));
    assert!(outcome.storage_path.contains(outcome.job_id.as_str()));
    assert!(!outcome.output_url.is_empty());
    assert_eq!(outcome.output_bytes, 8);
    assert_eq!(outcome.output_duration_secs, Some(2.0));

    let objects = store.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].0, outcome.storage_path);
    assert_eq!(objects[0].1, b"AAAABBBB");

    assert_empty(work.path());
}

#[tokio::test]
async fn test_empty_manifest_is_rejected_without_workspace() {
    let work = tempfile::tempdir().unwrap();
    let executor = Arc::new(ByteConcat::default());
    let jobs = manager(test_config(work.path()), executor.clone(), None);

    let failure = jobs.submit(request(&[])).await.unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::ValidationError);
    assert!(failure.job_id.is_none());
    assert!(failure.stage.is_none());
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    assert_empty(work.path());
}

#[tokio::test]
async fn test_unreachable_host_is_download_error() {
    let work = tempfile::tempdir().unwrap();
    let jobs = manager(
        test_config(work.path()),
        Arc::new(ByteConcat::default()),
        Some(Arc::new(MemoryStore::default())),
    );

    // Nothing listens on port 9 (discard) in the test environment
    let failure = jobs
        .submit(request(&["http://127.0.0.1:9/scene.mp4".to_string()]))
        .await
        .unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::DownloadError);
    assert!(failure.job_id.is_some());
    assert_eq!(failure.stage, Some(JobState::Fetching));
    assert_eq!(failure.error.ordinal(), Some(0));
    assert_empty(work.path());
}

#[tokio::test]
async fn test_missing_storage_fails_at_publish() {
    let server = MockServer::start().await;
    let a = serve(&server, "/a.mp4", b"A", Duration::ZERO).await;
    let b = serve(&server, "/b.mp4", b"B", Duration::ZERO).await;

    let work = tempfile::tempdir().unwrap();
    let executor = Arc::new(ByteConcat::default());
    let jobs = manager(test_config(work.path()), executor.clone(), None);

    let failure = jobs.submit(request(&[a, b])).await.unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::UploadError);
    assert_eq!(failure.error.code(), Some("storage_not_configured"));
    assert_eq!(failure.stage, Some(JobState::Publishing));
    assert_eq!(executor.calls.load(Ordering::SeqCst), 1);
    assert_empty(work.path());
}

#[tokio::test]
async fn test_encoder_failure_carries_diagnostics() {
    let server = MockServer::start().await;
    let a = serve(&server, "/a.mp4", b"A", Duration::ZERO).await;

    let work = tempfile::tempdir().unwrap();
    let store = Arc::new(MemoryStore::default());
    let jobs = manager(
        test_config(work.path()),
        Arc::new(FailingConcat),
        Some(store.clone()),
    );

    let failure = jobs.submit(request(&[a])).await.unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::EncodingError);
    assert_eq!(failure.stage, Some(JobState::Concatenating));
    assert!(failure
        .error
        .diagnostics()
        .unwrap()
        .contains("Invalid data found"));
    assert!(store.objects.lock().unwrap().is_empty());
    assert_empty(work.path());
}

#[tokio::test]
async fn test_panicking_stage_is_internal_error() {
    let server = MockServer::start().await;
    let a = serve(&server, "/a.mp4", b"A", Duration::ZERO).await;

    let work = tempfile::tempdir().unwrap();
    let jobs = manager(test_config(work.path()), Arc::new(PanickingConcat), None);

    let failure = jobs.submit(request(&[a])).await.unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::InternalError);
    assert_eq!(failure.stage, Some(JobState::Concatenating));
    assert_empty(work.path());
}

#[tokio::test]
async fn test_job_deadline_is_internal_error() {
    let server = MockServer::start().await;
    let slow = serve(&server, "/slow.mp4", b"S", Duration::from_secs(3)).await;

    let work = tempfile::tempdir().unwrap();
    let config = WorkerConfig {
        job_timeout: Duration::from_millis(200),
        ..test_config(work.path())
    };
    let jobs = manager(config, Arc::new(ByteConcat::default()), None);

    let failure = jobs.submit(request(&[slow])).await.unwrap_err();

    assert_eq!(failure.kind(), ErrorKind::InternalError);
    assert_eq!(failure.stage, Some(JobState::Fetching));
    assert!(failure.to_string().contains("deadline"));
    assert_empty(work.path());
}

#[tokio::test]
async fn test_cancelled_job_removes_workspace() {
    let server = MockServer::start().await;
    let slow = serve(&server, "/slow.mp4", b"S", Duration::from_secs(3)).await;

    let work = tempfile::tempdir().unwrap();
    let jobs = Arc::new(manager(
        test_config(work.path()),
        Arc::new(ByteConcat::default()),
        None,
    ));

    let handle = tokio::spawn({
        let jobs = jobs.clone();
        async move { jobs.submit(request(&[slow])).await }
    });

    // Let the job get as far as fetching
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 1);

    handle.abort();
    assert!(handle.await.unwrap_err().is_cancelled());
    assert_empty(work.path());
}
