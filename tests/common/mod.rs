//! Common test utilities for integration tests
//!
//! Provides shared fixtures, fakes for the repository and ticker ports, and
//! git repository setup used across multiple integration test files.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::RwLock;

use autopilot::domain::models::{AutomationEvent, CommitInfo, DiffStat};
use autopilot::domain::ports::{EventQueue, SourceRepository, Ticker};
use autopilot::{DomainError, DomainResult};

/// Create a temporary directory for test isolation
///
/// Returns a TempDir that will be cleaned up when dropped.
#[allow(dead_code)]
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Build a commit touching `files`, each with `lines` added lines.
#[allow(dead_code)]
pub fn commit(hash: &str, subject: &str, files: &[&str], lines: u64) -> CommitInfo {
    CommitInfo {
        hash: hash.to_string(),
        author: "Test User".to_string(),
        author_email: "test@test.com".to_string(),
        subject: subject.to_string(),
        body: String::new(),
        files_changed: files.iter().map(|f| (*f).to_string()).collect(),
        diff_stats: files
            .iter()
            .map(|f| {
                (
                    (*f).to_string(),
                    DiffStat {
                        additions: lines,
                        deletions: 0,
                    },
                )
            })
            .collect(),
    }
}

#[derive(Debug, Default)]
struct FakeRepoState {
    /// Linear history, oldest first
    history: Vec<CommitInfo>,
    branches: BTreeSet<String>,
    current_branch: String,
    fail_head: bool,
    fail_range: bool,
    fail_branches: bool,
}

/// In-memory repository with a linear history and scriptable failures.
#[derive(Debug, Clone, Default)]
pub struct FakeRepository {
    state: Arc<RwLock<FakeRepoState>>,
}

#[allow(dead_code)]
impl FakeRepository {
    /// Repository on `main` with a single root commit.
    pub async fn with_root() -> Self {
        let repo = Self::default();
        {
            let mut state = repo.state.write().await;
            state.history.push(commit("root0000", "initial commit", &[], 0));
            state.branches.insert("main".to_string());
            state.current_branch = "main".to_string();
        }
        repo
    }

    pub async fn push_commit(&self, info: CommitInfo) {
        self.state.write().await.history.push(info);
    }

    pub async fn add_branch(&self, name: &str) {
        self.state.write().await.branches.insert(name.to_string());
    }

    pub async fn set_fail_head(&self, fail: bool) {
        self.state.write().await.fail_head = fail;
    }

    pub async fn set_fail_range(&self, fail: bool) {
        self.state.write().await.fail_range = fail;
    }

    pub async fn set_fail_branches(&self, fail: bool) {
        self.state.write().await.fail_branches = fail;
    }
}

#[async_trait]
impl SourceRepository for FakeRepository {
    fn location(&self) -> String {
        "/fake/repo".to_string()
    }

    async fn head(&self) -> DomainResult<String> {
        let state = self.state.read().await;
        if state.fail_head {
            return Err(DomainError::transient("head", "scripted failure"));
        }
        state
            .history
            .last()
            .map(|c| c.hash.clone())
            .ok_or_else(|| DomainError::transient("head", "no commits"))
    }

    async fn current_branch(&self) -> DomainResult<String> {
        Ok(self.state.read().await.current_branch.clone())
    }

    async fn branches(&self) -> DomainResult<BTreeSet<String>> {
        let state = self.state.read().await;
        if state.fail_branches {
            return Err(DomainError::transient("branches", "scripted failure"));
        }
        Ok(state.branches.clone())
    }

    async fn commit_range(&self, from: &str, to: &str) -> DomainResult<Vec<String>> {
        let state = self.state.read().await;
        if state.fail_range {
            return Err(DomainError::transient("commit_range", "scripted failure"));
        }
        let position = |hash: &str| state.history.iter().position(|c| c.hash == hash);
        let (Some(start), Some(end)) = (position(from), position(to)) else {
            return Err(DomainError::transient("commit_range", "unknown revision"));
        };
        Ok(state.history[start + 1..=end]
            .iter()
            .map(|c| c.hash.clone())
            .collect())
    }

    async fn commit_info(&self, hash: &str) -> DomainResult<CommitInfo> {
        self.state
            .read()
            .await
            .history
            .iter()
            .find(|c| c.hash == hash)
            .cloned()
            .ok_or_else(|| DomainError::transient("commit_info", format!("unknown commit {hash}")))
    }
}

/// Ticker that returns immediately and records every requested pause.
#[derive(Debug, Clone, Default)]
pub struct RecordingTicker {
    sleeps: Arc<RwLock<Vec<Duration>>>,
}

#[allow(dead_code)]
impl RecordingTicker {
    pub async fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.read().await.clone()
    }
}

#[async_trait]
impl Ticker for RecordingTicker {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.write().await.push(duration);
        tokio::task::yield_now().await;
    }
}

/// Queue wrapper whose first `failures` calls to `put` and `drain` fail.
pub struct FlakyQueue {
    inner: Arc<dyn EventQueue>,
    put_failures: AtomicUsize,
    drain_failures: AtomicUsize,
}

#[allow(dead_code)]
impl FlakyQueue {
    pub fn new(inner: Arc<dyn EventQueue>) -> Self {
        Self {
            inner,
            put_failures: AtomicUsize::new(0),
            drain_failures: AtomicUsize::new(0),
        }
    }

    pub fn failing_puts(self, count: usize) -> Self {
        self.put_failures.store(count, Ordering::SeqCst);
        self
    }

    pub fn failing_drains(self, count: usize) -> Self {
        self.drain_failures.store(count, Ordering::SeqCst);
        self
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EventQueue for FlakyQueue {
    async fn put(&self, event: &AutomationEvent) -> DomainResult<()> {
        if Self::take_failure(&self.put_failures) {
            return Err(DomainError::queue_io(
                "/flaky",
                std::io::Error::new(std::io::ErrorKind::Other, "scripted put failure"),
            ));
        }
        self.inner.put(event).await
    }

    async fn drain(&self) -> DomainResult<Vec<AutomationEvent>> {
        if Self::take_failure(&self.drain_failures) {
            return Err(DomainError::queue_io(
                "/flaky",
                std::io::Error::new(std::io::ErrorKind::Other, "scripted drain failure"),
            ));
        }
        self.inner.drain().await
    }

    async fn pending(&self) -> DomainResult<Vec<String>> {
        self.inner.pending().await
    }
}

/// Whether a usable `git` binary is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `path`, panicking on failure.
#[allow(dead_code)]
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Setup a git repository in a temp directory for testing
///
/// Creates an initialized repo on `main` with an initial empty commit.
/// The TempDir must be kept alive to prevent cleanup.
#[allow(dead_code)]
pub fn setup_test_git_repo() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().to_path_buf();

    git(&path, &["-c", "init.defaultBranch=main", "init"]);
    git(&path, &["config", "user.email", "test@test.com"]);
    git(&path, &["config", "user.name", "Test User"]);
    git(&path, &["config", "commit.gpgsign", "false"]);
    git(&path, &["commit", "--allow-empty", "-m", "initial commit"]);

    (dir, path)
}

/// Write `files` (path, contents) into the repo and commit them.
#[allow(dead_code)]
pub fn commit_files(repo: &Path, subject: &str, files: &[(&str, &str)]) -> String {
    for (name, contents) in files {
        let path = repo.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
    }
    git(repo, &["add", "-A"]);
    git(repo, &["commit", "-m", subject]);
    git(repo, &["rev-parse", "HEAD"])
}
