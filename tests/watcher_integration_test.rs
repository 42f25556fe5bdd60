//! Source watcher tests against an in-memory repository and a real file queue.

mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use autopilot::adapters::{FileEventQueue, MockExecutor};
use autopilot::domain::models::{EventKind, OrchestratorConfig, Priority, TaskKind, WatcherConfig};
use autopilot::domain::ports::{EventQueue, TokioTicker};
use autopilot::services::{Orchestrator, SourceWatcher, WatcherState};

use common::{commit, FakeRepository, FlakyQueue, RecordingTicker};

struct Harness {
    _dir: tempfile::TempDir,
    repo: FakeRepository,
    queue: Arc<FileEventQueue>,
    watcher: SourceWatcher,
}

async fn harness() -> Harness {
    let dir = common::temp_dir();
    let repo = FakeRepository::with_root().await;
    let queue = Arc::new(FileEventQueue::new(dir.path()));
    let watcher = SourceWatcher::new(
        Arc::new(repo.clone()),
        queue.clone(),
        Arc::new(RecordingTicker::default()),
        WatcherConfig::default(),
    );
    watcher.bootstrap().await;

    Harness {
        _dir: dir,
        repo,
        queue,
        watcher,
    }
}

#[tokio::test]
async fn test_bootstrap_reports_nothing() {
    let h = harness().await;
    assert_eq!(h.watcher.last_head().await.as_deref(), Some("root0000"));
    assert_eq!(h.watcher.known_branches().await.len(), 1);

    let report = h.watcher.tick().await;
    assert_eq!(report.total(), 0);
    assert!(h.queue.drain().await.unwrap().is_empty());
    assert_eq!(h.watcher.state().await, WatcherState::Idle);
}

#[tokio::test]
async fn test_new_commits_emitted_oldest_first() {
    let h = harness().await;
    h.repo
        .push_commit(commit("aaaa1111", "fix login bug", &["src/auth.rs"], 5))
        .await;
    h.repo
        .push_commit(commit("bbbb2222", "docs: refresh guide", &["docs/guide.md", "tests/guide_test.rs"], 20))
        .await;

    let report = h.watcher.tick().await;
    assert_eq!(report.commit_events, 2);
    assert_eq!(h.watcher.last_head().await.as_deref(), Some("bbbb2222"));

    let events = h.queue.drain().await.unwrap();
    let hashes: Vec<&str> = events
        .iter()
        .map(|e| e.git().unwrap().commit_hash.as_str())
        .collect();
    assert_eq!(hashes, vec!["aaaa1111", "bbbb2222"]);

    let first = &events[0];
    assert_eq!(first.kind, EventKind::NewCommit);
    assert_eq!(first.source, "git-watcher");
    assert_eq!(first.priority, Priority::Critical);
    assert_eq!(first.git().unwrap().branch, "main");
    assert_eq!(first.git().unwrap().subject.as_deref(), Some("fix login bug"));
    // No tag matched, so the registry patterns stay.
    assert_eq!(first.related_patterns, vec!["pattern-extraction", "code-review"]);

    let second = &events[1];
    assert_eq!(second.priority, Priority::Medium);
    assert_eq!(
        second.related_patterns,
        vec!["test-pattern", "documentation-pattern"]
    );
    // 2 files (4) + 40 lines (4) + 2 extensions (10) + 2 directories (6)
    assert_eq!(second.estimated_complexity, Some(24.0));
}

#[tokio::test]
async fn test_new_branch_detected_once() {
    let h = harness().await;
    h.repo.add_branch("feature-x").await;

    let report = h.watcher.tick().await;
    assert_eq!(report.branch_events, 1);

    let events = h.queue.drain().await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::NewBranch);
    let git = events[0].git().unwrap();
    assert_eq!(git.branch, "feature-x");
    assert_eq!(git.created_from.as_deref(), Some("main"));

    let expected: BTreeSet<String> = ["main", "feature-x"].iter().map(|s| (*s).to_string()).collect();
    assert_eq!(h.watcher.known_branches().await, expected);

    assert_eq!(h.watcher.tick().await.total(), 0);
}

#[tokio::test]
async fn test_head_failure_skips_commit_check_until_recovery() {
    let h = harness().await;
    h.repo.push_commit(commit("cccc3333", "update config", &["app.toml"], 1)).await;
    h.repo.set_fail_head(true).await;

    assert_eq!(h.watcher.tick().await.total(), 0);
    assert_eq!(h.watcher.last_head().await.as_deref(), Some("root0000"));

    h.repo.set_fail_head(false).await;
    assert_eq!(h.watcher.tick().await.commit_events, 1);
}

#[tokio::test]
async fn test_range_failure_keeps_head_for_retry() {
    let h = harness().await;
    h.repo.push_commit(commit("dddd4444", "feat: cache", &["src/cache.rs"], 3)).await;
    h.repo.set_fail_range(true).await;

    assert_eq!(h.watcher.tick().await.commit_events, 0);
    assert_eq!(h.watcher.last_head().await.as_deref(), Some("root0000"));

    h.repo.set_fail_range(false).await;
    assert_eq!(h.watcher.tick().await.commit_events, 1);
    assert_eq!(h.watcher.last_head().await.as_deref(), Some("dddd4444"));
}

#[tokio::test]
async fn test_branch_failure_does_not_block_commits() {
    let h = harness().await;
    h.repo.push_commit(commit("eeee5555", "update config", &["app.toml"], 1)).await;
    h.repo.add_branch("hotfix").await;
    h.repo.set_fail_branches(true).await;

    let report = h.watcher.tick().await;
    assert_eq!(report.commit_events, 1);
    assert_eq!(report.branch_events, 0);

    h.repo.set_fail_branches(false).await;
    assert_eq!(h.watcher.tick().await.branch_events, 1);
}

#[tokio::test]
async fn test_failed_enqueue_does_not_advance_head() {
    let dir = common::temp_dir();
    let repo = FakeRepository::with_root().await;
    let inner: Arc<dyn EventQueue> = Arc::new(FileEventQueue::new(dir.path()));
    let queue = Arc::new(FlakyQueue::new(inner.clone()).failing_puts(1));
    let watcher = SourceWatcher::new(
        Arc::new(repo.clone()),
        queue,
        Arc::new(RecordingTicker::default()),
        WatcherConfig::default(),
    );
    watcher.bootstrap().await;

    repo.push_commit(commit("ffff6666", "update config", &["app.toml"], 1)).await;
    assert_eq!(watcher.tick().await.commit_events, 0);
    assert_eq!(watcher.last_head().await.as_deref(), Some("root0000"));

    assert_eq!(watcher.tick().await.commit_events, 1);
    assert_eq!(inner.drain().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_failed_bootstrap_uses_first_poll_as_baseline() {
    let dir = common::temp_dir();
    let repo = FakeRepository::with_root().await;
    repo.set_fail_head(true).await;
    let queue = Arc::new(FileEventQueue::new(dir.path()));
    let watcher = SourceWatcher::new(
        Arc::new(repo.clone()),
        queue.clone(),
        Arc::new(RecordingTicker::default()),
        WatcherConfig::default(),
    );
    watcher.bootstrap().await;
    assert!(watcher.last_head().await.is_none());

    repo.set_fail_head(false).await;
    repo.push_commit(commit("abab7777", "update config", &["app.toml"], 1)).await;
    assert_eq!(watcher.tick().await.commit_events, 0);
    assert_eq!(watcher.last_head().await.as_deref(), Some("abab7777"));
    assert!(queue.drain().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_polls_at_configured_interval_until_stopped() {
    let dir = common::temp_dir();
    let repo = FakeRepository::with_root().await;
    let ticker = RecordingTicker::default();
    let watcher = Arc::new(SourceWatcher::new(
        Arc::new(repo),
        Arc::new(FileEventQueue::new(dir.path())),
        Arc::new(ticker.clone()),
        WatcherConfig {
            poll_interval_secs: 7,
            ..Default::default()
        },
    ));

    let runner = watcher.clone();
    let handle = tokio::spawn(async move { runner.run().await });

    let reached = tokio::time::timeout(Duration::from_secs(5), async {
        while ticker.sleeps().await.len() < 2 {
            tokio::task::yield_now().await;
        }
    })
    .await;
    watcher.stop();
    handle.await.unwrap();

    assert!(reached.is_ok(), "watcher did not keep polling");
    assert!(ticker.sleeps().await.iter().all(|d| *d == Duration::from_secs(7)));
    assert!(!watcher.is_running());
}

#[tokio::test]
async fn test_watcher_to_orchestrator_pipeline() {
    let h = harness().await;
    h.repo
        .push_commit(commit(
            "1234abcd5678",
            "refactor queue layer",
            &["src/queue/mod.rs", "src/queue/file.rs", "docs/queue.md", "README.md"],
            40,
        ))
        .await;
    h.watcher.tick().await;

    let executor = MockExecutor::new();
    let orchestrator = Orchestrator::new(
        h.queue.clone(),
        Arc::new(executor.clone()),
        Arc::new(RecordingTicker::default()),
        OrchestratorConfig::default(),
    );
    orchestrator.tick().await.unwrap();

    let kinds: Vec<TaskKind> = executor.forwarded().await.iter().map(|t| t.kind).collect();
    // 8 + 16 + 10 + 9 = 43 > 30, and two markdown files
    assert_eq!(
        kinds,
        vec![
            TaskKind::PatternExtraction,
            TaskKind::CodeReview,
            TaskKind::DocumentationUpdate
        ]
    );
}

#[tokio::test]
async fn test_stop_wakes_watcher_from_poll_pause() {
    let dir = common::temp_dir();
    let watcher = Arc::new(SourceWatcher::new(
        Arc::new(FakeRepository::with_root().await),
        Arc::new(FileEventQueue::new(dir.path())),
        Arc::new(TokioTicker),
        WatcherConfig {
            poll_interval_secs: 3600,
            ..Default::default()
        },
    ));

    let runner = watcher.clone();
    let handle = tokio::spawn(async move { runner.run().await });
    while !watcher.is_running() {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;

    watcher.stop();
    let finished = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(finished.is_ok(), "watcher kept sleeping after stop");
}
