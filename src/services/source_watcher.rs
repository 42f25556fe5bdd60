//! Repository watcher.
//!
//! Polls the repository for head moves and new branches, turns each new commit
//! and branch into an `AutomationEvent`, and puts it on the event queue.
//!
//! The first successful observation of the head and of the branch set is the
//! baseline; nothing that existed before it is reported. Query failures are
//! logged and treated as "nothing new", so the loop keeps polling.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::domain::models::{
    short_hash, AutomationEvent, CommitInfo, EventKind, EventPayload, GitPayload, WatcherConfig,
};
use crate::domain::ports::{EventQueue, SourceRepository, Ticker};

use super::commit_analyzer::{commit_priority, complexity_score, detect_patterns};
use super::event_factory::make_event;

/// Phase of the watcher's poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Sleeping between polls
    Idle,
    /// Querying the repository
    Polling,
    /// Putting events on the queue
    Emitting,
}

/// What a single tick produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// `new_commit` events put on the queue
    pub commit_events: usize,
    /// `new_branch` events put on the queue
    pub branch_events: usize,
}

impl TickReport {
    /// All events put on the queue.
    pub fn total(&self) -> usize {
        self.commit_events + self.branch_events
    }
}

#[derive(Debug)]
struct WatchState {
    phase: WatcherState,
    /// `None` until the first successful head lookup.
    last_head: Option<String>,
    /// `None` until the first successful branch listing.
    known_branches: Option<BTreeSet<String>>,
}

/// Polls one repository and emits events for what changed.
pub struct SourceWatcher {
    repo: Arc<dyn SourceRepository>,
    queue: Arc<dyn EventQueue>,
    ticker: Arc<dyn Ticker>,
    config: WatcherConfig,
    state: Mutex<WatchState>,
    running: Arc<AtomicBool>,
    /// Wakes the loop out of its sleep when stopped.
    shutdown: watch::Sender<bool>,
}

impl SourceWatcher {
    /// Watcher over `repo`; call `bootstrap` or `run` before polling.
    pub fn new(
        repo: Arc<dyn SourceRepository>,
        queue: Arc<dyn EventQueue>,
        ticker: Arc<dyn Ticker>,
        config: WatcherConfig,
    ) -> Self {
        Self {
            repo,
            queue,
            ticker,
            config,
            state: Mutex::new(WatchState {
                phase: WatcherState::Idle,
                last_head: None,
                known_branches: None,
            }),
            running: Arc::new(AtomicBool::new(false)),
            shutdown: watch::channel(false).0,
        }
    }

    /// Record the current head and branch set as the baseline.
    ///
    /// A failed query leaves that part unset; the next successful poll then
    /// becomes its baseline instead of producing events.
    pub async fn bootstrap(&self) {
        let mut state = self.state.lock().await;

        match self.repo.head().await {
            Ok(head) if !head.is_empty() => state.last_head = Some(head),
            Ok(_) => warn!(repository = %self.repo.location(), "Repository has no head yet"),
            Err(e) => warn!(repository = %self.repo.location(), error = %e, "Failed to read head during bootstrap"),
        }

        match self.repo.branches().await {
            Ok(branches) => state.known_branches = Some(branches),
            Err(e) => warn!(repository = %self.repo.location(), error = %e, "Failed to list branches during bootstrap"),
        }

        info!(
            repository = %self.repo.location(),
            head = state.last_head.as_deref().map_or("-", short_hash),
            known_branches = state.known_branches.as_ref().map_or(0, BTreeSet::len),
            "Source watcher initialized"
        );
    }

    /// Run one poll cycle.
    #[instrument(skip(self), fields(repository = %self.repo.location()))]
    pub async fn tick(&self) -> TickReport {
        let mut state = self.state.lock().await;
        state.phase = WatcherState::Polling;

        let commit_events = self.check_for_new_commits(&mut state).await;
        let branch_events = self.check_for_new_branches(&mut state).await;

        state.phase = WatcherState::Idle;
        TickReport {
            commit_events,
            branch_events,
        }
    }

    /// Bootstrap, then poll until [`SourceWatcher::stop`] is called.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.shutdown.send_replace(false);
        let mut shutdown = self.shutdown.subscribe();
        self.bootstrap().await;

        let interval = Duration::from_secs(self.config.poll_interval_secs);
        info!(poll_interval_secs = self.config.poll_interval_secs, "Source watcher started");

        while self.running.load(Ordering::SeqCst) {
            let report = self.tick().await;
            if report.total() > 0 {
                debug!(
                    commits = report.commit_events,
                    branches = report.branch_events,
                    "Poll emitted events"
                );
            }
            if !self.running.load(Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                () = self.ticker.sleep(interval) => {}
                _ = shutdown.changed() => {}
            }
        }

        info!("Source watcher stopped");
    }

    /// Stop the poll loop after the current tick.
    ///
    /// A loop waiting out its pause wakes immediately.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.send_replace(true);
    }

    /// Whether the poll loop is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current phase of the poll cycle.
    pub async fn state(&self) -> WatcherState {
        self.state.lock().await.phase
    }

    /// Last head the watcher has fully processed.
    pub async fn last_head(&self) -> Option<String> {
        self.state.lock().await.last_head.clone()
    }

    /// Branch names the watcher has already reported or baselined.
    pub async fn known_branches(&self) -> BTreeSet<String> {
        self.state
            .lock()
            .await
            .known_branches
            .clone()
            .unwrap_or_default()
    }

    async fn check_for_new_commits(&self, state: &mut WatchState) -> usize {
        let head = match self.repo.head().await {
            Ok(head) if !head.is_empty() => head,
            Ok(_) => return 0,
            Err(e) => {
                warn!(error = %e, "Head lookup failed, skipping commit check");
                return 0;
            }
        };

        let Some(previous) = state.last_head.clone() else {
            info!(head = short_hash(&head), "Head baseline recorded");
            state.last_head = Some(head);
            return 0;
        };

        if previous == head {
            return 0;
        }

        let hashes = match self.repo.commit_range(&previous, &head).await {
            Ok(hashes) => hashes,
            Err(e) => {
                warn!(
                    from = short_hash(&previous),
                    to = short_hash(&head),
                    error = %e,
                    "Commit range lookup failed, will retry next poll"
                );
                return 0;
            }
        };

        state.phase = WatcherState::Emitting;
        let branch = self.current_branch_or_empty().await;

        let mut emitted = 0;
        for hash in &hashes {
            let commit = match self.repo.commit_info(hash).await {
                Ok(commit) => commit,
                Err(e) => {
                    warn!(commit = short_hash(hash), error = %e, "Skipping commit with unreadable metadata");
                    continue;
                }
            };

            let event = self.build_commit_event(&commit, &branch);
            if let Err(e) = self.queue.put(&event).await {
                error!(
                    commit = commit.short_hash(),
                    event_id = %event.id,
                    error = %e,
                    "Failed to enqueue commit event, head not advanced"
                );
                return emitted;
            }

            info!(
                commit = commit.short_hash(),
                event_id = %event.id,
                author = %commit.author,
                files_changed = commit.file_count(),
                priority = %event.priority,
                complexity = event.estimated_complexity.unwrap_or_default(),
                "New commit detected"
            );
            emitted += 1;
        }

        state.last_head = Some(head);
        emitted
    }

    async fn check_for_new_branches(&self, state: &mut WatchState) -> usize {
        let current = match self.repo.branches().await {
            Ok(branches) => branches,
            Err(e) => {
                warn!(error = %e, "Branch listing failed, skipping branch check");
                return 0;
            }
        };

        let Some(known) = state.known_branches.as_mut() else {
            info!(branches = current.len(), "Branch baseline recorded");
            state.known_branches = Some(current);
            return 0;
        };

        let added = new_branches(known, &current);
        if added.is_empty() {
            return 0;
        }

        state.phase = WatcherState::Emitting;
        let created_from = self.current_branch_or_empty().await;

        let mut emitted = 0;
        for name in added {
            let event = self.build_branch_event(&name, &created_from);
            match self.queue.put(&event).await {
                Ok(()) => {
                    info!(branch = %name, event_id = %event.id, "New branch detected");
                    known.insert(name);
                    emitted += 1;
                }
                Err(e) => {
                    error!(branch = %name, event_id = %event.id, error = %e, "Failed to enqueue branch event");
                }
            }
        }

        // Branches that disappeared stay known so a re-created name is not reported twice.
        emitted
    }

    fn build_commit_event(&self, commit: &CommitInfo, branch: &str) -> AutomationEvent {
        let payload = GitPayload {
            repository: self.repo.location(),
            branch: branch.to_string(),
            commit_hash: commit.hash.clone(),
            author: commit.author.clone(),
            files_changed: commit.files_changed.clone(),
            diff_stats: commit.diff_stats.clone(),
            subject: Some(commit.subject.clone()),
            created_from: None,
        };

        let mut event = make_event(
            EventKind::NewCommit,
            EventPayload::Git(payload),
            self.config.source.clone(),
        );
        event.priority = commit_priority(&commit.subject, commit.file_count());
        let patterns = detect_patterns(commit);
        if !patterns.is_empty() {
            event.related_patterns = patterns;
        }
        event.estimated_complexity = Some(complexity_score(commit));
        event
    }

    fn build_branch_event(&self, name: &str, created_from: &str) -> AutomationEvent {
        let payload = GitPayload {
            repository: self.repo.location(),
            branch: name.to_string(),
            created_from: Some(created_from.to_string()),
            ..Default::default()
        };
        make_event(
            EventKind::NewBranch,
            EventPayload::Git(payload),
            self.config.source.clone(),
        )
    }

    async fn current_branch_or_empty(&self) -> String {
        self.repo.current_branch().await.unwrap_or_else(|e| {
            debug!(error = %e, "Current branch lookup failed");
            String::new()
        })
    }
}

/// Names present in `current` but not in `known`, in sorted order.
pub fn new_branches(known: &BTreeSet<String>, current: &BTreeSet<String>) -> Vec<String> {
    current.difference(known).cloned().collect()
}
