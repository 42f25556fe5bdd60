//! Filesystem-backed event queue.
//!
//! One JSON file per pending event, named `event-<id>.json`, in a directory
//! shared by the watcher and the orchestrator. An entry is written to a hidden
//! temporary file first and then hard-linked into place, so a reader never sees
//! a partial entry and an existing entry is never overwritten.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AutomationEvent, WireEvent};
use crate::domain::ports::EventQueue;

const ENTRY_PREFIX: &str = "event-";
const ENTRY_SUFFIX: &str = ".json";

/// Single-consumer queue over a directory of event files.
#[derive(Debug, Clone)]
pub struct FileEventQueue {
    dir: PathBuf,
}

impl FileEventQueue {
    /// Queue over `dir`; the directory is created on first `put`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries.
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for an event id.
    pub fn entry_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{ENTRY_PREFIX}{id}{ENTRY_SUFFIX}"))
    }

    /// Entry files currently present, sorted by file name.
    async fn entries(&self) -> DomainResult<Vec<(String, PathBuf)>> {
        let mut reader = match tokio::fs::read_dir(&self.dir).await {
            Ok(reader) => reader,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DomainError::queue_io(&self.dir, e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| DomainError::queue_io(&self.dir, e))?
        {
            let name = entry.file_name();
            let Some(id) = name
                .to_str()
                .and_then(|n| n.strip_prefix(ENTRY_PREFIX))
                .and_then(|n| n.strip_suffix(ENTRY_SUFFIX))
            else {
                continue;
            };
            entries.push((id.to_string(), entry.path()));
        }
        entries.sort();
        Ok(entries)
    }

    /// Decodable pending events, oldest first, without consuming them.
    pub async fn peek(&self) -> DomainResult<Vec<AutomationEvent>> {
        let mut events = Vec::new();
        for (_, path) in self.entries().await? {
            let Ok(body) = tokio::fs::read(&path).await else {
                continue;
            };
            if let Ok(event) = decode_entry(&path, &body) {
                events.push(event);
            }
        }
        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    async fn remove(&self, path: &Path) -> DomainResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::queue_io(path, e)),
        }
    }
}

/// Decode one entry body.
pub fn decode_entry(path: &Path, body: &[u8]) -> DomainResult<AutomationEvent> {
    let wire: WireEvent = serde_json::from_slice(body).map_err(|e| DomainError::MalformedEvent {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    AutomationEvent::try_from(wire).map_err(|e| DomainError::MalformedEvent {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl EventQueue for FileEventQueue {
    async fn put(&self, event: &AutomationEvent) -> DomainResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::queue_io(&self.dir, e))?;

        let id = event.id.to_string();
        let target = self.entry_path(&id);
        let tmp = self.dir.join(format!(".{ENTRY_PREFIX}{id}{ENTRY_SUFFIX}.tmp"));

        let body = serde_json::to_vec_pretty(&event.to_wire()?)?;
        tokio::fs::write(&tmp, body)
            .await
            .map_err(|e| DomainError::queue_io(&tmp, e))?;

        let linked = tokio::fs::hard_link(&tmp, &target).await;
        if let Err(e) = self.remove(&tmp).await {
            warn!(path = %tmp.display(), error = %e, "Failed to remove temporary queue file");
        }

        match linked {
            Ok(()) => {
                debug!(event_id = %id, kind = %event.kind, path = %target.display(), "Event enqueued");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(DomainError::QueueEntryExists(target)),
            Err(e) => Err(DomainError::queue_io(&target, e)),
        }
    }

    async fn drain(&self) -> DomainResult<Vec<AutomationEvent>> {
        // Only the listing may fail the drain; past this point entries are
        // being deleted and every per-entry failure is logged and skipped.
        let entries = self.entries().await?;
        let mut events = Vec::new();

        for (_, path) in entries {
            let decoded = match tokio::fs::read(&path).await {
                Ok(body) => decode_entry(&path, &body),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => Err(DomainError::queue_io(&path, e)),
            };

            match decoded {
                Ok(event) => {
                    if let Err(e) = self.remove(&path).await {
                        // Left in place; it is redelivered on the next drain.
                        error!(event_id = %event.id, path = %path.display(), error = %e, "Failed to consume queue entry");
                        continue;
                    }
                    events.push(event);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Dropping unreadable queue entry");
                    if let Err(e) = self.remove(&path).await {
                        error!(path = %path.display(), error = %e, "Failed to remove unreadable queue entry, skipping it");
                    }
                }
            }
        }

        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    async fn pending(&self) -> DomainResult<Vec<String>> {
        Ok(self.entries().await?.into_iter().map(|(id, _)| id).collect())
    }
}
