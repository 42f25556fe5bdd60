//! Read-only port onto the watched repository.

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::CommitInfo;

/// Repository port for reading source-control state
///
/// Every method may fail with `DomainError::TransientSource`; callers treat
/// such failures as "no new data" and try again on the next poll.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    /// Human-readable location of the repository (stamped into event payloads)
    fn location(&self) -> String;

    /// Hash of the current head commit
    async fn head(&self) -> DomainResult<String>;

    /// Name of the currently checked-out branch
    async fn current_branch(&self) -> DomainResult<String>;

    /// All branch names, local and remote
    async fn branches(&self) -> DomainResult<BTreeSet<String>>;

    /// Commits reachable from `to` but not from `from`, oldest first
    async fn commit_range(&self, from: &str, to: &str) -> DomainResult<Vec<String>>;

    /// Metadata, changed files and line counts of one commit
    async fn commit_info(&self, hash: &str) -> DomainResult<CommitInfo>;
}
