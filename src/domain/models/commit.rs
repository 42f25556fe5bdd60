//! Commit metadata as read from the repository.
//!
//! `CommitInfo` only lives inside the watcher: it is scored, classified and
//! turned into a `new_commit` event, then dropped.

use std::collections::BTreeMap;

use super::event::DiffStat;

/// Everything the watcher needs to know about one commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    pub hash: String,
    pub author: String,
    pub author_email: String,
    pub subject: String,
    pub body: String,
    /// Paths touched by the commit, in the order git reports them.
    pub files_changed: Vec<String>,
    /// Per-file line counts. Binary files count as zero.
    pub diff_stats: BTreeMap<String, DiffStat>,
}

impl CommitInfo {
    /// Number of changed files.
    pub fn file_count(&self) -> usize {
        self.files_changed.len()
    }

    /// Added plus deleted lines across all files.
    pub fn total_churn(&self) -> u64 {
        self.diff_stats.values().map(DiffStat::total).sum()
    }

    /// First eight characters of the hash.
    pub fn short_hash(&self) -> &str {
        short_hash(&self.hash)
    }
}

/// Abbreviate a commit hash to eight characters.
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}
