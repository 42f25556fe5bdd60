//! Git CLI adapter for the `SourceRepository` port.

pub mod parse;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{instrument, trace};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::CommitInfo;
use crate::domain::ports::SourceRepository;

use parse::{parse_branch_refs, parse_commit_header, parse_hash_list, parse_numstat, COMMIT_FORMAT};

/// Reads repository state by shelling out to `git`.
///
/// Every query runs in the repository directory; a non-zero exit or a missing
/// `git` binary becomes `DomainError::TransientSource`.
#[derive(Debug, Clone)]
pub struct GitCliRepository {
    path: PathBuf,
}

impl GitCliRepository {
    /// Repository rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Working tree the commands run in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn git(&self, operation: &str, args: &[&str]) -> DomainResult<String> {
        trace!(operation, ?args, "Running git");
        let output = Command::new("git")
            .current_dir(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DomainError::transient(operation, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::transient(
                operation,
                format!("git exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl SourceRepository for GitCliRepository {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    async fn head(&self) -> DomainResult<String> {
        Ok(self.git("head", &["rev-parse", "HEAD"]).await?.trim().to_string())
    }

    async fn current_branch(&self) -> DomainResult<String> {
        Ok(self
            .git("current_branch", &["rev-parse", "--abbrev-ref", "HEAD"])
            .await?
            .trim()
            .to_string())
    }

    async fn branches(&self) -> DomainResult<BTreeSet<String>> {
        let output = self
            .git(
                "branches",
                &["for-each-ref", "--format=%(refname)", "refs/heads", "refs/remotes"],
            )
            .await?;
        Ok(parse_branch_refs(&output))
    }

    async fn commit_range(&self, from: &str, to: &str) -> DomainResult<Vec<String>> {
        let range = format!("{from}..{to}");
        let output = self
            .git("commit_range", &["rev-list", "--reverse", &range])
            .await?;
        Ok(parse_hash_list(&output))
    }

    #[instrument(skip(self), level = "debug")]
    async fn commit_info(&self, hash: &str) -> DomainResult<CommitInfo> {
        let header = self
            .git("commit_info", &["show", "-s", COMMIT_FORMAT, hash])
            .await?;
        let mut info = parse_commit_header(&header).ok_or_else(|| {
            DomainError::transient("commit_info", format!("unparseable header for {hash}"))
        })?;

        let numstat = self
            .git(
                "commit_numstat",
                &["diff-tree", "--no-commit-id", "--numstat", "-r", "--root", hash],
            )
            .await?;
        let (files, stats) = parse_numstat(&numstat);
        info.files_changed = files;
        info.diff_stats = stats;

        Ok(info)
    }
}
