//! Parsers for git plumbing output.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::models::{CommitInfo, DiffStat};

/// Field separator used in `git show --format`.
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// `show -s` format producing hash, author, email, subject and body.
pub const COMMIT_FORMAT: &str = "--format=%H%x1f%an%x1f%ae%x1f%s%x1f%b";

/// Branch names from `for-each-ref --format=%(refname)` output.
///
/// Local branches lose their `refs/heads/` prefix, remote branches keep the
/// remote name (`origin/main`). Symbolic remote heads are skipped.
pub fn parse_branch_refs(output: &str) -> BTreeSet<String> {
    output
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if let Some(local) = line.strip_prefix("refs/heads/") {
                return Some(local.to_string());
            }
            let remote = line.strip_prefix("refs/remotes/")?;
            if remote.ends_with("/HEAD") {
                return None;
            }
            Some(remote.to_string())
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Commit hashes, one per line.
pub fn parse_hash_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Header fields of a commit from [`COMMIT_FORMAT`] output.
///
/// Returns `None` if fewer than four fields are present.
pub fn parse_commit_header(output: &str) -> Option<CommitInfo> {
    let mut fields = output.splitn(5, FIELD_SEPARATOR);
    let hash = fields.next()?.trim().to_string();
    let author = fields.next()?.to_string();
    let author_email = fields.next()?.to_string();
    let subject = fields.next()?.to_string();
    let body = fields.next().unwrap_or_default().trim_end().to_string();

    if hash.is_empty() {
        return None;
    }

    Some(CommitInfo {
        hash,
        author,
        author_email,
        subject,
        body,
        ..Default::default()
    })
}

/// Changed paths and line counts from `--numstat` output, in output order.
///
/// Binary files report `-` for both counts and are recorded as zero.
pub fn parse_numstat(output: &str) -> (Vec<String>, BTreeMap<String, DiffStat>) {
    let mut files = Vec::new();
    let mut stats = BTreeMap::new();

    for line in output.lines() {
        let mut parts = line.splitn(3, '\t');
        let (Some(added), Some(deleted), Some(path)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        if path.is_empty() {
            continue;
        }

        let count = |raw: &str| raw.trim().parse::<u64>().unwrap_or(0);
        let stat = DiffStat {
            additions: count(added),
            deletions: count(deleted),
        };
        if stats.insert(path.to_string(), stat).is_none() {
            files.push(path.to_string());
        }
    }

    (files, stats)
}
