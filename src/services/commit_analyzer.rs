//! Commit classification heuristics.
//!
//! Scores a commit's complexity, picks its priority from the subject line and
//! suggests pattern tags. Everything here is a pure function of the commit.

use std::collections::BTreeSet;
use std::path::Path;

use crate::domain::models::{CommitInfo, Priority};

const CRITICAL_KEYWORDS: &[&str] = &["fix", "bug", "critical", "urgent"];
const HIGH_KEYWORDS: &[&str] = &["feat", "feature", "refactor"];
const FEATURE_KEYWORDS: &[&str] = &["feat", "feature", "add"];

/// Commits touching more files than this are at least `High` priority.
pub const LARGE_COMMIT_FILE_COUNT: usize = 10;

/// Priority of a commit from its subject line and size.
///
/// Keyword tiers are checked case-insensitively before the file-count rule.
pub fn commit_priority(subject: &str, file_count: usize) -> Priority {
    let subject = subject.to_lowercase();

    if contains_any(&subject, CRITICAL_KEYWORDS) {
        return Priority::Critical;
    }
    if contains_any(&subject, HIGH_KEYWORDS) {
        return Priority::High;
    }
    if file_count > LARGE_COMMIT_FILE_COUNT {
        return Priority::High;
    }
    Priority::Medium
}

/// Per-factor contributions to a complexity score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComplexityBreakdown {
    /// `min(files * 2, 30)`
    pub files: f64,
    /// `min(churn / 10, 30)`
    pub churn: f64,
    /// `min(extensions * 5, 20)`
    pub extensions: f64,
    /// `min(directories * 3, 20)`
    pub directories: f64,
}

impl ComplexityBreakdown {
    /// Build the breakdown from raw counts.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(files: usize, churn: u64, extensions: usize, directories: usize) -> Self {
        Self {
            files: (files as f64 * 2.0).min(30.0),
            churn: (churn as f64 / 10.0).min(30.0),
            extensions: (extensions as f64 * 5.0).min(20.0),
            directories: (directories as f64 * 3.0).min(20.0),
        }
    }

    /// Sum of the factors, clamped to 100.
    pub fn total(&self) -> f64 {
        (self.files + self.churn + self.extensions + self.directories).min(100.0)
    }
}

/// Factor breakdown of a commit's complexity.
pub fn complexity_breakdown(commit: &CommitInfo) -> ComplexityBreakdown {
    ComplexityBreakdown::from_counts(
        commit.file_count(),
        commit.total_churn(),
        distinct_extensions(&commit.files_changed).len(),
        distinct_directories(&commit.files_changed).len(),
    )
}

/// Complexity score of a commit, 0 to 100.
pub fn complexity_score(commit: &CommitInfo) -> f64 {
    complexity_breakdown(commit).total()
}

/// Pattern tags suggested by a commit's paths and subject.
///
/// Checks are independent; the result follows check order.
pub fn detect_patterns(commit: &CommitInfo) -> Vec<String> {
    let subject = commit.subject.to_lowercase();
    let files = &commit.files_changed;
    let mut patterns = Vec::new();

    if files.iter().any(|f| f.contains("test")) {
        patterns.push("test-pattern".to_string());
    }
    if files.iter().any(|f| f.ends_with(".md")) {
        patterns.push("documentation-pattern".to_string());
    }
    if subject.contains("refactor") {
        patterns.push("refactoring-pattern".to_string());
    }
    if contains_any(&subject, FEATURE_KEYWORDS) {
        patterns.push("feature-pattern".to_string());
    }

    patterns
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

/// Distinct file extensions, taken from the final path component.
///
/// A dotfile such as `.gitignore` counts its name after the dot.
fn distinct_extensions(files: &[String]) -> BTreeSet<String> {
    files
        .iter()
        .filter_map(|f| {
            let name = Path::new(f).file_name()?.to_str()?;
            name.rsplit_once('.').map(|(_, ext)| ext.to_string())
        })
        .collect()
}

/// Distinct parent directories; top-level files share the empty directory.
fn distinct_directories(files: &[String]) -> BTreeSet<String> {
    files
        .iter()
        .map(|f| {
            Path::new(f)
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}
