//! Issue tracker collaborators — where issues come from and where updates go
//!
//! The core never talks to a tracker directly. It reads a snapshot through
//! [`IssueSource`] and hands one [`LabelUpdate`] per changed issue to an
//! [`IssueSink`]. Each update is self-contained, so a sink may apply them in
//! any order and a caller may retry any single one.
//!
//! Two implementations ship here:
//!
//! - [`MemoryTracker`] — in-memory issues with optional injected failures
//! - [`SnapshotTracker`] — a JSON snapshot file read once and written back

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;
use crate::{Error, Result};

/// Default cap on issues fetched per run
pub const DEFAULT_MAX_ISSUES: usize = 50;

// ── Core Types ────────────────────────────────────────────

/// A tracked work item and its current raw labels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(default)]
    pub labels: Vec<String>,
}

impl Issue {
    pub fn new<I, S>(id: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }
}

/// Replacement label set for one issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelUpdate {
    pub issue_id: String,
    pub labels: BTreeSet<String>,
}

// ── Collaborator traits ───────────────────────────────────

/// Read-only snapshot of a project's issues
pub trait IssueSource {
    /// Fetch at most `max_issues` issues belonging to `project`
    fn fetch_issues(&self, project: &str, max_issues: usize) -> Result<Vec<Issue>>;
}

/// Accepts replacement label sets
pub trait IssueSink {
    /// Replace the labels of `update.issue_id` with `update.labels`
    fn apply_update(&mut self, update: &LabelUpdate) -> Result<()>;
}

// ── MemoryTracker ─────────────────────────────────────────

#[derive(Debug, Clone)]
struct TrackedIssue {
    project: String,
    issue: Issue,
}

/// In-memory tracker
///
/// Issues registered with [`MemoryTracker::fail_on`] reject every update,
/// which lets callers exercise per-issue failure handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryTracker {
    issues: Vec<TrackedIssue>,
    failing: HashSet<String>,
    applied: Vec<LabelUpdate>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_issue(mut self, project: impl Into<String>, issue: Issue) -> Self {
        self.issues.push(TrackedIssue {
            project: project.into(),
            issue,
        });
        self
    }

    pub fn fail_on(mut self, issue_id: impl Into<String>) -> Self {
        self.failing.insert(issue_id.into());
        self
    }

    pub fn issue(&self, issue_id: &str) -> Option<&Issue> {
        self.issues
            .iter()
            .map(|t| &t.issue)
            .find(|issue| issue.id == issue_id)
    }

    /// Updates accepted so far, in the order they were applied
    pub fn applied(&self) -> &[LabelUpdate] {
        &self.applied
    }
}

impl IssueSource for MemoryTracker {
    fn fetch_issues(&self, project: &str, max_issues: usize) -> Result<Vec<Issue>> {
        Ok(self
            .issues
            .iter()
            .filter(|t| t.project == project)
            .take(max_issues)
            .map(|t| t.issue.clone())
            .collect())
    }
}

impl IssueSink for MemoryTracker {
    fn apply_update(&mut self, update: &LabelUpdate) -> Result<()> {
        if self.failing.contains(&update.issue_id) {
            return Err(Error::Tracker(format!(
                "update rejected for {}",
                update.issue_id
            )));
        }
        let tracked = self
            .issues
            .iter_mut()
            .find(|t| t.issue.id == update.issue_id)
            .ok_or_else(|| Error::IssueNotFound(update.issue_id.clone()))?;
        tracked.issue.labels = update.labels.iter().cloned().collect();
        self.applied.push(update.clone());
        Ok(())
    }
}

// ── SnapshotTracker ───────────────────────────────────────

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub issues: Vec<SnapshotIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotIssue {
    pub id: String,
    pub project: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// Tracker backed by a JSON snapshot file
///
/// Updates are held in memory until [`SnapshotTracker::save`] writes the
/// snapshot back to the file it was opened from.
#[derive(Debug)]
pub struct SnapshotTracker {
    path: PathBuf,
    snapshot: Snapshot,
    credentials: Option<Credentials>,
    dirty: bool,
}

impl SnapshotTracker {
    /// Load a snapshot file
    ///
    /// # Errors
    /// `Io` if the file cannot be read, `Snapshot` if it is not valid JSON
    /// in the snapshot layout.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path)?;
        let snapshot: Snapshot = serde_json::from_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            issues = snapshot.issues.len(),
            "loaded snapshot"
        );
        Ok(Self {
            path,
            snapshot,
            credentials: None,
            dirty: false,
        })
    }

    /// Stamp every updated issue with the credential's username
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Whether any update has been applied since open or the last save
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the snapshot back to its file
    pub fn save(&mut self) -> Result<()> {
        let mut text = serde_json::to_string_pretty(&self.snapshot)?;
        text.push('\n');
        std::fs::write(&self.path, text)?;
        self.dirty = false;
        tracing::debug!(path = %self.path.display(), "saved snapshot");
        Ok(())
    }
}

impl IssueSource for SnapshotTracker {
    fn fetch_issues(&self, project: &str, max_issues: usize) -> Result<Vec<Issue>> {
        Ok(self
            .snapshot
            .issues
            .iter()
            .filter(|i| i.project == project)
            .take(max_issues)
            .map(|i| Issue {
                id: i.id.clone(),
                labels: i.labels.clone(),
            })
            .collect())
    }
}

impl IssueSink for SnapshotTracker {
    fn apply_update(&mut self, update: &LabelUpdate) -> Result<()> {
        let entry = self
            .snapshot
            .issues
            .iter_mut()
            .find(|i| i.id == update.issue_id)
            .ok_or_else(|| Error::IssueNotFound(update.issue_id.clone()))?;
        entry.labels = update.labels.iter().cloned().collect();
        if let Some(ref credentials) = self.credentials {
            entry.updated_by = Some(credentials.username.clone());
        }
        self.dirty = true;
        Ok(())
    }
}
