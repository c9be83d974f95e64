//! Project sync — fetch, canonicalize, plan, apply
//!
//! # Pipeline
//!
//! `IssueSource → extract_labels → canonicalize → plan → IssueSink`
//!
//! Issues are fetched exactly once. Each planned [`LabelUpdate`] is applied
//! on its own: a failed update is recorded in the report and the remaining
//! updates still go out. Failed updates keep their full request so a caller
//! can retry them without recomputing the mapping.

use serde::Serialize;

use crate::canonicalizer::{canonicalize, Mapping};
use crate::rewriter::plan;
use crate::tracker::{Issue, IssueSink, IssueSource, LabelUpdate, DEFAULT_MAX_ISSUES};
use crate::Result;

// ── Options & reports ─────────────────────────────────────

/// What to sync and whether to write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    pub project: String,
    pub max_issues: usize,
    pub dry_run: bool,
}

impl SyncOptions {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            max_issues: DEFAULT_MAX_ISSUES,
            dry_run: false,
        }
    }

    pub fn max_issues(mut self, max_issues: usize) -> Self {
        self.max_issues = max_issues;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Mapping and updates computed for a project, before anything is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncPlan {
    pub project: String,
    pub issues_scanned: usize,
    pub mapping: Mapping,
    pub updates: Vec<LabelUpdate>,
}

/// An update the sink rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedUpdate {
    pub update: LabelUpdate,
    pub error: String,
}

/// Outcome of a sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub project: String,
    pub issues_scanned: usize,
    pub mapping: Mapping,
    pub planned: usize,
    pub dry_run: bool,
    pub applied: Vec<String>,
    pub failed: Vec<FailedUpdate>,
}

impl SyncReport {
    /// True when every planned update was applied (or none were attempted)
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ── Pipeline ──────────────────────────────────────────────

/// Every label occurrence across `issues`, in issue order
pub fn extract_labels(issues: &[Issue]) -> Vec<&str> {
    issues
        .iter()
        .flat_map(|issue| issue.labels.iter().map(String::as_str))
        .collect()
}

/// Fetch a project's issues and compute the updates they need
///
/// # Errors
/// Propagates source failures. An `UnmappedLabel` here would mean the
/// mapping and the issues disagree, which cannot happen when both come from
/// the same fetch.
pub fn plan_project<S>(source: &S, options: &SyncOptions) -> Result<SyncPlan>
where
    S: IssueSource + ?Sized,
{
    let issues = source.fetch_issues(&options.project, options.max_issues)?;
    let mapping = canonicalize(extract_labels(&issues));
    let updates = plan(&issues, &mapping)?;
    tracing::info!(
        project = %options.project,
        issues = issues.len(),
        labels = mapping.len(),
        updates = updates.len(),
        "planned label updates"
    );
    Ok(SyncPlan {
        project: options.project.clone(),
        issues_scanned: issues.len(),
        mapping,
        updates,
    })
}

/// Apply each planned update independently
pub fn apply_plan<K>(sink: &mut K, plan: SyncPlan, dry_run: bool) -> SyncReport
where
    K: IssueSink + ?Sized,
{
    let mut applied = Vec::new();
    let mut failed = Vec::new();

    if !dry_run {
        for update in &plan.updates {
            match sink.apply_update(update) {
                Ok(()) => {
                    tracing::debug!(issue = %update.issue_id, "applied label update");
                    applied.push(update.issue_id.clone());
                }
                Err(e) => {
                    tracing::warn!(issue = %update.issue_id, error = %e, "label update failed");
                    failed.push(FailedUpdate {
                        update: update.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    SyncReport {
        project: plan.project,
        issues_scanned: plan.issues_scanned,
        mapping: plan.mapping,
        planned: plan.updates.len(),
        dry_run,
        applied,
        failed,
    }
}

/// Plan and apply against a tracker that is both source and sink
pub fn sync<T>(tracker: &mut T, options: &SyncOptions) -> Result<SyncReport>
where
    T: IssueSource + IssueSink + ?Sized,
{
    let plan = plan_project(&*tracker, options)?;
    let report = apply_plan(tracker, plan, options.dry_run);
    tracing::info!(
        project = %report.project,
        applied = report.applied.len(),
        failed = report.failed.len(),
        dry_run = report.dry_run,
        "sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MemoryTracker;

    fn tracker() -> MemoryTracker {
        MemoryTracker::new()
            .with_issue("WEB", Issue::new("WEB-1", ["My-Label", "Bug"]))
            .with_issue("WEB", Issue::new("WEB-2", ["mylabel", "bug"]))
            .with_issue("WEB", Issue::new("WEB-3", ["bug"]))
            .with_issue("WEB", Issue::new("WEB-4", ["MY LABEL", "BUG", "Bug"]))
            .with_issue("API", Issue::new("API-1", ["Bug"]))
    }

    #[test]
    fn test_extract_labels_keeps_order_and_repeats() {
        let issues = vec![
            Issue::new("A-1", ["b", "a"]),
            Issue::new("A-2", Vec::<String>::new()),
            Issue::new("A-3", ["a"]),
        ];
        assert_eq!(extract_labels(&issues), vec!["b", "a", "a"]);
    }

    #[test]
    fn test_plan_project() {
        let plan = plan_project(&tracker(), &SyncOptions::new("WEB")).unwrap();
        assert_eq!(plan.issues_scanned, 4);
        assert_eq!(plan.mapping.get("MY LABEL"), Some("my-label"));
        assert_eq!(plan.mapping.get("BUG"), Some("bug"));
        assert_eq!(plan.mapping.get("Bug"), Some("bug"));
        let ids: Vec<_> = plan.updates.iter().map(|u| u.issue_id.as_str()).collect();
        assert_eq!(ids, vec!["WEB-1", "WEB-2", "WEB-4"]);
    }

    #[test]
    fn test_sync_applies_updates() {
        let mut tracker = tracker();
        let report = sync(&mut tracker, &SyncOptions::new("WEB")).unwrap();
        assert!(report.is_success());
        assert_eq!(report.planned, 3);
        assert_eq!(report.applied, vec!["WEB-1", "WEB-2", "WEB-4"]);
        assert_eq!(
            tracker.issue("WEB-4").unwrap().labels,
            vec!["bug", "my-label"]
        );
        // Other projects are untouched
        assert_eq!(tracker.issue("API-1").unwrap().labels, vec!["Bug"]);
    }

    #[test]
    fn test_sync_is_idempotent() {
        let mut tracker = tracker();
        sync(&mut tracker, &SyncOptions::new("WEB")).unwrap();
        let second = sync(&mut tracker, &SyncOptions::new("WEB")).unwrap();
        assert_eq!(second.planned, 0);
        assert!(second.applied.is_empty());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let mut tracker = tracker();
        let report = sync(&mut tracker, &SyncOptions::new("WEB").dry_run(true)).unwrap();
        assert_eq!(report.planned, 3);
        assert!(report.applied.is_empty());
        assert!(tracker.applied().is_empty());
    }

    #[test]
    fn test_one_failure_does_not_abort_the_rest() {
        let mut tracker = tracker().fail_on("WEB-2");
        let report = sync(&mut tracker, &SyncOptions::new("WEB")).unwrap();
        assert!(!report.is_success());
        assert_eq!(report.applied, vec!["WEB-1", "WEB-4"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].update.issue_id, "WEB-2");
        assert!(report.failed[0].error.contains("WEB-2"));
    }

    #[test]
    fn test_failed_update_retries_independently() {
        let mut failing = tracker().fail_on("WEB-2");
        let report = sync(&mut failing, &SyncOptions::new("WEB")).unwrap();

        let mut healthy = tracker();
        for failure in &report.failed {
            healthy.apply_update(&failure.update).unwrap();
        }
        assert_eq!(
            healthy.issue("WEB-2").unwrap().labels,
            vec!["bug", "my-label"]
        );
    }

    #[test]
    fn test_max_issues_limits_population() {
        let plan = plan_project(&tracker(), &SyncOptions::new("WEB").max_issues(1)).unwrap();
        assert_eq!(plan.issues_scanned, 1);
        // Only WEB-1's labels are seen; both are already distinct groups
        assert_eq!(plan.mapping.len(), 2);
        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].labels.len(), 2);
    }

    #[test]
    fn test_empty_project() {
        let mut tracker = MemoryTracker::new();
        let report = sync(&mut tracker, &SyncOptions::new("NONE")).unwrap();
        assert_eq!(report.issues_scanned, 0);
        assert!(report.mapping.is_empty());
        assert_eq!(report.planned, 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_report_serializes() {
        let mut tracker = tracker().fail_on("WEB-1");
        let report = sync(&mut tracker, &SyncOptions::new("WEB")).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["project"], "WEB");
        assert_eq!(json["planned"], 3);
        assert_eq!(json["mapping"]["mylabel"], "my-label");
        assert_eq!(json["failed"][0]["update"]["issue_id"], "WEB-1");
    }
}
