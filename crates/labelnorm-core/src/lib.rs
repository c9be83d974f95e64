//! labelnorm core — canonical spellings for issue-tracker labels
//!
//! Given every label used across a project's issues, labels that are the
//! same word modulo case, punctuation and whitespace are grouped, one
//! lowercase spelling is chosen per group, and each issue's label set is
//! rewritten to canonical spellings with duplicates collapsed.
//!
//! # Architecture
//!
//! ```text
//! IssueSource → labels → Canonicalizer → Mapping
//!                                          ↓
//!                   Issue labels → Rewriter → LabelUpdate → IssueSink
//! ```
//!
//! # Guarantees
//!
//! - **Pure core**: `canonicalize` and `rewrite` do no I/O
//! - **Deterministic**: same label sequence always produces the same mapping
//! - **Independent updates**: each issue's update can be applied or retried
//!   on its own

pub mod canonicalizer;
pub mod credentials;
pub mod error;
pub mod rewriter;
pub mod sync;
pub mod tracker;

pub use canonicalizer::{canonical_key, canonicalize, Mapping};
pub use credentials::{AuthFile, CredentialSource, Credentials};
pub use error::{Error, Result};
pub use rewriter::{needs_update, plan, rewrite};
pub use sync::{apply_plan, extract_labels, plan_project, sync, SyncOptions, SyncPlan, SyncReport};
pub use tracker::{Issue, IssueSink, IssueSource, LabelUpdate, MemoryTracker, SnapshotTracker};

/// labelnorm-core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_semver() {
        assert_eq!(VERSION.split('.').count(), 3);
        assert!(VERSION
            .split('.')
            .all(|part| part.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_end_to_end_example_labels() {
        let issues = vec![
            Issue::new("P-1", ["My-Label"]),
            Issue::new("P-2", ["mylabel"]),
            Issue::new("P-3", ["MY LABEL"]),
        ];
        let mapping = canonicalize(extract_labels(&issues));
        for issue in &issues {
            let desired = rewrite(&issue.labels, &mapping).unwrap();
            assert_eq!(desired.into_iter().collect::<Vec<_>>(), vec!["my-label"]);
        }
    }

    #[test]
    fn test_determinism_100_iterations() {
        let tracker = MemoryTracker::new()
            .with_issue("P", Issue::new("P-1", ["Needs Triage", "p1"]))
            .with_issue("P", Issue::new("P-2", ["needs-triage", "P-1"]))
            .with_issue("P", Issue::new("P-3", ["NEEDSTRIAGE", "P1"]));
        let options = SyncOptions::new("P");
        let first = plan_project(&tracker, &options).unwrap();
        for i in 0..100 {
            let result = plan_project(&tracker, &options).unwrap();
            assert_eq!(first, result, "Non-determinism at iteration {}", i);
        }
    }
}
