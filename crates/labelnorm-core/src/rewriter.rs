//! Issue label rewriter — applies a mapping to one issue's labels
//!
//! `rewrite` maps every raw label through the canonicalization mapping and
//! collapses duplicates. `needs_update` decides whether the result is worth
//! writing, and `plan` turns a batch of issues into the minimal list of
//! [`LabelUpdate`]s.

use std::collections::BTreeSet;

use crate::canonicalizer::Mapping;
use crate::tracker::{Issue, LabelUpdate};
use crate::Result;

/// Desired label set for an issue
///
/// # Errors
/// `UnmappedLabel` if any label is missing from `mapping`. That means the
/// mapping was built from a population that did not include this issue, and
/// the run must stop rather than drop the label.
pub fn rewrite<I, S>(issue_labels: I, mapping: &Mapping) -> Result<BTreeSet<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    issue_labels
        .into_iter()
        .map(|label| mapping.canonical(label.as_ref()).map(str::to_string))
        .collect()
}

/// Whether `desired` differs from `current` as a set of labels
pub fn needs_update<S: AsRef<str>>(current: &[S], desired: &BTreeSet<String>) -> bool {
    let current: BTreeSet<&str> = current.iter().map(|s| s.as_ref()).collect();
    !current.iter().copied().eq(desired.iter().map(String::as_str))
}

/// Updates for every issue whose canonical label set differs from its own
pub fn plan(issues: &[Issue], mapping: &Mapping) -> Result<Vec<LabelUpdate>> {
    let mut updates = Vec::new();
    for issue in issues {
        let desired = rewrite(&issue.labels, mapping)?;
        if needs_update(&issue.labels, &desired) {
            tracing::debug!(issue = %issue.id, from = ?issue.labels, to = ?desired, "labels change");
            updates.push(LabelUpdate {
                issue_id: issue.id.clone(),
                labels: desired,
            });
        }
    }
    Ok(updates)
}
