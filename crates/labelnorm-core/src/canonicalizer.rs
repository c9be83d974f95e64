//! Canonicalizer — groups equivalent label spellings and picks one per group
//!
//! Two labels are "the same label" when their canonical keys match: the key
//! keeps ASCII letters only and lowercases them, so `"My Label"`,
//! `"my-label"` and `"MYLABEL"` share the key `mylabel`.
//!
//! # Representative selection
//!
//! Within a group, raw spellings are scanned in the order they first appear
//! in the input sequence. A spelling replaces the running choice only when it
//! is strictly longer (in `char`s), so the first spelling to reach the
//! maximum length wins ties. The stored canonical value is the representative
//! with its ASCII letters lowercased. Non-ASCII characters are kept as
//! written: Unicode lowercasing can produce ASCII letters (U+212A KELVIN SIGN
//! becomes `k`), which would move the canonical label out of its own group.
//!
//! # Guarantees
//!
//! - **Convergent**: labels with equal keys map to the same canonical label
//! - **Lowercase**: every canonical label is the ASCII-lowercased form of a
//!   member, and has the same key as that member
//! - **Deterministic**: selection depends only on input order, never on
//!   container iteration order
//!
//! Labels without any ASCII letter all have the empty key and collapse into
//! a single group. That is preserved as-is and reported with a warning.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::{Error, Result};

// ── Canonical key ─────────────────────────────────────────

/// Letters-only, lowercased reduction of a label
///
/// Digits, punctuation, whitespace and non-ASCII characters are dropped.
pub fn canonical_key(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ── Mapping ───────────────────────────────────────────────

/// Raw label → canonical label, one entry per distinct raw label
///
/// Backed by a `BTreeMap` so iteration and serialized output are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: BTreeMap<String, String>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    /// Canonical label for `label`
    ///
    /// # Errors
    /// `UnmappedLabel` if the label was not part of the population the
    /// mapping was built from.
    pub fn canonical(&self, label: &str) -> Result<&str> {
        self.get(label).ok_or_else(|| Error::UnmappedLabel {
            label: label.to_string(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical label → every raw spelling that maps to it (sorted)
    pub fn groups(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (raw, canonical) in self.iter() {
            groups.entry(canonical).or_default().push(raw);
        }
        groups
    }

    /// Raw labels whose canonical form differs from their spelling
    pub fn renames(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(raw, canonical)| raw != canonical)
    }
}

// ── Canonicalize ──────────────────────────────────────────

struct Group<'a> {
    representative: &'a str,
    length: usize,
    spellings: usize,
}

/// Build the canonicalization mapping for a label population
///
/// `labels` is every label occurrence across the issues being processed.
/// Repeats are allowed; only the first occurrence of each distinct spelling
/// affects representative selection.
pub fn canonicalize<I, S>(labels: I) -> Mapping
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let labels: Vec<S> = labels.into_iter().collect();

    // First-occurrence order of distinct spellings
    let mut seen: HashSet<&str> = HashSet::new();
    let mut distinct: Vec<(&str, String)> = Vec::new();
    for label in &labels {
        let raw = label.as_ref();
        if seen.insert(raw) {
            distinct.push((raw, canonical_key(raw)));
        }
    }

    let mut groups: HashMap<&str, Group<'_>> = HashMap::new();
    for &(raw, ref key) in &distinct {
        let length = raw.chars().count();
        match groups.get_mut(key.as_str()) {
            Some(group) => {
                group.spellings += 1;
                if length > group.length {
                    group.representative = raw;
                    group.length = length;
                }
            }
            None => {
                groups.insert(
                    key.as_str(),
                    Group {
                        representative: raw,
                        length,
                        spellings: 1,
                    },
                );
            }
        }
    }

    if let Some(letterless) = groups.get("") {
        if letterless.spellings > 1 {
            tracing::warn!(
                spellings = letterless.spellings,
                representative = letterless.representative,
                "labels without letters collapse into one group"
            );
        }
    }

    let canonical: HashMap<&str, String> = groups
        .iter()
        .map(|(key, group)| (*key, group.representative.to_ascii_lowercase()))
        .collect();

    let mut entries = BTreeMap::new();
    for &(raw, ref key) in &distinct {
        // Every key in `distinct` was inserted into `groups` above.
        if let Some(target) = canonical.get(key.as_str()) {
            entries.insert(raw.to_string(), target.clone());
        }
    }

    tracing::debug!(
        distinct = entries.len(),
        groups = groups.len(),
        "built canonicalization mapping"
    );

    Mapping { entries }
}
