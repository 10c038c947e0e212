//! Version records, ordering and selection policies.
//!
//! Two independent policies pick the "latest" version of a candidate set:
//!
//! - [`SelectionPolicy::Published`]: the most recently published record,
//!   by registry timestamp.
//! - [`SelectionPolicy::Semantic`]: the highest version by component-wise
//!   numeric comparison of the dot-separated segments.
//!
//! In the semantic comparison each dot segment is parsed
//! as an integer and anything that fails to parse counts as `0`, so
//! `1.0.0-beta` and `1.0.0` compare equal (`"0-beta"` coerces to `0`).

use std::cmp::Ordering;

use chrono::DateTime;

use crate::maven::prerelease::is_pre_release;

/// Default number of entries in a version listing.
pub const DEFAULT_DEPTH: usize = 15;

/// Maximum number of entries in a version listing.
pub const MAX_DEPTH: usize = 100;

/// A single version returned by the registry search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Group identifier of the artifact.
    pub group_id: String,
    /// Artifact identifier.
    pub artifact_id: String,
    /// Version string exactly as published.
    pub version: String,
    /// Publish time in milliseconds since the Unix epoch.
    pub published_at: i64,
    /// Packaging type, if reported.
    pub packaging: Option<String>,
}

/// How to choose the latest version from a candidate set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Most recently published record wins.
    #[default]
    Published,
    /// Highest numeric version wins.
    Semantic,
}

impl SelectionPolicy {
    /// Parses the tool-facing policy name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "published" => Some(Self::Published),
            "semantic" => Some(Self::Semantic),
            _ => None,
        }
    }
}

/// Outcome of filtering and selecting from a candidate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    /// A result was selected.
    Found(T),
    /// The registry returned no candidates at all.
    NoCandidates,
    /// Candidates existed but all of them were pre-releases.
    NoStableReleases,
}

/// Compares two version strings component-wise by numeric value.
///
/// Components are compared as unbounded integers, so segments of any length
/// order correctly. A segment that is not all digits counts as zero.
#[must_use]
pub fn compare_semantic(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.split('.').map(numeric_component).collect();
    let right: Vec<&str> = b.split('.').map(numeric_component).collect();

    let len = left.len().max(right.len());
    (0..len)
        .map(|i| {
            let l = left.get(i).copied().unwrap_or("");
            let r = right.get(i).copied().unwrap_or("");
            compare_digits(l, r)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Digits of a segment without leading zeros; empty for zero or non-numeric.
fn numeric_component(segment: &str) -> &str {
    if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
        segment.trim_start_matches('0')
    } else {
        ""
    }
}

/// Orders normalised digit strings by length, then lexically.
fn compare_digits(a: &str, b: &str) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Sorts records newest first. The sort is stable, so records sharing a
/// timestamp keep their original order.
pub fn sort_by_published(records: &mut [VersionRecord]) {
    records.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

/// Returns the most recently published record.
#[must_use]
pub fn most_recently_published(records: &[VersionRecord]) -> Option<&VersionRecord> {
    records.iter().reduce(|best, candidate| {
        if candidate.published_at > best.published_at {
            candidate
        } else {
            best
        }
    })
}

/// Returns the record with the highest semantic version. On ties the
/// earliest record in the input wins.
#[must_use]
pub fn highest_semantic(records: &[VersionRecord]) -> Option<&VersionRecord> {
    records.iter().reduce(|best, candidate| {
        if compare_semantic(&candidate.version, &best.version).is_gt() {
            candidate
        } else {
            best
        }
    })
}

/// Drops pre-release records when requested, reporting which empty state
/// applies if nothing is left.
fn filter_candidates(
    records: Vec<VersionRecord>,
    exclude_pre_releases: bool,
) -> Selection<Vec<VersionRecord>> {
    if records.is_empty() {
        return Selection::NoCandidates;
    }
    if !exclude_pre_releases {
        return Selection::Found(records);
    }

    let stable: Vec<_> = records
        .into_iter()
        .filter(|r| !is_pre_release(&r.version))
        .collect();

    if stable.is_empty() {
        Selection::NoStableReleases
    } else {
        Selection::Found(stable)
    }
}

/// Selects the latest version under the given policy.
#[must_use]
pub fn select_latest(
    records: Vec<VersionRecord>,
    policy: SelectionPolicy,
    exclude_pre_releases: bool,
) -> Selection<VersionRecord> {
    let candidates = match filter_candidates(records, exclude_pre_releases) {
        Selection::Found(candidates) => candidates,
        Selection::NoCandidates => return Selection::NoCandidates,
        Selection::NoStableReleases => return Selection::NoStableReleases,
    };

    let selected = match policy {
        SelectionPolicy::Published => most_recently_published(&candidates),
        SelectionPolicy::Semantic => highest_semantic(&candidates),
    };

    selected
        .cloned()
        .map_or(Selection::NoCandidates, Selection::Found)
}

/// Builds the ranked listing: newest first, at most `depth` lines of
/// `"<version> (<yyyy-mm-dd>)"`.
#[must_use]
pub fn ranked_listing(
    records: Vec<VersionRecord>,
    depth: usize,
    exclude_pre_releases: bool,
) -> Selection<Vec<String>> {
    let mut candidates = match filter_candidates(records, exclude_pre_releases) {
        Selection::Found(candidates) => candidates,
        Selection::NoCandidates => return Selection::NoCandidates,
        Selection::NoStableReleases => return Selection::NoStableReleases,
    };

    sort_by_published(&mut candidates);

    Selection::Found(
        candidates
            .iter()
            .take(depth)
            .map(format_listing_entry)
            .collect(),
    )
}

/// Formats one listing line.
#[must_use]
pub fn format_listing_entry(record: &VersionRecord) -> String {
    format!("{} ({})", record.version, format_date(record.published_at))
}

/// Formats an epoch-millisecond timestamp as a UTC `yyyy-mm-dd` date.
#[must_use]
pub fn format_date(epoch_millis: i64) -> String {
    DateTime::from_timestamp_millis(epoch_millis).map_or_else(
        || "unknown date".to_string(),
        |dt| dt.format("%Y-%m-%d").to_string(),
    )
}
