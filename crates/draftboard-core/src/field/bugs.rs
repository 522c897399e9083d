//! Bug identifier normalization.

use std::cmp::Ordering;

use super::split_references;

/// Normalizes a user supplied list of bug identifiers.
///
/// Entries are separated by commas, trimmed, stripped of a single leading
/// `#` and dropped when empty. Order is preserved.
pub fn sanitize_bug_ids(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .map(|entry| entry.strip_prefix('#').unwrap_or(entry))
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Returns the stored bug identifiers as a sorted list.
///
/// Identifiers sort numerically when they are all integers and
/// lexicographically otherwise.
pub fn bug_list(bugs_closed: &str) -> Vec<String> {
    let mut bugs: Vec<String> = split_references(bugs_closed)
        .map(str::to_owned)
        .collect();

    let numeric: Option<Vec<i64>> = bugs.iter().map(|bug| bug.parse().ok()).collect();
    match numeric {
        Some(_) => bugs.sort_by(|a, b| compare_numeric(a, b)),
        None => bugs.sort(),
    }

    bugs
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    let a: i64 = a.parse().unwrap_or_default();
    let b: i64 = b.parse().unwrap_or_default();
    a.cmp(&b)
}
