//! Deduplication and relevance ranking of a bucket.

use std::cmp::Reverse;
use std::collections::HashSet;

use super::types::RepositoryRecord;

/// Collapse records to one per `full_name`, most relevant first.
///
/// Records are ordered by stars then `updated_at`, both descending. The sort
/// is stable, so ties keep their insertion order and the first occurrence of
/// a `full_name` in that order wins. The input is left untouched.
pub fn dedupe(records: &[RepositoryRecord]) -> Vec<RepositoryRecord> {
    let mut ranked: Vec<&RepositoryRecord> = records.iter().collect();
    ranked.sort_by_key(|r| Reverse((r.stars, r.updated_at)));

    let mut seen: HashSet<&str> = HashSet::with_capacity(ranked.len());
    ranked
        .into_iter()
        .filter(|r| seen.insert(r.full_name.as_str()))
        .cloned()
        .collect()
}
