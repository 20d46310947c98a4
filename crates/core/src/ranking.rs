//! Relevance ordering of canonical food records.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::food::FoodItem;

/// Upper bound on results surfaced for one search.
pub const RESULT_CAP: usize = 50;

/// Relevance tier of a name against a lower-cased query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Exact,
    Prefix,
    Other,
}

fn tier(name_lower: &str, query_lower: &str) -> Tier {
    if name_lower == query_lower {
        Tier::Exact
    } else if name_lower.starts_with(query_lower) {
        Tier::Prefix
    } else {
        Tier::Other
    }
}

/// Order items against a query and truncate to [`RESULT_CAP`].
///
/// Exact (case-insensitive) name matches come first, then names starting
/// with the query, then everything else; each tier is alphabetical by
/// lower-cased name. The sort is stable, so equal names keep input order.
pub fn rank(items: Vec<FoodItem>, query: &str) -> Vec<FoodItem> {
    rank_with_cap(items, query, RESULT_CAP)
}

/// Like [`rank`] with a caller-chosen cap (never above [`RESULT_CAP`]).
pub fn rank_with_cap(items: Vec<FoodItem>, query: &str, cap: usize) -> Vec<FoodItem> {
    let query_lower = query.trim().to_lowercase();

    let mut keyed: Vec<(Tier, String, FoodItem)> = items
        .into_iter()
        .map(|item| {
            let name_lower = item.name.to_lowercase();
            (tier(&name_lower, &query_lower), name_lower, item)
        })
        .collect();

    keyed.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    keyed
        .into_iter()
        .take(cap.min(RESULT_CAP))
        .map(|(_, _, item)| item)
        .collect()
}

/// Drop items whose id was already seen; the first occurrence wins.
pub fn dedup_by_id(items: Vec<FoodItem>) -> Vec<FoodItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}
