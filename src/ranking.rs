//! Ranked lists: the ordered output form of every scoring query.
//!
//! Order is value descending, ties broken by key ascending, so the ranking is
//! a total function of the scored bag. Top-k selection partitions with
//! `select_nth_unstable_by` before sorting the kept prefix; with a total
//! comparator the prefix is identical to the prefix of the full sort.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::bag::SparseBag;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RankedList {
    entries: Vec<(String, f64)>,
}

/// Ranking comparator: value descending, then key ascending.
#[inline]
pub fn rank_order(a: &(String, f64), b: &(String, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

impl RankedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ranks the whole bag.
    pub fn from_bag(bag: SparseBag) -> Self {
        Self::top_k(bag, None)
    }

    /// Ranks the bag and keeps at most `k` entries (`None` keeps all).
    pub fn top_k(bag: SparseBag, k: Option<usize>) -> Self {
        let mut entries: Vec<(String, f64)> = bag.into_iter().collect();
        match k {
            Some(0) => entries.clear(),
            Some(k) if k < entries.len() => {
                entries.select_nth_unstable_by(k - 1, rank_order);
                entries.truncate(k);
                entries.sort_unstable_by(rank_order);
            }
            _ => entries.sort_unstable_by(rank_order),
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (String, f64)> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }

    /// Keys in rank order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Values in rank order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Keeps the first `k` entries.
    pub fn truncate(&mut self, k: usize) {
        self.entries.truncate(k);
    }

    /// Back to an unordered bag.
    pub fn to_bag(&self) -> SparseBag {
        self.entries.iter().cloned().collect()
    }

    pub fn into_vec(self) -> Vec<(String, f64)> {
        self.entries
    }
}

impl IntoIterator for RankedList {
    type Item = (String, f64);
    type IntoIter = std::vec::IntoIter<(String, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a RankedList {
    type Item = &'a (String, f64);
    type IntoIter = std::slice::Iter<'a, (String, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
