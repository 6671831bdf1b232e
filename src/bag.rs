//! Sparse weighted bags and weighted accumulation.
//!
//! A bag maps string keys to weights; an absent key has weight zero. Bags carry
//! no ordering, ordering only exists on [`crate::ranking::RankedList`].

use std::collections::HashMap;

pub type SparseBag = HashMap<String, f64>;

/// Builds a bag from `(key, weight)` pairs, summing repeated keys and
/// dropping entries that end up at exactly zero.
pub fn bag_from_pairs<K, I>(pairs: I) -> SparseBag
where
    K: Into<String>,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut bag = SparseBag::new();
    for (k, w) in pairs {
        *bag.entry(k.into()).or_insert(0.0) += w;
    }
    bag.retain(|_, w| *w != 0.0);
    bag
}

/// Builds a bag giving every key weight 1.
pub fn unit_bag<S: AsRef<str>>(keys: &[S]) -> SparseBag {
    keys.iter().map(|k| (k.as_ref().to_string(), 1.0)).collect()
}

/// `target[k] += weight * source[k]` for every key of `source`.
///
/// A zero weight or an empty source leaves `target` untouched. A key whose
/// accumulated value lands on exactly zero stays in `target`.
pub fn merge_into(target: &mut SparseBag, source: &SparseBag, weight: f64) {
    if weight == 0.0 || source.is_empty() {
        return;
    }
    target.reserve(source.len());
    for (k, v) in source {
        if let Some(slot) = target.get_mut(k) {
            *slot += weight * v;
        } else {
            target.insert(k.clone(), weight * v);
        }
    }
}
