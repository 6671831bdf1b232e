//! Inverse indexes: one view of the sparse item×tag matrix keyed by its outer
//! dimension.
//!
//! The tag-keyed index (tag → item → weight) is the ground truth; the
//! item-keyed index is its [`InverseIndex::transpose`]. Both expose O(1)
//! membership and O(1) slice fetch.
//!
//! - Inserting a coordinate that already exists sums the weights.
//! - Zero weights are never stored; a coordinate summing to zero is removed.
//! - Transposition sums on (inner, outer) collisions, so transposing twice
//!   gives back the original index.

use std::collections::HashMap;

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bag::SparseBag;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InverseIndex {
    slices: HashMap<String, SparseBag>,
}

impl InverseIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from `(outer, inner, weight)` coordinates.
    pub fn from_triples<O, I, T>(triples: T) -> Self
    where
        O: Into<String>,
        I: Into<String>,
        T: IntoIterator<Item = (O, I, f64)>,
    {
        let mut index = Self::new();
        for (outer, inner, w) in triples {
            index.insert(outer, inner, w);
        }
        index
    }

    /// Adds `weight` at `(outer, inner)`.
    pub fn insert<O: Into<String>, I: Into<String>>(&mut self, outer: O, inner: I, weight: f64) {
        if weight == 0.0 {
            return;
        }
        let outer: String = outer.into();
        let slice = self.slices.entry(outer.clone()).or_default();
        let slot = slice.entry(inner.into()).or_insert(0.0);
        *slot += weight;
        if *slot == 0.0 {
            slice.retain(|_, w| *w != 0.0);
            if slice.is_empty() {
                self.slices.remove(&outer);
            }
        }
    }

    /// Installs a whole slice, dropping zero entries. An empty slice is not stored.
    pub fn insert_slice<O: Into<String>>(&mut self, outer: O, mut slice: SparseBag) {
        slice.retain(|_, w| *w != 0.0);
        if !slice.is_empty() {
            self.slices.insert(outer.into(), slice);
        }
    }

    /// Number of outer keys.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Number of stored coordinates.
    pub fn nnz(&self) -> usize {
        self.slices.values().map(|s| s.len()).sum()
    }

    #[inline]
    pub fn contains(&self, outer: &str) -> bool {
        self.slices.contains_key(outer)
    }

    #[inline]
    pub fn slice(&self, outer: &str) -> Option<&SparseBag> {
        self.slices.get(outer)
    }

    pub fn weight(&self, outer: &str, inner: &str) -> Option<f64> {
        self.slices.get(outer).and_then(|s| s.get(inner)).copied()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    /// Outer keys in lexicographic order.
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SparseBag)> {
        self.slices.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Every `(outer, inner, weight)` coordinate, in no particular order.
    pub fn triples(&self) -> impl Iterator<Item = (&str, &str, f64)> {
        self.slices
            .iter()
            .flat_map(|(o, s)| s.iter().map(move |(i, w)| (o.as_str(), i.as_str(), *w)))
    }

    /// Sparse transpose: `result[inner][outer] = self[outer][inner]`.
    ///
    /// Slices are scattered in parallel into per-thread partial indexes that
    /// are then reduced; colliding coordinates are summed.
    pub fn transpose(&self) -> InverseIndex {
        debug!(
            "Transposing inverse index: {} keys, {} entries",
            self.len(),
            self.nnz()
        );
        let slices = self
            .slices
            .par_iter()
            .fold(HashMap::new, |mut acc: HashMap<String, SparseBag>, (outer, slice)| {
                for (inner, &w) in slice {
                    *acc.entry(inner.clone())
                        .or_default()
                        .entry(outer.clone())
                        .or_insert(0.0) += w;
                }
                acc
            })
            .reduce(HashMap::new, merge_partials);

        let mut out = InverseIndex { slices };
        out.slices.retain(|_, s| {
            s.retain(|_, w| *w != 0.0);
            !s.is_empty()
        });
        trace!("Transpose produced {} keys", out.len());
        out
    }
}

fn merge_partials(
    mut left: HashMap<String, SparseBag>,
    right: HashMap<String, SparseBag>,
) -> HashMap<String, SparseBag> {
    if left.len() < right.len() {
        return merge_partials(right, left);
    }
    for (key, slice) in right {
        match left.get_mut(&key) {
            Some(target) => {
                for (k, w) in slice {
                    *target.entry(k).or_insert(0.0) += w;
                }
            }
            None => {
                left.insert(key, slice);
            }
        }
    }
    left
}
