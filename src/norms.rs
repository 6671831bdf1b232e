//! Norms and in-place normalisation of sparse bags.
//!
//! - Norms only look at the values of a bag, keys are ignored.
//! - An empty bag has norm 0 for every kind.
//! - Normalisation never divides by zero: a bag whose norm is 0 is left as is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bag::SparseBag;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormKind {
    /// √Σv²
    Euclidean,
    /// max |v|
    #[default]
    Max,
    /// Σ|v|
    One,
}

impl fmt::Display for NormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormKind::Euclidean => "euclidean",
            NormKind::Max => "max-norm",
            NormKind::One => "one-norm",
        };
        f.write_str(name)
    }
}

impl FromStr for NormKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" | "cosine" | "two-norm" => Ok(NormKind::Euclidean),
            "max" | "max-norm" | "inf-norm" => Ok(NormKind::Max),
            "one" | "one-norm" => Ok(NormKind::One),
            other => Err(format!(
                "unknown norm {other:?}; expected one of \"euclidean\", \"max-norm\", \"one-norm\""
            )),
        }
    }
}

/// Computes the norm of the bag values.
#[inline]
pub fn norm(bag: &SparseBag, kind: NormKind) -> f64 {
    values_norm(bag.values().copied(), kind)
}

/// Same as [`norm`] over a plain value iterator.
pub fn values_norm<I: IntoIterator<Item = f64>>(values: I, kind: NormKind) -> f64 {
    let values = values.into_iter();
    match kind {
        NormKind::Euclidean => values.map(|v| v * v).sum::<f64>().sqrt(),
        NormKind::Max => values.fold(0.0, |m, v| m.max(v.abs())),
        NormKind::One => values.map(f64::abs).sum(),
    }
}

/// Scales every value by `1 / max|v|`.
pub fn max_normalize(bag: &mut SparseBag) {
    scale_by_norm(bag, NormKind::Max);
}

/// Scales every value by `1 / ‖v‖₂`.
pub fn cosine_normalize(bag: &mut SparseBag) {
    scale_by_norm(bag, NormKind::Euclidean);
}

/// Normalises in place with the requested norm.
pub fn normalize_by(bag: &mut SparseBag, kind: NormKind) {
    scale_by_norm(bag, kind);
}

fn scale_by_norm(bag: &mut SparseBag, kind: NormKind) {
    let n = norm(bag, kind);
    if n == 0.0 {
        return;
    }
    for v in bag.values_mut() {
        if *v != 0.0 {
            *v /= n;
        }
    }
}
