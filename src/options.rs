//! Per-query options for profile and recommendation queries.

use serde::{Deserialize, Serialize};

use crate::norms::NormKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Normalise the scores of the result before ranking.
    pub normalize: bool,
    /// Forward diagnostics to the facade's warning sink.
    pub warn: bool,
    /// Skip unknown keys instead of returning an empty result.
    pub ignore_unknown: bool,
    /// Norm used when `normalize` is set.
    pub norm: NormKind,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            normalize: true,
            warn: false,
            ignore_unknown: false,
            norm: NormKind::Max,
        }
    }
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_warn(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }

    pub fn with_ignore_unknown(mut self, ignore_unknown: bool) -> Self {
        self.ignore_unknown = ignore_unknown;
        self
    }

    pub fn with_norm(mut self, norm: NormKind) -> Self {
        self.norm = norm;
        self
    }
}
