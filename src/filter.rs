//! Boolean filtering of items by tags and the set algebra of
//! should/must/must-not retrieval.
//!
//! These are free functions over indexes and sets; the facade only wires them
//! to its own indexes and warning sink.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::index::InverseIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Items carrying every tag.
    Intersection,
    /// Items carrying at least one tag.
    Union,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterMode::Intersection => f.write_str("intersection"),
            FilterMode::Union => f.write_str("union"),
        }
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "intersection" => Ok(FilterMode::Intersection),
            "union" => Ok(FilterMode::Union),
            _ => Err(format!(
                "invalid filter mode {s:?}; expected one of \"intersection\" or \"union\""
            )),
        }
    }
}

/// Items of `tag_index` selected by `tags` under `mode`.
///
/// `universe` is the item-keyed index; an intersection over no tags returns
/// all of its keys. Under intersection an unknown tag empties the result,
/// under union it contributes nothing.
pub fn filter_items<S: AsRef<str>>(
    tag_index: &InverseIndex,
    universe: &InverseIndex,
    tags: &[S],
    mode: FilterMode,
) -> HashSet<String> {
    match mode {
        FilterMode::Intersection => {
            let mut tags = tags.iter().map(|t| -> &str { t.as_ref() });
            let Some(first) = tags.next() else {
                return universe.keys().map(str::to_string).collect();
            };
            let Some(slice) = tag_index.slice(first) else {
                return HashSet::new();
            };
            let mut out: HashSet<String> = slice
                .keys()
                .filter(|item| universe.contains(item))
                .cloned()
                .collect();
            for tag in tags {
                if out.is_empty() {
                    break;
                }
                match tag_index.slice(tag) {
                    Some(slice) => out.retain(|item| slice.contains_key(item)),
                    None => out.clear(),
                }
            }
            out
        }
        FilterMode::Union => tags
            .iter()
            .filter_map(|tag| tag_index.slice(tag.as_ref()))
            .flat_map(|slice| slice.keys().cloned())
            .collect(),
    }
}

/// `(should ∩ must) \ must_not`, keeping the order of `should`.
///
/// `must = None` means no restriction, `must_not = None` removes nothing.
pub fn combine_clauses(
    should: Vec<String>,
    must: Option<&HashSet<String>>,
    must_not: Option<&HashSet<String>>,
) -> Vec<String> {
    should
        .into_iter()
        .filter(|item| must.map_or(true, |m| m.contains(item)))
        .filter(|item| must_not.map_or(true, |n| !n.contains(item)))
        .collect()
}

/// Clauses of a Boolean retrieval query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryElements {
    /// Tags ranking the candidates.
    pub should: Vec<String>,
    /// Tags the result items must carry.
    pub must: Vec<String>,
    /// Tags the result items must not carry.
    pub must_not: Vec<String>,
    /// Combination of the must tags, `"intersection"` or `"union"`.
    pub must_type: String,
    /// Combination of the must-not tags, `"intersection"` or `"union"`.
    pub must_not_type: String,
}

impl Default for QueryElements {
    fn default() -> Self {
        Self {
            should: Vec::new(),
            must: Vec::new(),
            must_not: Vec::new(),
            must_type: FilterMode::Intersection.to_string(),
            must_not_type: FilterMode::Union.to_string(),
        }
    }
}

impl QueryElements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_should<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.should = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn with_must<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.must = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn with_must_not<S: AsRef<str>>(mut self, tags: &[S]) -> Self {
        self.must_not = tags.iter().map(|t| t.as_ref().to_string()).collect();
        self
    }

    pub fn with_must_type(mut self, mode: impl Into<String>) -> Self {
        self.must_type = mode.into();
        self
    }

    pub fn with_must_not_type(mut self, mode: impl Into<String>) -> Self {
        self.must_not_type = mode.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.should.is_empty() && self.must.is_empty() && self.must_not.is_empty()
    }
}
