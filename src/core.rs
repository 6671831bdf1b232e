//! CoreSbr: the recommender facade holding both inverse indexes.
//!
//! Lifecycle:
//! - constructed empty (see [`crate::builder::CoreSbrBuilder`])
//! - ingest (or [`CoreSbr::set_tag_inverse_index`]) fills the tag-keyed index
//! - the first operation needing item lookups builds the item-keyed index by
//!   transposition; the build is guarded by a `OnceLock`, so concurrent
//!   readers share a single build
//! - re-ingesting replaces the tag index and drops the derived one
//!
//! Query operations never fail. Unknown keys are either skipped
//! (`ignore_unknown`) or produce an empty result; every diagnostic is logged
//! and, when the query asks for warnings, forwarded to the warning sink.
//!
//! # Examples
//!
//! ```
//! use sbrcore::builder::CoreSbrBuilder;
//! use sbrcore::index::InverseIndex;
//! use sbrcore::options::QueryOptions;
//!
//! let index = InverseIndex::from_triples([
//!     ("A", "i1", 1.0),
//!     ("A", "i2", 2.0),
//!     ("B", "i2", 1.0),
//! ]);
//! let sbr = CoreSbrBuilder::new().build_from_index(index);
//!
//! let recs = sbr.recommend_by_tags(&["A"], 1, &QueryOptions::default());
//! assert_eq!(recs.keys().collect::<Vec<_>>(), vec!["i2"]);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use log::{debug, info, trace};
use rayon::prelude::*;

use crate::bag::{merge_into, unit_bag, SparseBag};
use crate::builder::CoreSbrBuilder;
use crate::error::Result;
use crate::filter::{combine_clauses, filter_items, FilterMode, QueryElements};
use crate::index::InverseIndex;
use crate::ingest::{PrefixSource, SmrMatrix, TripletPart, TripletSource};
use crate::norms::normalize_by;
use crate::options::QueryOptions;
use crate::ranking::RankedList;
use crate::warn::{diagnose, WarnSink};

/// Default number of candidates ranked for the should clause of a retrieval.
pub const DEFAULT_K: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SbrState {
    /// Nothing ingested yet.
    Empty,
    /// Tag index present, item index not built.
    Ingested,
    /// Both indexes present.
    Ready,
}

pub struct CoreSbr {
    tag_index: InverseIndex,
    item_index: OnceLock<InverseIndex>,
    ingested: bool,
    default_k: usize,
    eager_transpose: bool,
    sink: Arc<dyn WarnSink>,
}

impl fmt::Debug for CoreSbr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoreSbr")
            .field("state", &self.state())
            .field("tags", &self.tag_index.len())
            .field("entries", &self.tag_index.nnz())
            .field("default_k", &self.default_k)
            .field("eager_transpose", &self.eager_transpose)
            .finish()
    }
}

impl Default for CoreSbr {
    fn default() -> Self {
        CoreSbrBuilder::default().build()
    }
}

impl CoreSbr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CoreSbrBuilder {
        CoreSbrBuilder::new()
    }

    pub(crate) fn with_config(
        default_k: usize,
        eager_transpose: bool,
        sink: Arc<dyn WarnSink>,
    ) -> Self {
        Self {
            tag_index: InverseIndex::new(),
            item_index: OnceLock::new(),
            ingested: false,
            default_k,
            eager_transpose,
            sink,
        }
    }

    pub fn state(&self) -> SbrState {
        if !self.ingested {
            SbrState::Empty
        } else if self.item_index.get().is_some() {
            SbrState::Ready
        } else {
            SbrState::Ingested
        }
    }

    pub fn default_k(&self) -> usize {
        self.default_k
    }

    // -------------------- Ingest --------------------

    /// Reads a matrix triplet and replaces the indexes.
    ///
    /// The triplet is parsed completely before anything is replaced, so a
    /// failed ingest leaves the facade as it was.
    pub fn ingest<S: TripletSource + ?Sized>(&mut self, source: &S) -> Result<()> {
        let start = Instant::now();
        let smr = SmrMatrix::read(source)?;
        self.set_tag_inverse_index(smr.tag_index());
        info!(
            "Ingested SMR matrix {} in {} ms",
            source.label(TripletPart::Entries),
            start.elapsed().as_millis()
        );
        Ok(())
    }

    /// Ingests `<prefix>-rownames.csv`, `<prefix>-colnames.csv` and `<prefix>.csv`.
    pub fn ingest_csv_matrices<P: AsRef<Path>>(&mut self, prefix: P) -> Result<()> {
        let source = PrefixSource::new(prefix)?;
        self.ingest(&source)
    }

    /// Installs a prebuilt tag-keyed index. Same transition as an ingest.
    pub fn set_tag_inverse_index(&mut self, index: InverseIndex) {
        debug!(
            "Installing tag index: {} tags, {} entries",
            index.len(),
            index.nnz()
        );
        self.tag_index = index;
        self.item_index = OnceLock::new();
        self.ingested = true;
        if self.eager_transpose {
            self.transpose_tag_inverse_index();
        }
    }

    /// Writes the tag index back to the three-file CSV format.
    pub fn export_csv_matrices<P: AsRef<Path>>(&self, prefix: P) -> Result<()> {
        SmrMatrix::from_index(&self.tag_index).write_prefix(prefix)
    }

    // -------------------- Indexes --------------------

    /// Builds the item-keyed index if needed and returns it.
    pub fn transpose_tag_inverse_index(&self) -> &InverseIndex {
        self.item_index.get_or_init(|| {
            let start = Instant::now();
            let transposed = self.tag_index.transpose();
            info!(
                "Transposed tag inverse index into {} items in {} ms",
                transposed.len(),
                start.elapsed().as_millis()
            );
            transposed
        })
    }

    pub fn tag_inverse_index(&self) -> &InverseIndex {
        &self.tag_index
    }

    pub fn item_inverse_index(&self) -> &InverseIndex {
        self.transpose_tag_inverse_index()
    }

    pub fn known_tags(&self) -> impl Iterator<Item = &str> {
        self.tag_index.keys()
    }

    pub fn known_items(&self) -> impl Iterator<Item = &str> {
        self.item_inverse_index().keys()
    }

    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.tag_index.contains(tag)
    }

    pub fn is_known_item(&self, item: &str) -> bool {
        self.item_inverse_index().contains(item)
    }

    // -------------------- Profile / recommend --------------------

    /// Combined tag signature of a weighted bag of items.
    pub fn profile(&self, items: &SparseBag, opts: &QueryOptions) -> RankedList {
        let start = Instant::now();
        let Some(mut mix) = self.accumulate(self.item_inverse_index(), items, "item", opts) else {
            return RankedList::new();
        };
        if opts.normalize {
            normalize_by(&mut mix, opts.norm);
        }
        let res = RankedList::from_bag(mix);
        debug!(
            ".profile of {} items -> {} tags in {} ms",
            items.len(),
            res.len(),
            start.elapsed().as_millis()
        );
        res
    }

    /// Top `k` items for a weighted bag of items, through their profile.
    ///
    /// The intermediate profile is never normalised.
    pub fn recommend(&self, items: &SparseBag, k: usize, opts: &QueryOptions) -> RankedList {
        let start = Instant::now();
        let prof = self.profile(items, &opts.with_normalize(false));
        if prof.is_empty() {
            return RankedList::new();
        }
        let res = self.recommend_by_profile(&prof.to_bag(), k, opts);
        debug!(".recommend in {} ms", start.elapsed().as_millis());
        res
    }

    /// Top `k` items for a weighted bag of tags.
    pub fn recommend_by_profile(
        &self,
        profile: &SparseBag,
        k: usize,
        opts: &QueryOptions,
    ) -> RankedList {
        let start = Instant::now();
        let Some(mut mix) = self.accumulate(&self.tag_index, profile, "tag", opts) else {
            return RankedList::new();
        };
        if opts.normalize {
            normalize_by(&mut mix, opts.norm);
        }
        let res = RankedList::top_k(mix, Some(k));
        debug!(
            ".recommendByProfile of {} tags -> {} items (k={}) in {} ms",
            profile.len(),
            res.len(),
            k,
            start.elapsed().as_millis()
        );
        res
    }

    /// [`CoreSbr::recommend_by_profile`] with every tag weighted 1.
    pub fn recommend_by_tags<S: AsRef<str>>(
        &self,
        tags: &[S],
        k: usize,
        opts: &QueryOptions,
    ) -> RankedList {
        self.recommend_by_profile(&unit_bag(tags), k, opts)
    }

    /// Runs independent profile queries in parallel.
    pub fn recommend_by_profiles(
        &self,
        profiles: &[SparseBag],
        k: usize,
        opts: &QueryOptions,
    ) -> Vec<RankedList> {
        profiles
            .par_iter()
            .map(|p| self.recommend_by_profile(p, k, opts))
            .collect()
    }

    /// Weighted sum of the slices of `input` keys; `None` means the query
    /// result is empty.
    ///
    /// Keys are visited in lexicographic order so the accumulated sums do
    /// not depend on hash order.
    fn accumulate(
        &self,
        index: &InverseIndex,
        input: &SparseBag,
        kind: &str,
        opts: &QueryOptions,
    ) -> Option<SparseBag> {
        let mut keys: Vec<(&String, &f64)> = input.iter().collect();
        keys.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let mut mix = SparseBag::new();
        let mut found = false;
        for (key, &w) in keys {
            if !w.is_finite() {
                diagnose(
                    self.sink.as_ref(),
                    opts.warn,
                    &format!("The weight of the {kind} {key} is not finite; skipped."),
                );
                continue;
            }
            match index.slice(key) {
                Some(slice) => {
                    found = true;
                    merge_into(&mut mix, slice, w);
                }
                None if opts.ignore_unknown => trace!("Skipping unknown {} {}", kind, key),
                None => {
                    diagnose(
                        self.sink.as_ref(),
                        opts.warn,
                        &format!("The {kind} {key} is unknown."),
                    );
                    return None;
                }
            }
        }
        if !found {
            diagnose(
                self.sink.as_ref(),
                opts.warn,
                &format!("None of the {kind}s is known."),
            );
            return None;
        }
        Some(mix)
    }

    // -------------------- Boolean retrieval --------------------

    /// Items selected by `tags` combined with `mode` (`"intersection"` or `"union"`).
    ///
    /// An invalid mode yields an empty set.
    pub fn filter_by_profile<S: AsRef<str>>(
        &self,
        tags: &[S],
        mode: &str,
        warn: bool,
    ) -> HashSet<String> {
        match mode.parse::<FilterMode>() {
            Ok(mode) => filter_items(&self.tag_index, self.item_inverse_index(), tags, mode),
            Err(msg) => {
                diagnose(self.sink.as_ref(), warn, &msg);
                HashSet::new()
            }
        }
    }

    /// Boolean retrieval: `(S ∩ M) \ N` where
    /// - `S` is the top [`CoreSbr::default_k`] items recommended for `should ∪ must`,
    /// - `M` is the must filter (everything when `must` is empty),
    /// - `N` is the must-not filter (nothing when `must_not` is empty).
    ///
    /// Items are returned in the ranking order of `S`.
    pub fn retrieve_by_query_elements(&self, query: &QueryElements, warn: bool) -> Vec<String> {
        let start = Instant::now();
        if query.is_empty() {
            diagnose(self.sink.as_ref(), warn, "All specifications are empty.");
            return Vec::new();
        }
        let (must, must_not) = match (
            self.clause_filter(&query.must, &query.must_type),
            self.clause_filter(&query.must_not, &query.must_not_type),
        ) {
            (Ok(m), Ok(n)) => (m, n),
            (Err(msg), _) | (_, Err(msg)) => {
                diagnose(self.sink.as_ref(), warn, &msg);
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let ranking_tags: Vec<&str> = query
            .should
            .iter()
            .chain(query.must.iter())
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .collect();
        let should: Vec<String> = if ranking_tags.is_empty() {
            Vec::new()
        } else {
            let opts = QueryOptions::new()
                .with_normalize(false)
                .with_warn(warn)
                .with_ignore_unknown(true);
            self.recommend_by_tags(ranking_tags.as_slice(), self.default_k, &opts)
                .into_iter()
                .map(|(item, _)| item)
                .collect()
        };

        let res = combine_clauses(should, must.as_ref(), must_not.as_ref());
        debug!(
            ".retrieveByQueryElements -> {} items in {} ms",
            res.len(),
            start.elapsed().as_millis()
        );
        res
    }

    /// Filter set of one retrieval clause, `None` when the clause has no tags.
    /// The mode of an empty clause is never parsed.
    fn clause_filter(
        &self,
        tags: &[String],
        mode: &str,
    ) -> std::result::Result<Option<HashSet<String>>, String> {
        if tags.is_empty() {
            return Ok(None);
        }
        let mode = mode.parse::<FilterMode>()?;
        Ok(Some(filter_items(
            &self.tag_index,
            self.item_inverse_index(),
            tags,
            mode,
        )))
    }
}
