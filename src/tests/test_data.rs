use std::sync::{Arc, Once};

use crate::bag::{bag_from_pairs, SparseBag};
use crate::builder::CoreSbrBuilder;
use crate::core::CoreSbr;
use crate::index::InverseIndex;
use crate::ingest::MemorySource;
use crate::warn::CollectingSink;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Three tags over three items:
///
/// ```text
/// A: {i1: 1.0, i2: 2.0}
/// B: {i2: 1.0, i3: 4.0}
/// C: {i1: 0.5, i3: 0.5}
/// ```
pub fn small_tag_index() -> InverseIndex {
    InverseIndex::from_triples([
        ("A", "i1", 1.0),
        ("A", "i2", 2.0),
        ("B", "i2", 1.0),
        ("B", "i3", 4.0),
        ("C", "i1", 0.5),
        ("C", "i3", 0.5),
    ])
}

pub fn small_sbr() -> CoreSbr {
    init_logger();
    CoreSbrBuilder::new().build_from_index(small_tag_index())
}

pub fn small_sbr_with_sink() -> (CoreSbr, Arc<CollectingSink>) {
    init_logger();
    let sink = Arc::new(CollectingSink::new());
    let sbr = CoreSbrBuilder::new()
        .with_warn_sink(sink.clone())
        .build_from_index(small_tag_index());
    (sbr, sink)
}

/// The small matrix in the three-file CSV layout, as written by R's `write.csv`.
pub fn small_triplet() -> MemorySource {
    MemorySource::new(
        "\"\",\"x\"\n\"1\",\"i1\"\n\"2\",\"i2\"\n\"3\",\"i3\"\n",
        "\"\",\"x\"\n\"1\",\"A\"\n\"2\",\"B\"\n\"3\",\"C\"\n",
        "\"i\",\"j\",\"x\"\n1,1,1\n2,1,2\n2,2,1\n3,2,4\n1,3,0.5\n3,3,0.5\n",
    )
}

pub fn bag(pairs: &[(&str, f64)]) -> SparseBag {
    bag_from_pairs(pairs.iter().copied())
}

pub fn pairs(list: &[(&str, f64)]) -> Vec<(String, f64)> {
    list.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Random tag index with `ntags` tags over `nitems` items; weights are
/// multiples of 1/8 so sums stay exact.
pub fn random_tag_index(seed: u64, ntags: usize, nitems: usize, nnz: usize) -> InverseIndex {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(seed);
    let mut index = InverseIndex::new();
    for _ in 0..nnz {
        let tag = format!("t{}", rng.random_range(0..ntags));
        let item = format!("i{}", rng.random_range(0..nitems));
        let w = rng.random_range(1..=32) as f64 / 8.0;
        index.insert(tag, item, w);
    }
    index
}
