//! Walkthrough of the recommender: ingest an SMR matrix, recommend by
//! profile, recommend by history, retrieve by query elements.
//!
//! ```text
//! cargo run --example basic_usage -- path/to/WLExampleData-SMR-M01
//! ```
//!
//! Without an argument a small dataset catalogue is written to the temp
//! directory first and used instead.

use std::path::PathBuf;
use std::sync::Arc;

use log::info;
use sbrcore::bag::bag_from_pairs;
use sbrcore::builder::CoreSbrBuilder;
use sbrcore::filter::QueryElements;
use sbrcore::index::InverseIndex;
use sbrcore::options::QueryOptions;
use sbrcore::warn::StderrSink;

fn sample_catalogue() -> InverseIndex {
    InverseIndex::from_triples([
        ("ApplicationArea:Chemistry", "Chemistry-Elements", 1.0),
        ("ApplicationArea:Chemistry", "Chemistry-Reactions", 1.0),
        ("ApplicationArea:Statistics", "Statistics-Cabbages", 1.0),
        ("ApplicationArea:Statistics", "Statistics-Titanic", 1.0),
        ("ApplicationArea:Statistics", "Statistics-Census", 1.0),
        ("ColumnHeading:Age", "Statistics-Titanic", 1.0),
        ("ColumnHeading:Age", "Statistics-Census", 1.0),
        ("ColumnHeading:Gender", "Statistics-Titanic", 1.0),
        ("ColumnHeading:Gender", "Statistics-Census", 1.0),
        ("ColumnHeading:Weight", "Statistics-Cabbages", 1.0),
        ("ColumnHeading:Weight", "Chemistry-Elements", 0.5),
        ("RowCount:Large", "Statistics-Census", 1.0),
        ("RowCount:Small", "Statistics-Cabbages", 1.0),
        ("RowCount:Small", "Chemistry-Elements", 1.0),
    ])
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let prefix = match std::env::args().nth(1) {
        Some(p) => PathBuf::from(p),
        None => {
            let p = std::env::temp_dir().join("sbrcore-demo-SMR-M01");
            info!("No prefix given, writing sample catalogue to {}", p.display());
            CoreSbrBuilder::new()
                .build_from_index(sample_catalogue())
                .export_csv_matrices(&p)?;
            p
        }
    };

    let sbr = CoreSbrBuilder::new()
        .with_warn_sink(Arc::new(StderrSink))
        .with_eager_transpose(true)
        .build_from_prefix(&prefix)?;
    info!("{:?}", sbr);

    let opts = QueryOptions::default().with_warn(true);

    println!("=========================================================");
    let prof = bag_from_pairs([("ApplicationArea:Chemistry", 1.0)]);
    let profile_recs = sbr.recommend_by_profile(&prof, 3, &opts);
    println!("{:?}", profile_recs.entries());

    println!("=========================================================");
    let hist = bag_from_pairs([("Statistics-Cabbages", 1.0)]);
    let hist_recs = sbr.recommend(&hist, 3, &opts);
    println!("{:?}", hist_recs.entries());

    println!("=========================================================");
    let query = QueryElements::new()
        .with_should(&["ColumnHeading:Age"])
        .with_must(&["ColumnHeading:Gender"])
        .with_must_type("intersection")
        .with_must_not_type("union");
    let retrieved = sbr.retrieve_by_query_elements(&query, true);
    println!("{:?}", retrieved);

    Ok(())
}
