//! # sbrcore
//!
//! Sparse bipartite recommender core. An item×tag matrix of weights is held
//! as two inverse indexes (tag → items and item → tags) and queried with:
//!
//! - **profile**: weighted items → ranked tags
//! - **recommend**: weighted items or weighted tags → ranked items
//! - **retrieve**: Boolean should/must/must-not queries over tags → items
//!
//! The matrix is ingested from the three-file SMR CSV format (see [`ingest`]).
//! Everything is in memory; re-ingesting rebuilds both indexes.
//!
//! Entry point is [`core::CoreSbr`], configured through
//! [`builder::CoreSbrBuilder`]. The merge, norm and filter building blocks are
//! free functions usable on their own.

pub mod bag;
pub mod builder;
pub mod core;
pub mod error;
pub mod filter;
pub mod index;
pub mod ingest;
pub mod norms;
pub mod options;
pub mod ranking;
pub mod warn;

pub use crate::bag::SparseBag;
pub use crate::builder::CoreSbrBuilder;
pub use crate::core::{CoreSbr, SbrState};
pub use crate::error::{Result, SbrError};
pub use crate::filter::{FilterMode, QueryElements};
pub use crate::index::InverseIndex;
pub use crate::norms::NormKind;
pub use crate::options::QueryOptions;
pub use crate::ranking::RankedList;

#[cfg(test)]
mod tests;
