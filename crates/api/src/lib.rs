//! Indexer clients for the liquidation sweep.
//!
//! This crate provides:
//! - Subgraph: the indexed borrower list, fetched with cache-first semantics

mod subgraph;

pub use subgraph::{SubgraphClient, SubgraphError, UserSource, DEFAULT_PAGE_SIZE};
