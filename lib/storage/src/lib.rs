//! Contains the quad dataset of [Quadflow](../../quadflow) and an in-memory storage backend.
//!
//! A [QuadDataset] does not store any quads itself. It resolves which graphs a query currently
//! reads from (the active and default graphs) and delegates pattern matching to a
//! [QuadStorage](quadflow_common::QuadStorage).

mod dataset;
pub mod memory;

pub use dataset::{DatasetConfig, QuadDataset, TripleIter};
