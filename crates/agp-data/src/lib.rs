//! Data layer for the AGP report.
//!
//! Reads device exports into a [`Series`](agp_core::models::Series),
//! aggregates it into range summaries, daily profiles and the AGP curve,
//! exports the tables as CSV, and persists the editable record table.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod reader;
pub mod store;

pub use agp_core as core;
