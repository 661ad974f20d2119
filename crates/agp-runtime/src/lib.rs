//! Runtime layer for the AGP report.
//!
//! Turns external triggers into analysis passes through [`session::ReportSession`]
//! and adapts each report into a view-ready [`payload::ReportPayload`].

pub mod payload;
pub mod session;

pub use agp_core as core;
pub use agp_data as data;
