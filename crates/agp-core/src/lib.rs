//! Core domain types for the AGP report.
//!
//! Readings and series, glucose range buckets, result types, the shared
//! error enum, numeric helpers, formatting, and CLI settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod ranges;
pub mod settings;
pub mod stats;
pub mod time_utils;

pub use error::{AgpError, Result};
