//! Terminal UI layer for the AGP report.
//!
//! Provides themes, the header and range-bar components, the summary, chart,
//! daily-table and records views, and the tabbed application event loop built
//! on top of [`ratatui`].

pub mod agp_chart;
pub mod app;
pub mod components;
pub mod records_view;
pub mod summary_view;
pub mod table_view;
pub mod themes;

pub use agp_core as core;
