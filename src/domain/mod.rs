//! Domain types used throughout the dashboard.
//!
//! This module defines:
//!
//! - the normalized sales observation (`SalesRecord`) and its dataset
//! - the two selector values (`ReportType`, `SelectionState`)
//! - aggregation outputs (`ChartSeries`, `AggregateBundle`)

pub mod types;

pub use types::*;
