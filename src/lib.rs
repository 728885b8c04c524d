//! `autodash` library crate.
//!
//! The binary (`autodash`) is a thin wrapper around this library so that:
//!
//! - the aggregation and selection logic is testable without a terminal
//! - the scripting commands and the dashboard share one pipeline

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod report;
pub mod selection;
pub mod tui;
