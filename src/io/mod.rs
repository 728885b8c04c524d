//! Input/output helpers.
//!
//! - bundle exports (JSON/CSV) (`export`)

pub mod export;

pub use export::*;
