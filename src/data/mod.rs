//! Dataset acquisition and normalization.
//!
//! - fetching the CSV resource from a URL or local path (`source`)
//! - parsing raw rows and deriving `Year`/`Month` (`loader`)

pub mod loader;
pub mod source;

pub use loader::{LoadReport, RawRecord, load_dataset, normalize, normalize_with_report, parse_dataset, read_raw_records};
pub use source::{DEFAULT_SOURCE_URI, DatasetSource, resolve_source_uri};
