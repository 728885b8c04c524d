//! Dataset source resolution and fetching.
//!
//! The dataset is an opaque CSV resource fetched once at startup, either over
//! HTTP(S) or from the local filesystem.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;

use crate::error::AppError;

/// Published historical automobile sales dataset.
pub const DEFAULT_SOURCE_URI: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBMDeveloperSkillsNetwork-DV0101EN-SkillsNetwork/Data%20Files/historical_automobile_sales.csv";

/// Environment variable (or `.env` entry) overriding the default source.
pub const SOURCE_ENV: &str = "AUTODASH_SOURCE";

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Url(String),
    File(PathBuf),
}

impl DatasetSource {
    /// Classify a source URI. `file://` prefixes are stripped.
    pub fn parse(uri: &str) -> Result<Self, AppError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(AppError::usage("Dataset source must not be empty."));
        }
        let lower = uri.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(DatasetSource::Url(uri.to_string()));
        }
        let path = uri.strip_prefix("file://").unwrap_or(uri);
        Ok(DatasetSource::File(PathBuf::from(path)))
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Url(url) => url.clone(),
            DatasetSource::File(path) => path.display().to_string(),
        }
    }

    /// Fetch the raw CSV text.
    pub fn fetch(&self) -> Result<String, AppError> {
        let started = Instant::now();
        let text = match self {
            DatasetSource::Url(url) => fetch_url(url)?,
            DatasetSource::File(path) => std::fs::read_to_string(path).map_err(|e| {
                AppError::source_unavailable(format!(
                    "Failed to read dataset '{}': {e}",
                    path.display()
                ))
            })?,
        };
        tracing::debug!(
            source = %self.describe(),
            bytes = text.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "fetched dataset"
        );
        Ok(text)
    }
}

fn fetch_url(url: &str) -> Result<String, AppError> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| AppError::source_unavailable(format!("Failed to build HTTP client: {e}")))?;

    let resp = client
        .get(url)
        .send()
        .map_err(|e| AppError::source_unavailable(format!("Dataset request failed: {e}")))?;

    if !resp.status().is_success() {
        return Err(AppError::source_unavailable(format!(
            "Dataset request failed with status {}.",
            resp.status()
        )));
    }

    resp.text()
        .map_err(|e| AppError::source_unavailable(format!("Failed to read dataset response: {e}")))
}

/// Pick the dataset URI: explicit flag, then `AUTODASH_SOURCE`, then the default.
pub fn resolve_source_uri(explicit: Option<&str>) -> String {
    if let Some(uri) = explicit.map(str::trim).filter(|s| !s.is_empty()) {
        return uri.to_string();
    }
    dotenvy::dotenv().ok();
    std::env::var(SOURCE_ENV)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SOURCE_URI.to_string())
}
