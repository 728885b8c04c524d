//! Shared "load -> select -> aggregate" logic used by both CLI and TUI front-ends.
//!
//! The dataset is loaded at most once per process and then shared read-only.
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use once_cell::sync::OnceCell;

use crate::data::load_dataset;
use crate::domain::{DashboardConfig, NormalizedDataset, SelectionResponse};
use crate::error::AppError;
use crate::selection::on_selection_changed;

static DATASET: OnceCell<NormalizedDataset> = OnceCell::new();

/// Process-wide dataset, loaded from `source_uri` on first use.
///
/// The first successful load wins; later calls return it regardless of `source_uri`.
pub fn shared_dataset(source_uri: &str) -> Result<&'static NormalizedDataset, AppError> {
    DATASET.get_or_try_init(|| load_dataset(source_uri))
}

/// Load the dataset (once) and answer the configured selection.
pub fn run_report(config: &DashboardConfig) -> Result<SelectionResponse, AppError> {
    let dataset = shared_dataset(&config.source)?;
    Ok(run_report_with_dataset(dataset, config))
}

/// Answer the configured selection against an already-loaded dataset.
pub fn run_report_with_dataset(dataset: &NormalizedDataset, config: &DashboardConfig) -> SelectionResponse {
    let response = on_selection_changed(dataset, &config.selection);
    tracing::debug!(
        report_type = ?config.selection.report_type,
        year = ?config.selection.year,
        has_bundle = response.bundle.is_some(),
        "answered selection"
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ReportType, SelectionState};
    use std::io::Write;

    fn config(source: String, selection: SelectionState) -> DashboardConfig {
        DashboardConfig {
            source,
            selection,
            log_file: None,
            export_json: None,
            export_csv: None,
        }
    }

    #[test]
    fn report_from_local_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Date,Recession,Advertising_Expenditure,unemployment_rate,Automobile_Sales,Vehicle_Type"
        )
        .unwrap();
        writeln!(file, "4/30/1990,1,50,5.0,100,Sedan").unwrap();

        let cfg = config(
            file.path().display().to_string(),
            SelectionState::new(ReportType::Recession, 1980),
        );
        let dataset = crate::data::load_dataset(&cfg.source).unwrap();
        let response = run_report_with_dataset(&dataset, &cfg);
        assert!(response.year_input_disabled);
        let bundle = response.bundle.unwrap();
        assert_eq!(bundle.series[1].points[0].value, 100.0);
        assert_eq!(bundle.series[2].points[0].value, 50.0);
    }

    #[test]
    fn shared_dataset_is_loaded_once() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "Date,Recession,Advertising_Expenditure,unemployment_rate,Automobile_Sales,Vehicle_Type"
        )
        .unwrap();
        writeln!(file, "1/31/1980,0,10,6.0,20,Sports").unwrap();
        let path = file.path().display().to_string();

        let first = shared_dataset(&path).unwrap();
        let second = shared_dataset("does-not-exist.csv").unwrap();
        assert!(std::ptr::eq(first, second));
    }
}
