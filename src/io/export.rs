//! Export aggregate bundles to JSON and CSV.
//!
//! The CSV is long-format (one row per point) so it loads cleanly into
//! spreadsheets; the JSON is the serialized bundle.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{AggregateBundle, DimensionValue};
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    chart: &'a str,
    title: &'a str,
    kind: &'a str,
    key: String,
    vehicle_type: &'a str,
    value: f64,
}

/// Write the bundle as pretty-printed JSON.
pub fn write_bundle_json(path: &Path, bundle: &AggregateBundle) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::io(format!("Failed to create JSON export '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, bundle)
        .map_err(|e| AppError::io(format!("Failed to write JSON export: {e}")))?;
    Ok(())
}

/// Write every point of every chart as one CSV row.
pub fn write_bundle_csv(path: &Path, bundle: &AggregateBundle) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::io(format!("Failed to create CSV export '{}': {e}", path.display())))?;

    for series in &bundle.series {
        for p in &series.points {
            let key = match &p.key {
                DimensionValue::UnemploymentByVehicleType { rate, .. } => format!("{rate}"),
                other => other.to_string(),
            };
            let row = ExportRow {
                chart: series.chart.slug(),
                title: &series.title,
                kind: series.kind.as_str(),
                key,
                vehicle_type: p.key.vehicle_type().unwrap_or(""),
                value: p.value,
            };
            writer
                .serialize(row)
                .map_err(|e| AppError::io(format!("Failed to write CSV export row: {e}")))?;
        }
    }

    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV export: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::sample_dataset;
    use crate::aggregate::{recession_bundle, yearly_bundle};

    #[test]
    fn csv_export_has_one_row_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.csv");
        let bundle = recession_bundle(&sample_dataset());
        write_bundle_csv(&path, &bundle).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("chart,title,kind,key,vehicle_type,value"));
        let expected: usize = bundle.series.iter().map(|s| s.points.len()).sum();
        assert_eq!(lines.clone().count(), expected);
        assert!(text.contains("recession_unemployment_effect,Effect of Unemployment Rate on Vehicle Type and Sales,bar,7.5,Sedan,200.0"));
    }

    #[test]
    fn json_export_round_trips_titles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bundle.json");
        write_bundle_json(&path, &yearly_bundle(&sample_dataset(), 1980)).unwrap();

        let value: serde_json::Value = serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value["report_type"], "yearly");
        assert_eq!(value["year"], 1980);
        assert_eq!(value["series"].as_array().unwrap().len(), 4);
        assert_eq!(value["series"][1]["title"], "Total Monthly Automobile Sales in 1980");
        assert_eq!(value["series"][0]["points"][0]["key"]["year"], 1980);
    }

    #[test]
    fn export_to_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("bundle.json");
        let err = write_bundle_json(&path, &recession_bundle(&sample_dataset())).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
