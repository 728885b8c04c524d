//! CSV ingest and normalization.
//!
//! This module turns the raw sales CSV into an immutable `NormalizedDataset`.
//!
//! - **Strict schema** for required columns (checked before any row is read)
//! - **Strict rows**: a missing value or unparseable date fails the whole load
//! - `Year`/`Month` are always derived from `Date`; source columns with those
//!   names are ignored
//! - rows outside `[YEAR_MIN, YEAR_MAX]` are dropped and counted

use std::collections::HashMap;
use std::io::Read;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;

use crate::data::source::DatasetSource;
use crate::domain::{NormalizedDataset, SalesRecord, is_supported_year};
use crate::error::AppError;

const COL_DATE: &str = "Date";
const COL_VEHICLE_TYPE: &str = "Vehicle_Type";
const COL_SALES: &str = "Automobile_Sales";
const COL_ADVERTISING: &str = "Advertising_Expenditure";
const COL_UNEMPLOYMENT: &str = "unemployment_rate";
const COL_RECESSION: &str = "Recession";

const REQUIRED_COLUMNS: [&str; 6] = [
    COL_DATE,
    COL_VEHICLE_TYPE,
    COL_SALES,
    COL_ADVERTISING,
    COL_UNEMPLOYMENT,
    COL_RECESSION,
];

/// One CSV row, still as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based CSV line number (the header is line 1).
    pub line: usize,
    pub date: Option<String>,
    pub vehicle_type: Option<String>,
    pub automobile_sales: Option<String>,
    pub advertising_expenditure: Option<String>,
    pub unemployment_rate: Option<String>,
    pub recession: Option<String>,
}

/// Counters describing what normalization did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub rows_out_of_range: usize,
}

/// Fetch, parse and normalize the dataset at `source_uri`.
pub fn load_dataset(source_uri: &str) -> Result<NormalizedDataset, AppError> {
    let source = DatasetSource::parse(source_uri)?;
    let text = source.fetch()?;
    let (dataset, report) = parse_dataset(&text)?;
    tracing::info!(
        source = %source.describe(),
        rows_read = report.rows_read,
        rows_kept = report.rows_kept,
        rows_out_of_range = report.rows_out_of_range,
        "loaded automobile sales dataset"
    );
    Ok(dataset)
}

/// Parse CSV text and normalize it.
pub fn parse_dataset(text: &str) -> Result<(NormalizedDataset, LoadReport), AppError> {
    let raw = read_raw_records(text.as_bytes())?;
    normalize_with_report(&raw)
}

/// Read raw rows, validating the header against the required columns.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::data_format(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(&normalize_header_name(name)) {
            return Err(AppError::data_format(format!("Missing required column: `{name}`")));
        }
    }

    let mut out = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::data_format(format!("line {line}: CSV parse error: {e}")))?;
        out.push(RawRecord {
            line,
            date: get_optional(&record, &header_map, COL_DATE),
            vehicle_type: get_optional(&record, &header_map, COL_VEHICLE_TYPE),
            automobile_sales: get_optional(&record, &header_map, COL_SALES),
            advertising_expenditure: get_optional(&record, &header_map, COL_ADVERTISING),
            unemployment_rate: get_optional(&record, &header_map, COL_UNEMPLOYMENT),
            recession: get_optional(&record, &header_map, COL_RECESSION),
        });
    }
    Ok(out)
}

/// Normalize raw rows into the immutable dataset.
pub fn normalize(raw: &[RawRecord]) -> Result<NormalizedDataset, AppError> {
    normalize_with_report(raw).map(|(dataset, _)| dataset)
}

/// Like [`normalize`], also returning row counters.
pub fn normalize_with_report(raw: &[RawRecord]) -> Result<(NormalizedDataset, LoadReport), AppError> {
    let mut records = Vec::with_capacity(raw.len());
    let mut rows_out_of_range = 0usize;

    for row in raw {
        let record = normalize_row(row)
            .map_err(|msg| AppError::data_format(format!("line {}: {msg}", row.line)))?;
        if is_supported_year(record.year) {
            records.push(record);
        } else {
            rows_out_of_range += 1;
        }
    }

    let report = LoadReport {
        rows_read: raw.len(),
        rows_kept: records.len(),
        rows_out_of_range,
    };
    Ok((NormalizedDataset::from_records(records), report))
}

fn normalize_row(row: &RawRecord) -> Result<SalesRecord, String> {
    let date = parse_date(required(&row.date, COL_DATE)?)?;
    let vehicle_type = required(&row.vehicle_type, COL_VEHICLE_TYPE)?;
    let automobile_sales = parse_number(required(&row.automobile_sales, COL_SALES)?, COL_SALES)?;
    let advertising_expenditure =
        parse_number(required(&row.advertising_expenditure, COL_ADVERTISING)?, COL_ADVERTISING)?;
    let unemployment_rate =
        parse_number(required(&row.unemployment_rate, COL_UNEMPLOYMENT)?, COL_UNEMPLOYMENT)?;
    let recession = parse_flag(required(&row.recession, COL_RECESSION)?)?;

    Ok(SalesRecord::new(
        date,
        vehicle_type,
        automobile_sales,
        advertising_expenditure,
        unemployment_rate,
        recession,
    ))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_optional(record: &StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<String> {
    let idx = header_map.get(&normalize_header_name(name))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, String> {
    value
        .as_deref()
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // The published dataset uses `M/D/YYYY`; ISO forms are accepted too.
    const DATE_FMTS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d"];
    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.date());
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: M/D/YYYY, YYYY-MM-DD, YYYY/MM/DD, YYYY-MM-DD HH:MM:SS."
    ))
}

fn parse_number(s: &str, name: &str) -> Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(format!("Invalid number '{s}' in `{name}`")),
    }
}

fn parse_flag(s: &str) -> Result<bool, String> {
    if s.eq_ignore_ascii_case("true") {
        return Ok(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return Ok(false);
    }
    match s.parse::<f64>() {
        Ok(v) if v == 1.0 => Ok(true),
        Ok(v) if v == 0.0 => Ok(false),
        _ => Err(format!("Invalid `{COL_RECESSION}` flag '{s}' (expected 0 or 1)")),
    }
}
