//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - shared read-only across selection handlers
//! - exported to JSON/CSV
//! - compared for equality in tests (bundles are pure functions of their inputs)

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// First year kept by normalization and offered by the year selector.
pub const YEAR_MIN: i32 = 1980;
/// Last year kept by normalization (inclusive).
pub const YEAR_MAX: i32 = 2013;
/// Year selected before the user touches the year input.
pub const DEFAULT_YEAR: i32 = YEAR_MIN;

/// Years offered by the year selector.
///
/// Built from the half-open range `1980..2014`, i.e. 2013 is included.
pub fn selectable_years() -> Vec<i32> {
    (YEAR_MIN..YEAR_MAX + 1).collect()
}

pub fn is_supported_year(year: i32) -> bool {
    (YEAR_MIN..=YEAR_MAX).contains(&year)
}

/// One observed data point after normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    /// Derived from `date`.
    pub year: i32,
    /// Derived from `date` (1-12).
    pub month: u32,
    pub vehicle_type: String,
    pub automobile_sales: f64,
    pub advertising_expenditure: f64,
    pub unemployment_rate: f64,
    pub recession: bool,
}

impl SalesRecord {
    pub fn new(
        date: NaiveDate,
        vehicle_type: impl Into<String>,
        automobile_sales: f64,
        advertising_expenditure: f64,
        unemployment_rate: f64,
        recession: bool,
    ) -> Self {
        Self {
            date,
            year: date.year(),
            month: date.month(),
            vehicle_type: vehicle_type.into(),
            automobile_sales,
            advertising_expenditure,
            unemployment_rate,
            recession,
        }
    }
}

/// The immutable, range-filtered dataset every aggregation reads from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedDataset {
    records: Vec<SalesRecord>,
}

impl NormalizedDataset {
    /// Build a dataset, dropping records outside `[YEAR_MIN, YEAR_MAX]`.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let records = records
            .into_iter()
            .filter(|r| is_supported_year(r.year))
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest year present, if any.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }
}

/// Reporting mode picked in the "Select Statistics" selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Yearly,
    Recession,
}

impl ReportType {
    pub const ALL: [ReportType; 2] = [ReportType::Yearly, ReportType::Recession];

    /// Wire value used by callers (`yearly` / `recession`).
    pub fn value(self) -> &'static str {
        match self {
            ReportType::Yearly => "yearly",
            ReportType::Recession => "recession",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ReportType::Yearly => "Yearly Statistics",
            ReportType::Recession => "Recession Period Statistics",
        }
    }

    /// Parse a raw selector value. Anything unrecognized is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "yearly" => Some(ReportType::Yearly),
            "recession" => Some(ReportType::Recession),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            ReportType::Yearly => ReportType::Recession,
            ReportType::Recession => ReportType::Yearly,
        }
    }
}

/// The two selector values as received from the UI.
///
/// Either may be unset; an unset or unrecognized value means "no selection".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionState {
    pub report_type: Option<ReportType>,
    pub year: Option<i32>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            report_type: Some(ReportType::Yearly),
            year: Some(DEFAULT_YEAR),
        }
    }
}

impl SelectionState {
    pub fn new(report_type: ReportType, year: i32) -> Self {
        Self {
            report_type: Some(report_type),
            year: Some(year),
        }
    }

    /// Build a state from raw selector values, mapping unknown report types
    /// and out-of-range years to "unset".
    pub fn from_raw(report_type: Option<&str>, year: Option<i32>) -> Self {
        Self {
            report_type: report_type.and_then(ReportType::parse),
            year: year.filter(|y| is_supported_year(*y)),
        }
    }
}

/// Rendering hint attached to each series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Pie => "pie",
        }
    }
}

/// The eight named aggregates, four per report mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartId {
    RecessionSalesByYear,
    RecessionSalesByVehicleType,
    RecessionAdExpenditureByVehicleType,
    RecessionUnemploymentEffect,
    YearlySalesTrend,
    YearlyMonthlySales,
    YearlySalesByVehicleType,
    YearlyAdExpenditureByVehicleType,
}

impl ChartId {
    pub const RECESSION: [ChartId; 4] = [
        ChartId::RecessionSalesByYear,
        ChartId::RecessionSalesByVehicleType,
        ChartId::RecessionAdExpenditureByVehicleType,
        ChartId::RecessionUnemploymentEffect,
    ];

    pub const YEARLY: [ChartId; 4] = [
        ChartId::YearlySalesTrend,
        ChartId::YearlyMonthlySales,
        ChartId::YearlySalesByVehicleType,
        ChartId::YearlyAdExpenditureByVehicleType,
    ];

    pub fn kind(self) -> ChartKind {
        match self {
            ChartId::RecessionSalesByYear | ChartId::YearlySalesTrend | ChartId::YearlyMonthlySales => {
                ChartKind::Line
            }
            ChartId::RecessionSalesByVehicleType
            | ChartId::RecessionUnemploymentEffect
            | ChartId::YearlySalesByVehicleType => ChartKind::Bar,
            ChartId::RecessionAdExpenditureByVehicleType
            | ChartId::YearlyAdExpenditureByVehicleType => ChartKind::Pie,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            ChartId::RecessionSalesByYear => "recession_sales_by_year",
            ChartId::RecessionSalesByVehicleType => "recession_sales_by_vehicle_type",
            ChartId::RecessionAdExpenditureByVehicleType => "recession_ad_expenditure_by_vehicle_type",
            ChartId::RecessionUnemploymentEffect => "recession_unemployment_effect",
            ChartId::YearlySalesTrend => "yearly_sales_trend",
            ChartId::YearlyMonthlySales => "yearly_monthly_sales",
            ChartId::YearlySalesByVehicleType => "yearly_sales_by_vehicle_type",
            ChartId::YearlyAdExpenditureByVehicleType => "yearly_ad_expenditure_by_vehicle_type",
        }
    }

    /// Chart title; yearly charts 2-4 mention the selected year.
    pub fn title(self, year: i32) -> String {
        match self {
            ChartId::RecessionSalesByYear => {
                "Average Automobile Sales Fluctuation Over Recession Period".to_string()
            }
            ChartId::RecessionSalesByVehicleType => {
                "Average Number of Vehicles Sold by Vehicle Type (Recession)".to_string()
            }
            ChartId::RecessionAdExpenditureByVehicleType => {
                "Total Expenditure Share by Vehicle Type During Recession".to_string()
            }
            ChartId::RecessionUnemploymentEffect => {
                "Effect of Unemployment Rate on Vehicle Type and Sales".to_string()
            }
            ChartId::YearlySalesTrend => "Yearly Automobile Sales Trend".to_string(),
            ChartId::YearlyMonthlySales => format!("Total Monthly Automobile Sales in {year}"),
            ChartId::YearlySalesByVehicleType => {
                format!("Average Vehicles Sold by Vehicle Type in {year}")
            }
            ChartId::YearlyAdExpenditureByVehicleType => {
                format!("Total Advertisement Expenditure for Each Vehicle Type in {year}")
            }
        }
    }
}

/// Group key of one aggregated point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionValue {
    Year(i32),
    Month(u32),
    VehicleType(String),
    UnemploymentByVehicleType { rate: f64, vehicle_type: String },
}

impl DimensionValue {
    /// Numeric x position for continuous axes (year, month, rate).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DimensionValue::Year(y) => Some(f64::from(*y)),
            DimensionValue::Month(m) => Some(f64::from(*m)),
            DimensionValue::VehicleType(_) => None,
            DimensionValue::UnemploymentByVehicleType { rate, .. } => Some(*rate),
        }
    }

    pub fn vehicle_type(&self) -> Option<&str> {
        match self {
            DimensionValue::VehicleType(v) => Some(v),
            DimensionValue::UnemploymentByVehicleType { vehicle_type, .. } => Some(vehicle_type),
            _ => None,
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Year(y) => write!(f, "{y}"),
            DimensionValue::Month(m) => write!(f, "{m}"),
            DimensionValue::VehicleType(v) => write!(f, "{v}"),
            DimensionValue::UnemploymentByVehicleType { rate, vehicle_type } => {
                write!(f, "{rate} / {vehicle_type}")
            }
        }
    }
}

/// One `(dimension_value, reduced_value)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub key: DimensionValue,
    pub value: f64,
}

/// A named, reduced series with its rendering hint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub chart: ChartId,
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<SeriesPoint>,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Output of one report mode: exactly four series, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateBundle {
    pub report_type: ReportType,
    /// Selected year for yearly bundles; `None` for recession bundles.
    pub year: Option<i32>,
    pub series: [ChartSeries; 4],
}

/// Answer to a selection change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionResponse {
    pub year_input_disabled: bool,
    pub bundle: Option<AggregateBundle>,
}

/// A full run's configuration as understood by the front-ends.
///
/// This is derived from CLI flags, `.env` and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Dataset location: an `http(s)://` URL, a `file://` URI or a plain path.
    pub source: String,
    pub selection: SelectionState,
    pub log_file: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selectable_years_include_2013() {
        let years = selectable_years();
        assert_eq!(years.first(), Some(&1980));
        assert_eq!(years.last(), Some(&2013));
        assert_eq!(years.len(), 34);
    }

    #[test]
    fn dataset_drops_out_of_range_records() {
        let rec = |y: i32| {
            SalesRecord::new(NaiveDate::from_ymd_opt(y, 6, 30).unwrap(), "Sedan", 1.0, 1.0, 5.0, false)
        };
        let ds = NormalizedDataset::from_records(vec![rec(1979), rec(1980), rec(2013), rec(2014)]);
        let years: Vec<i32> = ds.records().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1980, 2013]);
        assert_eq!(ds.year_span(), Some((1980, 2013)));
    }

    #[test]
    fn raw_selection_maps_unknowns_to_unset() {
        let s = SelectionState::from_raw(Some("monthly"), Some(2014));
        assert_eq!(s.report_type, None);
        assert_eq!(s.year, None);

        let s = SelectionState::from_raw(Some("recession"), Some(1999));
        assert_eq!(s, SelectionState::new(ReportType::Recession, 1999));
    }

    #[test]
    fn yearly_titles_mention_year() {
        assert_eq!(
            ChartId::YearlyMonthlySales.title(1985),
            "Total Monthly Automobile Sales in 1985"
        );
        assert_eq!(ChartId::YearlySalesTrend.title(1985), "Yearly Automobile Sales Trend");
        assert_eq!(ChartId::YearlyAdExpenditureByVehicleType.kind(), ChartKind::Pie);
    }
}
