//! The two four-chart bundles.

use crate::domain::{AggregateBundle, ChartId, NormalizedDataset, ReportType};

use super::{
    ad_expenditure_by_vehicle_type, build_bundle, monthly_sales, recession_ad_expenditure_by_vehicle_type,
    recession_sales_by_vehicle_type, recession_sales_by_year, recession_unemployment_effect,
    sales_by_vehicle_type, yearly_sales_trend,
};

/// Which bundle a selection asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleRequest {
    Recession,
    Yearly { year: i32 },
}

pub fn compute_bundle(dataset: &NormalizedDataset, request: BundleRequest) -> AggregateBundle {
    match request {
        BundleRequest::Recession => recession_bundle(dataset),
        BundleRequest::Yearly { year } => yearly_bundle(dataset, year),
    }
}

/// Recession-period analysis over rows flagged `Recession = 1`.
pub fn recession_bundle(dataset: &NormalizedDataset) -> AggregateBundle {
    build_bundle(
        ReportType::Recession,
        None,
        [
            (ChartId::RecessionSalesByYear, recession_sales_by_year(dataset)),
            (ChartId::RecessionSalesByVehicleType, recession_sales_by_vehicle_type(dataset)),
            (
                ChartId::RecessionAdExpenditureByVehicleType,
                recession_ad_expenditure_by_vehicle_type(dataset),
            ),
            (ChartId::RecessionUnemploymentEffect, recession_unemployment_effect(dataset)),
        ],
    )
}

/// Yearly statistics: the long-run trend plus three charts for `year`.
pub fn yearly_bundle(dataset: &NormalizedDataset, year: i32) -> AggregateBundle {
    build_bundle(
        ReportType::Yearly,
        Some(year),
        [
            (ChartId::YearlySalesTrend, yearly_sales_trend(dataset)),
            (ChartId::YearlyMonthlySales, monthly_sales(dataset, year)),
            (ChartId::YearlySalesByVehicleType, sales_by_vehicle_type(dataset, year)),
            (
                ChartId::YearlyAdExpenditureByVehicleType,
                ad_expenditure_by_vehicle_type(dataset, year),
            ),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::{rec, sample_dataset};
    use crate::domain::{ChartKind, DimensionValue, SeriesPoint};

    #[test]
    fn single_recession_record_scenario() {
        let ds = NormalizedDataset::from_records(vec![rec(1990, 4, "Sedan", 100.0, 50.0, 5.0, true)]);
        let bundle = recession_bundle(&ds);
        let sedan = |value| SeriesPoint {
            key: DimensionValue::VehicleType("Sedan".to_string()),
            value,
        };
        assert_eq!(bundle.series[1].points, vec![sedan(100.0)]);
        assert_eq!(bundle.series[2].points, vec![sedan(50.0)]);
    }

    #[test]
    fn no_recession_rows_gives_four_empty_series() {
        let ds = NormalizedDataset::from_records(vec![rec(1990, 4, "Sedan", 100.0, 50.0, 5.0, false)]);
        let bundle = recession_bundle(&ds);
        assert_eq!(bundle.series.len(), 4);
        assert!(bundle.series.iter().all(|s| s.is_empty()));
    }

    #[test]
    fn yearly_trend_ignores_selected_year() {
        let mut records = Vec::new();
        for year in 1980..=2013 {
            records.push(rec(year, 6, "Sedan", f64::from(year - 1979), 1.0, 5.0, false));
        }
        let ds = NormalizedDataset::from_records(records);
        let bundle = yearly_bundle(&ds, 1980);
        let trend_years: Vec<f64> = bundle.series[0]
            .points
            .iter()
            .filter_map(|p| p.key.as_f64())
            .collect();
        assert_eq!(trend_years.len(), 34);
        assert_eq!(trend_years.first(), Some(&1980.0));
        assert_eq!(trend_years.last(), Some(&2013.0));
        assert_eq!(bundle.series[1].points.len(), 1);
    }

    #[test]
    fn bundles_carry_kinds_and_titles() {
        let ds = sample_dataset();
        let yearly = yearly_bundle(&ds, 1985);
        let kinds: Vec<ChartKind> = yearly.series.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![ChartKind::Line, ChartKind::Line, ChartKind::Bar, ChartKind::Pie]);
        assert_eq!(yearly.series[1].title, "Total Monthly Automobile Sales in 1985");
        assert_eq!(yearly.year, Some(1985));
        // No rows in 1985: only the trend has data.
        assert!(!yearly.series[0].is_empty());
        assert!(yearly.series[1..].iter().all(|s| s.is_empty()));

        let recession = compute_bundle(&ds, BundleRequest::Recession);
        assert_eq!(recession.report_type, ReportType::Recession);
        assert_eq!(recession.year, None);
        let charts: Vec<ChartId> = recession.series.iter().map(|s| s.chart).collect();
        assert_eq!(charts, ChartId::RECESSION.to_vec());
    }

    #[test]
    fn bundles_are_deterministic() {
        let ds = sample_dataset();
        let a = compute_bundle(&ds, BundleRequest::Yearly { year: 1980 });
        let b = compute_bundle(&ds, BundleRequest::Yearly { year: 1980 });
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
