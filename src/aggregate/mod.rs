//! Group-then-reduce aggregation engine.
//!
//! Every chart is a single pass over the normalized records: a filter picks
//! the rows, a key function picks the group, and a [`Reducer`] folds the
//! values. Groups live in a `BTreeMap`, so output order is the natural key
//! order (ascending years/months/rates, lexicographic vehicle types).
//!
//! Empty inputs produce empty series; nothing here can fail.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::domain::{
    AggregateBundle, ChartId, ChartSeries, DimensionValue, NormalizedDataset, ReportType, SalesRecord,
    SeriesPoint,
};

pub mod bundle;

pub use bundle::{BundleRequest, compute_bundle, recession_bundle, yearly_bundle};

/// How a group's values are folded into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Sum,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn finish(self, reducer: Reducer) -> f64 {
        match reducer {
            Reducer::Sum => self.sum,
            Reducer::Mean if self.count == 0 => 0.0,
            Reducer::Mean => self.sum / self.count as f64,
        }
    }
}

/// Which rows feed an aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFilter {
    All,
    Recession,
    Year(i32),
}

impl RecordFilter {
    pub fn matches(self, record: &SalesRecord) -> bool {
        match self {
            RecordFilter::All => true,
            RecordFilter::Recession => record.recession,
            RecordFilter::Year(year) => record.year == year,
        }
    }
}

/// Unemployment rate as a totally ordered group key.
#[derive(Debug, Clone, Copy)]
struct RateKey(f64);

impl PartialEq for RateKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RateKey {}

impl PartialOrd for RateKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RateKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Group `(key, value)` pairs and reduce each group.
pub fn group_reduce<K, I>(pairs: I, reducer: Reducer) -> Vec<(K, f64)>
where
    K: Ord,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for (key, value) in pairs {
        groups.entry(key).or_default().push(value);
    }
    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.finish(reducer)))
        .collect()
}

fn aggregate<'a, K, FK, FV>(
    dataset: &'a NormalizedDataset,
    filter: RecordFilter,
    key: FK,
    value: FV,
    reducer: Reducer,
) -> Vec<(K, f64)>
where
    K: Ord,
    FK: Fn(&'a SalesRecord) -> K,
    FV: Fn(&'a SalesRecord) -> f64,
{
    let pairs = dataset
        .records()
        .iter()
        .filter(|r| filter.matches(r))
        .map(|r| (key(r), value(r)));
    group_reduce(pairs, reducer)
}

fn by_year(dataset: &NormalizedDataset, filter: RecordFilter) -> Vec<SeriesPoint> {
    aggregate(dataset, filter, |r| r.year, |r| r.automobile_sales, Reducer::Mean)
        .into_iter()
        .map(|(year, value)| SeriesPoint {
            key: DimensionValue::Year(year),
            value,
        })
        .collect()
}

fn by_vehicle_type<FV>(
    dataset: &NormalizedDataset,
    filter: RecordFilter,
    value: FV,
    reducer: Reducer,
) -> Vec<SeriesPoint>
where
    FV: Fn(&SalesRecord) -> f64,
{
    aggregate(dataset, filter, |r| r.vehicle_type.as_str(), value, reducer)
        .into_iter()
        .map(|(vehicle_type, value)| SeriesPoint {
            key: DimensionValue::VehicleType(vehicle_type.to_string()),
            value,
        })
        .collect()
}

/// Recession chart 1: mean sales per year over recession rows.
pub fn recession_sales_by_year(dataset: &NormalizedDataset) -> Vec<SeriesPoint> {
    by_year(dataset, RecordFilter::Recession)
}

/// Recession chart 2: mean sales per vehicle type over recession rows.
pub fn recession_sales_by_vehicle_type(dataset: &NormalizedDataset) -> Vec<SeriesPoint> {
    by_vehicle_type(dataset, RecordFilter::Recession, |r| r.automobile_sales, Reducer::Mean)
}

/// Recession chart 3: total advertising expenditure per vehicle type.
pub fn recession_ad_expenditure_by_vehicle_type(dataset: &NormalizedDataset) -> Vec<SeriesPoint> {
    by_vehicle_type(
        dataset,
        RecordFilter::Recession,
        |r| r.advertising_expenditure,
        Reducer::Sum,
    )
}

/// Recession chart 4: mean sales per `(unemployment_rate, vehicle_type)`.
pub fn recession_unemployment_effect(dataset: &NormalizedDataset) -> Vec<SeriesPoint> {
    aggregate(
        dataset,
        RecordFilter::Recession,
        |r| (RateKey(r.unemployment_rate), r.vehicle_type.as_str()),
        |r| r.automobile_sales,
        Reducer::Mean,
    )
    .into_iter()
    .map(|((rate, vehicle_type), value)| SeriesPoint {
        key: DimensionValue::UnemploymentByVehicleType {
            rate: rate.0,
            vehicle_type: vehicle_type.to_string(),
        },
        value,
    })
    .collect()
}

/// Yearly chart 1: mean sales per year over the whole dataset.
pub fn yearly_sales_trend(dataset: &NormalizedDataset) -> Vec<SeriesPoint> {
    by_year(dataset, RecordFilter::All)
}

/// Yearly chart 2: total sales per month within `year`.
pub fn monthly_sales(dataset: &NormalizedDataset, year: i32) -> Vec<SeriesPoint> {
    aggregate(
        dataset,
        RecordFilter::Year(year),
        |r| r.month,
        |r| r.automobile_sales,
        Reducer::Sum,
    )
    .into_iter()
    .map(|(month, value)| SeriesPoint {
        key: DimensionValue::Month(month),
        value,
    })
    .collect()
}

/// Yearly chart 3: mean sales per vehicle type within `year`.
pub fn sales_by_vehicle_type(dataset: &NormalizedDataset, year: i32) -> Vec<SeriesPoint> {
    by_vehicle_type(dataset, RecordFilter::Year(year), |r| r.automobile_sales, Reducer::Mean)
}

/// Yearly chart 4: total advertising expenditure per vehicle type within `year`.
pub fn ad_expenditure_by_vehicle_type(dataset: &NormalizedDataset, year: i32) -> Vec<SeriesPoint> {
    by_vehicle_type(
        dataset,
        RecordFilter::Year(year),
        |r| r.advertising_expenditure,
        Reducer::Sum,
    )
}

fn series(chart: ChartId, year: i32, points: Vec<SeriesPoint>) -> ChartSeries {
    ChartSeries {
        chart,
        kind: chart.kind(),
        title: chart.title(year),
        points,
    }
}

pub(crate) fn build_bundle(
    report_type: ReportType,
    year: Option<i32>,
    charts: [(ChartId, Vec<SeriesPoint>); 4],
) -> AggregateBundle {
    let title_year = year.unwrap_or_default();
    AggregateBundle {
        report_type,
        year,
        series: charts.map(|(chart, points)| series(chart, title_year, points)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) fn rec(
        year: i32,
        month: u32,
        vehicle_type: &str,
        sales: f64,
        adv: f64,
        unemployment: f64,
        recession: bool,
    ) -> SalesRecord {
        SalesRecord::new(
            NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            vehicle_type,
            sales,
            adv,
            unemployment,
            recession,
        )
    }

    pub(crate) fn sample_dataset() -> NormalizedDataset {
        NormalizedDataset::from_records(vec![
            rec(1980, 1, "Sedan", 100.0, 10.0, 6.0, true),
            rec(1980, 2, "Sports", 50.0, 20.0, 6.0, true),
            rec(1980, 2, "Sedan", 300.0, 30.0, 7.5, false),
            rec(1981, 1, "Sedan", 200.0, 0.0, 7.5, true),
            rec(1981, 3, "Executivecar", 40.0, 5.0, 7.5, false),
            rec(1982, 5, "Sports", 70.0, 15.0, 6.0, false),
        ])
    }

    fn keys(points: &[SeriesPoint]) -> Vec<String> {
        points.iter().map(|p| p.key.to_string()).collect()
    }

    fn values(points: &[SeriesPoint]) -> Vec<f64> {
        points.iter().map(|p| p.value).collect()
    }

    #[test]
    fn group_reduce_mean_and_sum() {
        let pairs = vec![("b", 1.0), ("a", 2.0), ("b", 3.0)];
        assert_eq!(group_reduce(pairs.clone(), Reducer::Mean), vec![("a", 2.0), ("b", 2.0)]);
        assert_eq!(group_reduce(pairs, Reducer::Sum), vec![("a", 2.0), ("b", 4.0)]);
        assert!(group_reduce(Vec::<(i32, f64)>::new(), Reducer::Sum).is_empty());
    }

    #[test]
    fn recession_sales_by_year_uses_recession_rows_only() {
        let pts = recession_sales_by_year(&sample_dataset());
        assert_eq!(keys(&pts), vec!["1980", "1981"]);
        assert_eq!(values(&pts), vec![75.0, 200.0]);
    }

    #[test]
    fn recession_vehicle_type_aggregates() {
        let ds = sample_dataset();
        let sales = recession_sales_by_vehicle_type(&ds);
        assert_eq!(keys(&sales), vec!["Sedan", "Sports"]);
        assert_eq!(values(&sales), vec![150.0, 50.0]);

        let adv = recession_ad_expenditure_by_vehicle_type(&ds);
        assert_eq!(values(&adv), vec![10.0, 20.0]);
    }

    #[test]
    fn zero_expenditure_group_is_kept() {
        let ds = NormalizedDataset::from_records(vec![rec(1990, 1, "Sedan", 10.0, 0.0, 5.0, true)]);
        let adv = recession_ad_expenditure_by_vehicle_type(&ds);
        assert_eq!(adv.len(), 1);
        assert_eq!(adv[0].value, 0.0);
    }

    #[test]
    fn unemployment_effect_groups_by_rate_then_type() {
        let pts = recession_unemployment_effect(&sample_dataset());
        assert_eq!(pts.len(), 3);
        assert_eq!(
            pts[0].key,
            DimensionValue::UnemploymentByVehicleType {
                rate: 6.0,
                vehicle_type: "Sedan".to_string()
            }
        );
        assert_eq!(pts[1].key.vehicle_type(), Some("Sports"));
        assert_eq!(pts[2].key.as_f64(), Some(7.5));
        assert_eq!(values(&pts), vec![100.0, 50.0, 200.0]);
    }

    #[test]
    fn yearly_trend_spans_whole_dataset() {
        let pts = yearly_sales_trend(&sample_dataset());
        assert_eq!(keys(&pts), vec!["1980", "1981", "1982"]);
        assert_eq!(values(&pts), vec![150.0, 120.0, 70.0]);
    }

    #[test]
    fn monthly_sales_sums_within_year() {
        let pts = monthly_sales(&sample_dataset(), 1980);
        assert_eq!(keys(&pts), vec!["1", "2"]);
        assert_eq!(values(&pts), vec![100.0, 350.0]);
        assert!(monthly_sales(&sample_dataset(), 1999).is_empty());
    }

    #[test]
    fn yearly_vehicle_type_aggregates() {
        let ds = sample_dataset();
        let sales = sales_by_vehicle_type(&ds, 1981);
        assert_eq!(keys(&sales), vec!["Executivecar", "Sedan"]);
        assert_eq!(values(&sales), vec![40.0, 200.0]);

        let adv = ad_expenditure_by_vehicle_type(&ds, 1980);
        assert_eq!(keys(&adv), vec!["Sedan", "Sports"]);
        assert_eq!(values(&adv), vec![40.0, 20.0]);
    }

    #[test]
    fn expenditure_sums_are_non_negative() {
        let ds = sample_dataset();
        for year in 1980..=1982 {
            assert!(ad_expenditure_by_vehicle_type(&ds, year).iter().all(|p| p.value >= 0.0));
        }
        assert!(recession_ad_expenditure_by_vehicle_type(&ds).iter().all(|p| p.value >= 0.0));
    }
}
