//! Presentation adapter: aggregate bundles to chart descriptors.
//!
//! Front-ends never look at `SeriesPoint` keys directly; they render the
//! descriptors built here (kind, title, axis labels, traces).

use crate::domain::{AggregateBundle, ChartId, ChartKind, ChartSeries, DimensionValue};

pub mod format;

pub use format::{format_bundle, format_response, format_year_list};

/// One plotted point. Categorical axes use the category index as `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct TracePoint {
    pub label: String,
    pub x: f64,
    pub y: f64,
}

/// A named run of points drawn in one colour.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub points: Vec<TracePoint>,
}

/// Everything a renderer needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDescriptor {
    pub chart: ChartId,
    pub kind: ChartKind,
    pub title: String,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub traces: Vec<Trace>,
}

/// A slice of a pie chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    /// Share of the total in percent; 0 when the total is 0.
    pub percent: f64,
}

impl ChartDescriptor {
    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.points.is_empty())
    }

    /// Padded `[min, max]` bounds over all traces, or `None` when empty.
    ///
    /// The y range always includes 0 so bars and stems start at the axis.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let points = self.traces.iter().flat_map(|t| t.points.iter());
        let (mut x0, mut x1, mut y0, mut y1) = (f64::INFINITY, f64::NEG_INFINITY, 0.0_f64, 0.0_f64);
        let mut any = false;
        for p in points {
            any = true;
            x0 = x0.min(p.x);
            x1 = x1.max(p.x);
            y0 = y0.min(p.y);
            y1 = y1.max(p.y);
        }
        if !any || !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) {
            return None;
        }
        if x1 <= x0 {
            x0 -= 0.5;
            x1 += 0.5;
        }
        if y1 <= y0 {
            y1 = y0 + 1.0;
        }
        let x_pad = (x1 - x0) * 0.02;
        let y_pad = (y1 - y0) * 0.05;
        Some(([x0 - x_pad, x1 + x_pad], [y0, y1 + y_pad]))
    }

    /// Slices of the first trace, for pie charts.
    pub fn pie_slices(&self) -> Vec<PieSlice> {
        let Some(trace) = self.traces.first() else {
            return Vec::new();
        };
        let total: f64 = trace.points.iter().map(|p| p.y).sum();
        trace
            .points
            .iter()
            .map(|p| PieSlice {
                label: p.label.clone(),
                value: p.y,
                percent: if total > 0.0 { p.y / total * 100.0 } else { 0.0 },
            })
            .collect()
    }
}

/// Describe all four charts of a bundle, in order.
pub fn describe_bundle(bundle: &AggregateBundle) -> Vec<ChartDescriptor> {
    bundle.series.iter().map(describe_series).collect()
}

pub fn describe_series(series: &ChartSeries) -> ChartDescriptor {
    let (x_label, y_label) = axis_labels(series.chart);
    let traces = match series.chart {
        ChartId::RecessionUnemploymentEffect => traces_by_vehicle_type(series),
        _ => vec![single_trace(series)],
    };
    ChartDescriptor {
        chart: series.chart,
        kind: series.kind,
        title: series.title.clone(),
        x_label,
        y_label,
        traces,
    }
}

fn axis_labels(chart: ChartId) -> (&'static str, &'static str) {
    match chart {
        ChartId::RecessionSalesByYear | ChartId::YearlySalesTrend => ("Year", "Automobile Sales"),
        ChartId::YearlyMonthlySales => ("Month", "Automobile Sales"),
        ChartId::RecessionSalesByVehicleType | ChartId::YearlySalesByVehicleType => {
            ("Vehicle Type", "Automobile Sales")
        }
        ChartId::RecessionAdExpenditureByVehicleType | ChartId::YearlyAdExpenditureByVehicleType => {
            ("Vehicle Type", "Advertising Expenditure")
        }
        ChartId::RecessionUnemploymentEffect => ("Unemployment Rate", "Average Automobile Sales"),
    }
}

fn single_trace(series: &ChartSeries) -> Trace {
    let points = series
        .points
        .iter()
        .enumerate()
        .map(|(idx, p)| TracePoint {
            label: p.key.to_string(),
            x: p.key.as_f64().unwrap_or(idx as f64),
            y: p.value,
        })
        .collect();
    Trace {
        name: series.title.clone(),
        points,
    }
}

/// One trace per vehicle type, in first-seen order of the (sorted) series.
fn traces_by_vehicle_type(series: &ChartSeries) -> Vec<Trace> {
    let mut traces: Vec<Trace> = Vec::new();
    for p in &series.points {
        let DimensionValue::UnemploymentByVehicleType { rate, vehicle_type } = &p.key else {
            continue;
        };
        let point = TracePoint {
            label: format!("{rate}"),
            x: *rate,
            y: p.value,
        };
        match traces.iter_mut().find(|t| &t.name == vehicle_type) {
            Some(trace) => trace.points.push(point),
            None => traces.push(Trace {
                name: vehicle_type.clone(),
                points: vec![point],
            }),
        }
    }
    traces
}
