//! Plotters-powered chart widget for Ratatui.
//!
//! Line charts and the grouped unemployment chart go through Plotters for its
//! axis and tick rendering; plain bar and pie charts use Ratatui widgets.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// How the traces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotStyle {
    /// Connected line per trace.
    Line,
    /// Vertical stem from zero to each point; traces sharing an x are nudged apart.
    Stems,
}

/// One coloured series.
pub struct PlotTrace {
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
}

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call.
pub struct SeriesPlot<'a> {
    pub traces: &'a [PlotTrace],
    pub style: PlotStyle,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl<'a> Widget for SeriesPlot<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(self.x_label)
                .y_desc(self.y_label)
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            match self.style {
                PlotStyle::Line => {
                    for trace in self.traces {
                        chart.draw_series(LineSeries::new(trace.points.iter().copied(), &trace.color))?;
                    }
                }
                PlotStyle::Stems => {
                    let n = self.traces.len() as f64;
                    let step = (x1 - x0) * 0.006;
                    for (idx, trace) in self.traces.iter().enumerate() {
                        let offset = (idx as f64 - (n - 1.0) / 2.0) * step;
                        chart.draw_series(trace.points.iter().map(|&(x, y)| {
                            PathElement::new(vec![(x + offset, 0.0), (x + offset, y)], trace.color)
                        }))?;
                    }
                }
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_area_renders_hint_instead_of_chart() {
        let area = Rect::new(0, 0, 10, 4);
        let mut buf = Buffer::empty(Rect::new(0, 0, 60, 4));
        let traces = [PlotTrace {
            points: vec![(0.0, 1.0), (1.0, 2.0)],
            color: RGBColor(0, 255, 255),
        }];
        SeriesPlot {
            traces: &traces,
            style: PlotStyle::Line,
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 2.0],
            x_label: "x",
            y_label: "y",
            fmt_x: |v| format!("{v:.0}"),
            fmt_y: |v| format!("{v:.0}"),
        }
        .render(area, &mut buf);
        assert_eq!(buf[(0, 0)].symbol(), "C");
    }
}
