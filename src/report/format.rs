//! Plain-text rendering of bundles for the `report` command.
//!
//! We keep formatting code in one place so output changes are localized.

use crate::domain::{AggregateBundle, ChartId, ChartKind, SelectionResponse, selectable_years};
use crate::report::{ChartDescriptor, describe_bundle};

/// Format a full selection response: header plus one table per chart.
pub fn format_response(response: &SelectionResponse) -> String {
    match &response.bundle {
        Some(bundle) => format_bundle(bundle),
        None => "No charts for this selection.\n".to_string(),
    }
}

pub fn format_bundle(bundle: &AggregateBundle) -> String {
    let mut out = String::new();
    out.push_str("=== Automobile Sales Dashboard ===\n");
    out.push_str(&format!("Report: {}\n", bundle.report_type.display_name()));
    match bundle.year {
        Some(year) => out.push_str(&format!("Year: {year}\n")),
        None => out.push_str("Year: (ignored)\n"),
    }

    for (idx, descriptor) in describe_bundle(bundle).iter().enumerate() {
        out.push('\n');
        out.push_str(&format!(
            "[{}] {} ({})\n",
            idx + 1,
            descriptor.title,
            descriptor.kind.as_str()
        ));
        out.push_str(&format_table(descriptor));
    }
    out
}

fn format_table(descriptor: &ChartDescriptor) -> String {
    if descriptor.is_empty() {
        return "(no data)\n".to_string();
    }

    let grouped = descriptor.chart == ChartId::RecessionUnemploymentEffect;
    let pie = descriptor.kind == ChartKind::Pie;

    let mut out = String::new();
    let header = if grouped {
        format!("{:<20} {:<16} {:>14}", descriptor.x_label, "Vehicle Type", descriptor.y_label)
    } else if pie {
        format!("{:<20} {:>14} {:>8}", descriptor.x_label, descriptor.y_label, "share")
    } else {
        format!("{:<20} {:>14}", descriptor.x_label, descriptor.y_label)
    };
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(header.trim_end().chars().count()));
    out.push('\n');

    if grouped {
        for trace in &descriptor.traces {
            for p in &trace.points {
                let line = format!("{:<20} {:<16} {:>14.2}", p.label, truncate(&trace.name, 16), p.y);
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
    } else if pie {
        for slice in descriptor.pie_slices() {
            let line = format!(
                "{:<20} {:>14.2} {:>7.1}%",
                truncate(&slice.label, 20),
                slice.value,
                slice.percent
            );
            out.push_str(line.trim_end());
            out.push('\n');
        }
    } else {
        for trace in &descriptor.traces {
            for p in &trace.points {
                let line = format!("{:<20} {:>14.2}", truncate(&p.label, 20), p.y);
                out.push_str(line.trim_end());
                out.push('\n');
            }
        }
    }
    out
}

/// The year selector's options, one per line.
pub fn format_year_list() -> String {
    let mut out = String::new();
    for year in selectable_years() {
        out.push_str(&format!("{year}\n"));
    }
    out
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::sample_dataset;
    use crate::aggregate::{recession_bundle, yearly_bundle};

    #[test]
    fn yearly_report_lists_titles_and_values() {
        let text = format_bundle(&yearly_bundle(&sample_dataset(), 1980));
        assert!(text.contains("Report: Yearly Statistics"));
        assert!(text.contains("[2] Total Monthly Automobile Sales in 1980 (line)"));
        assert!(text.contains("350.00"));
        assert!(text.contains("66.7%"));
    }

    #[test]
    fn recession_report_shows_grouped_rows() {
        let text = format_bundle(&recession_bundle(&sample_dataset()));
        assert!(text.contains("Year: (ignored)"));
        assert!(text.contains("Unemployment Rate"));
        assert!(text.lines().any(|l| l.starts_with("7.5") && l.contains("Sedan") && l.ends_with("200.00")));
    }

    #[test]
    fn empty_charts_render_placeholder() {
        let text = format_bundle(&yearly_bundle(&sample_dataset(), 2000));
        assert_eq!(text.matches("(no data)").count(), 3);
    }

    #[test]
    fn no_bundle_response() {
        let r = SelectionResponse {
            year_input_disabled: false,
            bundle: None,
        };
        assert_eq!(format_response(&r), "No charts for this selection.\n");
    }

    #[test]
    fn year_list_is_inclusive() {
        let text = format_year_list();
        assert!(text.starts_with("1980\n"));
        assert!(text.ends_with("2013\n"));
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("Supperminicar", 6), "Suppe.");
        assert_eq!(truncate("Sedan", 6), "Sedan");
    }
}
