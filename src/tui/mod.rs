//! Ratatui-based terminal UI.
//!
//! The dashboard has two selectors (report type and year) and a 2x2 grid with
//! the four charts of the current selection. Every selector change goes through
//! the [`DashboardSession`] state machine, which decides whether the year
//! selector is disabled and which bundle (if any) is shown.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use plotters::style::RGBColor;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::domain::{
    ChartId, ChartKind, DEFAULT_YEAR, DashboardConfig, NormalizedDataset, ReportType, YEAR_MAX, YEAR_MIN,
};
use crate::error::AppError;
use crate::report::{ChartDescriptor, describe_bundle};
use crate::selection::{DashboardSession, SelectionEvent, SelectionPhase};

mod plotters_chart;

use plotters_chart::{PlotStyle, PlotTrace, SeriesPlot};

const TITLE: &str = "Automobile Sales Dashboard";

/// Series colours, cycled per trace / bar / slice.
const PALETTE: [(u8, u8, u8); 6] = [
    (0, 255, 255),
    (255, 165, 0),
    (0, 255, 0),
    (255, 0, 255),
    (255, 255, 0),
    (100, 149, 237),
];

/// Start the TUI.
///
/// The dataset is loaded before the terminal switches to the alternate screen so
/// load errors print normally.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let dataset = crate::app::pipeline::shared_dataset(&config.source)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::terminal(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(dataset, &config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::terminal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::terminal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ReportType,
    Year,
}

struct App<'a> {
    session: DashboardSession<'a>,
    /// What the year selector shows. Kept while report type is recession.
    year_choice: Option<i32>,
    field: Field,
    charts: Vec<ChartDescriptor>,
    source: String,
    rows: usize,
    status: String,
}

impl<'a> App<'a> {
    fn new(dataset: &'a NormalizedDataset, config: &DashboardConfig) -> Self {
        let session = DashboardSession::start(dataset, config.selection);
        let mut app = Self {
            session,
            year_choice: config.selection.year,
            field: Field::ReportType,
            charts: Vec::new(),
            source: config.source.clone(),
            rows: dataset.len(),
            status: format!("Loaded {} records.", dataset.len()),
        };
        app.refresh_charts();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::terminal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::terminal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::terminal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                self.field = match self.field {
                    Field::ReportType => Field::Year,
                    Field::Year => Field::ReportType,
                };
            }
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::PageDown => self.adjust(-5),
            KeyCode::PageUp => self.adjust(5),
            KeyCode::Home => self.set_year_if_enabled(YEAR_MIN),
            KeyCode::End => self.set_year_if_enabled(YEAR_MAX),
            KeyCode::Backspace | KeyCode::Delete => self.clear_field(),
            _ => {}
        }
        false
    }

    fn adjust(&mut self, delta: i32) {
        match self.field {
            Field::ReportType => {
                let current = self.session.selector().selection().report_type;
                let next = match current {
                    Some(rt) => rt.toggle(),
                    None if delta >= 0 => ReportType::Yearly,
                    None => ReportType::Recession,
                };
                self.apply(SelectionEvent::ReportTypeChanged(Some(next)));
                self.status = format!("Report: {}", next.display_name());
            }
            Field::Year => {
                let year = match self.year_choice {
                    Some(y) => (y + delta).clamp(YEAR_MIN, YEAR_MAX),
                    None => DEFAULT_YEAR,
                };
                self.set_year_if_enabled(year);
            }
        }
    }

    fn set_year_if_enabled(&mut self, year: i32) {
        if self.field != Field::Year {
            return;
        }
        if self.session.year_input_disabled() {
            self.status = "Year selection is disabled for recession statistics.".to_string();
            return;
        }
        self.year_choice = Some(year);
        self.apply(SelectionEvent::YearChanged(Some(year)));
        self.status = format!("Year: {year}");
    }

    fn clear_field(&mut self) {
        match self.field {
            Field::ReportType => {
                self.apply(SelectionEvent::ReportTypeChanged(None));
                self.status = "Report type cleared.".to_string();
            }
            Field::Year => {
                if self.session.year_input_disabled() {
                    self.status = "Year selection is disabled for recession statistics.".to_string();
                    return;
                }
                self.year_choice = None;
                self.apply(SelectionEvent::YearChanged(None));
                self.status = "Year cleared.".to_string();
            }
        }
    }

    fn apply(&mut self, event: SelectionEvent) {
        if self.session.handle(event) {
            self.refresh_charts();
        }
    }

    fn refresh_charts(&mut self) {
        self.charts = self.session.bundle().map(describe_bundle).unwrap_or_default();
        tracing::debug!(charts = self.charts.len(), "refreshed dashboard charts");
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_selectors(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(TITLE, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  | source: {} | records: {}", self.source, self.rows),
                Style::default().fg(Color::Gray),
            ),
        ]);
        let p = Paragraph::new(line)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_selectors(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selection = self.session.selector().selection();
        let report = selection
            .report_type
            .map(ReportType::display_name)
            .unwrap_or("Select a report type");
        let year = self
            .year_choice
            .map(|y| y.to_string())
            .unwrap_or_else(|| "Select-year".to_string());

        let disabled = self.session.year_input_disabled();
        let year_style = if disabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let year_text = if disabled { format!("{year} (disabled)") } else { year };

        let items = vec![
            ListItem::new(format!("Select Statistics: {report}")),
            ListItem::new(format!("Select Year: {year_text}")).style(year_style),
        ];
        let list = List::new(items)
            .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(match self.field {
            Field::ReportType => 0,
            Field::Year => 1,
        }));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if self.charts.is_empty() {
            let msg = match self.session.selector().phase() {
                SelectionPhase::Initial => "Select a report type to display charts.",
                _ => "Select a year between 1980 and 2013 to display yearly charts.",
            };
            let p = Paragraph::new(msg)
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().borders(Borders::ALL));
            frame.render_widget(p, area);
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        for (row_idx, row) in rows.iter().enumerate() {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row);
            for (col_idx, cell) in cells.iter().enumerate() {
                if let Some(descriptor) = self.charts.get(row_idx * 2 + col_idx) {
                    draw_chart(frame, *cell, descriptor);
                }
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ change  PgUp/PgDn ±5 years  Home/End first/last  Del clear  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, descriptor: &ChartDescriptor) {
    let block = Block::default()
        .title(descriptor.title.as_str())
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    if descriptor.is_empty() {
        let msg = Paragraph::new("No data for this selection.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(msg, inner);
        return;
    }

    match descriptor.kind {
        ChartKind::Line => draw_plot(frame, inner, descriptor, PlotStyle::Line),
        ChartKind::Bar if descriptor.chart == ChartId::RecessionUnemploymentEffect => {
            draw_grouped(frame, inner, descriptor)
        }
        ChartKind::Bar => draw_bars(frame, inner, descriptor),
        ChartKind::Pie => draw_shares(frame, inner, descriptor),
    }
}

fn draw_plot(frame: &mut ratatui::Frame<'_>, area: Rect, descriptor: &ChartDescriptor, style: PlotStyle) {
    let Some((x_bounds, y_bounds)) = descriptor.bounds() else {
        return;
    };
    let traces: Vec<PlotTrace> = descriptor
        .traces
        .iter()
        .enumerate()
        .map(|(idx, t)| PlotTrace {
            points: t.points.iter().map(|p| (p.x, p.y)).collect(),
            color: plot_color(idx),
        })
        .collect();
    let fmt_x: fn(f64) -> String = match descriptor.chart {
        ChartId::RecessionUnemploymentEffect => fmt_axis_rate,
        _ => fmt_axis_whole,
    };
    let widget = SeriesPlot {
        traces: &traces,
        style,
        x_bounds,
        y_bounds,
        x_label: descriptor.x_label,
        y_label: descriptor.y_label,
        fmt_x,
        fmt_y: fmt_axis_whole,
    };
    frame.render_widget(widget, area);
}

/// Legend line above a stem plot, one coloured entry per vehicle type.
fn draw_grouped(frame: &mut ratatui::Frame<'_>, area: Rect, descriptor: &ChartDescriptor) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let legend: Vec<Span> = descriptor
        .traces
        .iter()
        .enumerate()
        .flat_map(|(idx, t)| {
            [
                Span::styled("■ ", Style::default().fg(term_color(idx))),
                Span::raw(format!("{}  ", t.name)),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(legend)), chunks[0]);
    draw_plot(frame, chunks[1], descriptor, PlotStyle::Stems);
}

fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, descriptor: &ChartDescriptor) {
    let Some(trace) = descriptor.traces.first() else {
        return;
    };
    let n = trace.points.len().max(1) as u16;
    let bar_width = (area.width / n).saturating_sub(1).clamp(1, 12);
    let label_width = bar_width as usize;

    let bars: Vec<Bar> = trace
        .points
        .iter()
        .enumerate()
        .map(|(idx, p)| {
            Bar::default()
                .value(p.y.max(0.0).round() as u64)
                .text_value(fmt_compact(p.y))
                .label(Line::from(crate::report::format::truncate(&p.label, label_width)))
                .style(Style::default().fg(term_color(idx)))
        })
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);
    frame.render_widget(chart, chunks[0]);
    frame.render_widget(
        Paragraph::new(descriptor.y_label).style(Style::default().fg(Color::Gray)),
        chunks[1],
    );
}

/// Pie charts as share rows: label, percentage and a proportional bar.
fn draw_shares(frame: &mut ratatui::Frame<'_>, area: Rect, descriptor: &ChartDescriptor) {
    let slices = descriptor.pie_slices();
    let label_width = slices.iter().map(|s| s.label.len()).max().unwrap_or(0).min(16);
    let bar_room = (area.width as usize).saturating_sub(label_width + 10);

    let lines: Vec<Line> = slices
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let filled = ((s.percent / 100.0) * bar_room as f64).round() as usize;
            Line::from(vec![
                Span::raw(format!(
                    "{:<width$} {:>6.1}% ",
                    crate::report::format::truncate(&s.label, label_width),
                    s.percent,
                    width = label_width
                )),
                Span::styled("█".repeat(filled), Style::default().fg(term_color(idx))),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(Text::from(lines)), area);
}

fn plot_color(idx: usize) -> RGBColor {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    RGBColor(r, g, b)
}

fn term_color(idx: usize) -> Color {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    Color::Rgb(r, g, b)
}

fn fmt_axis_whole(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_rate(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_compact(v: f64) -> String {
    if v.abs() >= 1_000_000.0 {
        format!("{:.1}M", v / 1_000_000.0)
    } else if v.abs() >= 10_000.0 {
        format!("{:.0}k", v / 1_000.0)
    } else {
        format!("{v:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::sample_dataset;
    use crate::domain::SelectionState;
    use ratatui::backend::TestBackend;

    fn config(selection: SelectionState) -> DashboardConfig {
        DashboardConfig {
            source: "sample.csv".to_string(),
            selection,
            log_file: None,
            export_json: None,
            export_csv: None,
        }
    }

    #[test]
    fn switching_to_recession_disables_year_and_keeps_choice() {
        let dataset = sample_dataset();
        let mut app = App::new(&dataset, &config(SelectionState::new(ReportType::Yearly, 1981)));
        assert_eq!(app.charts.len(), 4);
        assert_eq!(app.charts[1].title, "Total Monthly Automobile Sales in 1981");

        app.handle_key(KeyCode::Right);
        assert!(app.session.year_input_disabled());
        assert_eq!(app.charts[0].title, "Average Automobile Sales Fluctuation Over Recession Period");

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.year_choice, Some(1981));
        assert!(app.status.contains("disabled"));

        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Left);
        assert!(!app.session.year_input_disabled());
        assert_eq!(app.charts[1].title, "Total Monthly Automobile Sales in 1981");
    }

    #[test]
    fn year_keys_clamp_to_supported_range() {
        let dataset = sample_dataset();
        let mut app = App::new(&dataset, &config(SelectionState::new(ReportType::Yearly, 2012)));
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::PageUp);
        assert_eq!(app.year_choice, Some(YEAR_MAX));
        app.handle_key(KeyCode::Home);
        assert_eq!(app.year_choice, Some(YEAR_MIN));
        app.handle_key(KeyCode::Left);
        assert_eq!(app.year_choice, Some(YEAR_MIN));
    }

    #[test]
    fn clearing_selectors_clears_charts() {
        let dataset = sample_dataset();
        let mut app = App::new(&dataset, &config(SelectionState::default()));
        assert_eq!(app.charts.len(), 4);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Delete);
        assert!(app.charts.is_empty());
        app.handle_key(KeyCode::Right);
        assert_eq!(app.year_choice, Some(DEFAULT_YEAR));
        assert_eq!(app.charts.len(), 4);

        app.handle_key(KeyCode::Up);
        app.handle_key(KeyCode::Backspace);
        assert!(app.charts.is_empty());
        assert_eq!(app.session.selector().phase(), SelectionPhase::Initial);
    }

    #[test]
    fn quit_keys() {
        let dataset = sample_dataset();
        let mut app = App::new(&dataset, &config(SelectionState::default()));
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn draws_dashboard_into_test_backend() {
        let dataset = sample_dataset();
        let mut app = App::new(&dataset, &config(SelectionState::new(ReportType::Yearly, 1980)));
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains(TITLE));
        assert!(text.contains("Select Statistics: Yearly Statistics"));
        assert!(text.contains("Select Year: 1980"));
        assert!(text.contains("Total Monthly Automobile Sales in 1980"));
    }

    #[test]
    fn compact_values() {
        assert_eq!(fmt_compact(950.0), "950");
        assert_eq!(fmt_compact(25_000.0), "25k");
        assert_eq!(fmt_compact(2_500_000.0), "2.5M");
    }
}
