//! Selection state machine for the two coupled selectors.
//!
//! The only state is the pair of selector values. The phase is derived from
//! the report type, and `transition` is a pure function returning the next
//! state plus the side effects the host has to apply (toggle the year input,
//! emit a bundle, clear the charts).
//!
//! [`on_selection_changed`] is the stateless form used by callers that hand us
//! the full selection on every change; [`DashboardSession`] applies the side
//! effects against a dataset for interactive front-ends.

use serde::Serialize;

use crate::aggregate::{BundleRequest, compute_bundle};
use crate::domain::{
    AggregateBundle, NormalizedDataset, ReportType, SelectionResponse, SelectionState, is_supported_year,
};

/// Derived phase of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SelectionPhase {
    /// No recognized report type selected.
    Initial,
    YearlyActive,
    RecessionActive,
}

/// A selector change raised by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// `None` means the selector was cleared or held an unknown value.
    ReportTypeChanged(Option<ReportType>),
    /// `None` means the year was cleared. Out-of-range years count as cleared.
    YearChanged(Option<i32>),
}

/// What the host must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    SetYearInputDisabled(bool),
    Emit(BundleRequest),
    /// Remove any displayed charts.
    ClearOutput,
}

/// The machine's state: the two selector values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selector {
    selection: SelectionState,
}

impl Default for Selector {
    /// Nothing selected yet; the year holds its default of 1980.
    fn default() -> Self {
        Self {
            selection: SelectionState {
                report_type: None,
                year: Some(crate::domain::DEFAULT_YEAR),
            },
        }
    }
}

impl Selector {
    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn phase(&self) -> SelectionPhase {
        match self.selection.report_type {
            None => SelectionPhase::Initial,
            Some(ReportType::Yearly) => SelectionPhase::YearlyActive,
            Some(ReportType::Recession) => SelectionPhase::RecessionActive,
        }
    }

    pub fn year_input_disabled(&self) -> bool {
        self.phase() == SelectionPhase::RecessionActive
    }
}

/// Pure transition function.
pub fn transition(state: Selector, event: SelectionEvent) -> (Selector, Vec<SideEffect>) {
    let mut next = state;
    let effects = match event {
        SelectionEvent::ReportTypeChanged(report_type) => {
            next.selection.report_type = report_type;
            match report_type {
                Some(ReportType::Recession) => vec![
                    SideEffect::SetYearInputDisabled(true),
                    SideEffect::Emit(BundleRequest::Recession),
                ],
                Some(ReportType::Yearly) => vec![
                    SideEffect::SetYearInputDisabled(false),
                    yearly_effect(next.selection.year),
                ],
                None => vec![SideEffect::SetYearInputDisabled(false), SideEffect::ClearOutput],
            }
        }
        SelectionEvent::YearChanged(year) => {
            next.selection.year = year.filter(|y| is_supported_year(*y));
            match state.phase() {
                SelectionPhase::YearlyActive => vec![yearly_effect(next.selection.year)],
                // Stored for later; the input is disabled or nothing is shown.
                SelectionPhase::RecessionActive | SelectionPhase::Initial => Vec::new(),
            }
        }
    };
    tracing::debug!(?event, from = ?state.phase(), to = ?next.phase(), ?effects, "selection transition");
    (next, effects)
}

fn yearly_effect(year: Option<i32>) -> SideEffect {
    match year {
        Some(year) => SideEffect::Emit(BundleRequest::Yearly { year }),
        None => SideEffect::ClearOutput,
    }
}

/// The bundle a complete selection asks for, if any.
pub fn bundle_request(state: &SelectionState) -> Option<BundleRequest> {
    match state.report_type? {
        ReportType::Recession => Some(BundleRequest::Recession),
        ReportType::Yearly => state
            .year
            .filter(|y| is_supported_year(*y))
            .map(|year| BundleRequest::Yearly { year }),
    }
}

/// Stateless selection handler: full selection in, response out.
pub fn on_selection_changed(dataset: &NormalizedDataset, state: &SelectionState) -> SelectionResponse {
    SelectionResponse {
        year_input_disabled: state.report_type == Some(ReportType::Recession),
        bundle: bundle_request(state).map(|req| compute_bundle(dataset, req)),
    }
}

/// Interactive driver: owns the selector and applies side effects.
#[derive(Debug, Clone)]
pub struct DashboardSession<'a> {
    dataset: &'a NormalizedDataset,
    selector: Selector,
    year_input_disabled: bool,
    bundle: Option<AggregateBundle>,
}

impl<'a> DashboardSession<'a> {
    pub fn new(dataset: &'a NormalizedDataset) -> Self {
        Self {
            dataset,
            selector: Selector::default(),
            year_input_disabled: false,
            bundle: None,
        }
    }

    /// Start a session and replay `initial` as the UI's first callbacks.
    pub fn start(dataset: &'a NormalizedDataset, initial: SelectionState) -> Self {
        let mut session = Self::new(dataset);
        session.handle(SelectionEvent::YearChanged(initial.year));
        session.handle(SelectionEvent::ReportTypeChanged(initial.report_type));
        session
    }

    pub fn selector(&self) -> Selector {
        self.selector
    }

    pub fn year_input_disabled(&self) -> bool {
        self.year_input_disabled
    }

    pub fn bundle(&self) -> Option<&AggregateBundle> {
        self.bundle.as_ref()
    }

    pub fn response(&self) -> SelectionResponse {
        SelectionResponse {
            year_input_disabled: self.year_input_disabled,
            bundle: self.bundle.clone(),
        }
    }

    /// Apply one event. Returns `true` when the displayed bundle was recomputed or cleared.
    pub fn handle(&mut self, event: SelectionEvent) -> bool {
        let (next, effects) = transition(self.selector, event);
        self.selector = next;
        let mut output_changed = false;
        for effect in effects {
            match effect {
                SideEffect::SetYearInputDisabled(disabled) => self.year_input_disabled = disabled,
                SideEffect::Emit(request) => {
                    self.bundle = Some(compute_bundle(self.dataset, request));
                    output_changed = true;
                }
                SideEffect::ClearOutput => {
                    self.bundle = None;
                    output_changed = true;
                }
            }
        }
        output_changed
    }
}
