use crate::error::GatewayError;
use crate::lifecycle::{LifecycleState, QueryLifecycle, RequestId, RequestTicket, Resolution};
use crate::model::ResultModel;
use crate::presenter::{ResultPresenter, Tab};
use crate::scenarios::Scenario;
use std::path::PathBuf;

pub const SUCCESS_BANNER: &str = "✅ Analysis complete! Review all tabs for comprehensive guidance.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Query,
    Location,
    Results,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Query => Focus::Location,
            Focus::Location => Focus::Results,
            Focus::Results => Focus::Query,
        }
    }
}

pub struct UiState {
    pub focus: Focus,
    pub query_input: String,
    pub location_input: String,
    pub scenario: Option<Scenario>,
    pub lifecycle: QueryLifecycle,
    // Rebuilt whenever a new result lands; holds the active tab.
    pub presenter: Option<ResultPresenter>,
    pub submitted_location: String,
    pub scroll: u16,
    pub show_help: bool,
    pub info: String,
    pub base_url: String,
    pub export_dir: Option<PathBuf>,
    pub last_exported_path: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            focus: Focus::Query,
            query_input: String::new(),
            location_input: "Boston, MA".into(),
            scenario: None,
            lifecycle: QueryLifecycle::default(),
            presenter: None,
            submitted_location: String::new(),
            scroll: 0,
            show_help: false,
            info: String::new(),
            base_url: String::new(),
            export_dir: None,
            last_exported_path: None,
        }
    }
}

impl UiState {
    /// Scenario text wins over the custom query box.
    pub fn effective_query(&self) -> &str {
        match self.scenario {
            Some(s) => s.query(),
            None => &self.query_input,
        }
    }

    /// Validate and start a submission. `None` means nothing should be sent.
    pub fn submit(&mut self) -> Option<RequestTicket> {
        let query = self.effective_query().to_string();
        let location = self.location_input.clone();
        match self.lifecycle.submit(&query, &location) {
            Ok(ticket) => {
                self.presenter = None;
                self.scroll = 0;
                self.submitted_location = location;
                self.info = format!("Submitted request {}", ticket.id);
                Some(ticket)
            }
            Err(e) => {
                self.info = e.to_string();
                None
            }
        }
    }

    pub fn apply_resolution(
        &mut self,
        id: RequestId,
        outcome: Result<ResultModel, GatewayError>,
    ) -> Resolution {
        if self.lifecycle.resolve(id, outcome) == Resolution::Stale {
            return Resolution::Stale;
        }
        match self.lifecycle.state() {
            LifecycleState::Succeeded { result } => {
                self.presenter = Some(ResultPresenter::new(
                    result.clone(),
                    &self.submitted_location,
                ));
                self.focus = Focus::Results;
                self.scroll = 0;
                self.info = SUCCESS_BANNER.into();
            }
            LifecycleState::Failed { message, .. } => {
                self.info = message.clone();
            }
            LifecycleState::Idle | LifecycleState::InFlight { .. } => {}
        }
        Resolution::Applied
    }

    pub fn reset(&mut self) {
        self.lifecycle.reset();
        self.presenter = None;
        self.scroll = 0;
        self.info = "Cleared".into();
    }

    pub fn select_tab(&mut self, tab: Tab) {
        if let Some(p) = self.presenter.as_mut() {
            p.select(tab);
            self.scroll = 0;
        }
    }

    pub fn next_tab(&mut self) {
        if let Some(p) = self.presenter.as_mut() {
            p.next_tab();
            self.scroll = 0;
        }
    }

    pub fn prev_tab(&mut self) {
        if let Some(p) = self.presenter.as_mut() {
            p.prev_tab();
            self.scroll = 0;
        }
    }

    /// Typing into the query box switches back to a custom query.
    pub fn push_char(&mut self, c: char) {
        match self.focus {
            Focus::Query => {
                if self.scenario.take().is_some() {
                    self.query_input.clear();
                }
                self.query_input.push(c);
            }
            Focus::Location => self.location_input.push(c),
            Focus::Results => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            Focus::Query => {
                if self.scenario.take().is_some() {
                    self.query_input.clear();
                } else {
                    self.query_input.pop();
                }
            }
            Focus::Location => {
                self.location_input.pop();
            }
            Focus::Results => {}
        }
    }

    pub fn cycle_scenario(&mut self, forward: bool) {
        self.scenario = Scenario::cycle(self.scenario, forward);
        self.info = match self.scenario {
            Some(s) => format!("Demo scenario: {}", s.title()),
            None => "Custom query".into(),
        };
    }
}
