//! Drives one analysis round trip: validate, call the oracle, decode, record.

use rust_i18n::t;
use tracing::{info, warn};

use crate::error::{AppError, Result};
use crate::oracle::{Oracle, OracleRequest};
use crate::prompt;
use crate::report::Report;
use crate::store::history::HistoryStore;
use crate::store::schema::{AnalysisMode, HistoryRecord};
use crate::text::{normalize_input, normalize_optional};
use crate::view::ViewState;

/// User input for one analysis, already normalized.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisRequest {
    pub mode: AnalysisMode,
    pub primary: String,
    pub secondary: Option<String>,
    pub elaboration: Option<String>,
}

impl AnalysisRequest {
    pub fn new(mode: AnalysisMode, primary: &str, secondary: &str, elaboration: &str) -> Self {
        Self {
            mode,
            primary: normalize_input(primary),
            secondary: normalize_optional(secondary),
            elaboration: normalize_optional(elaboration),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.primary.is_empty() {
            return Err(AppError::Validation(t!("validation.primary_required").to_string()));
        }
        if self.mode.requires_secondary() && self.secondary.is_none() {
            return Err(AppError::Validation(t!("validation.secondary_required").to_string()));
        }
        Ok(())
    }

    /// The secondary subject, only where the mode uses one.
    fn effective_secondary(&self) -> Option<String> {
        if self.mode.requires_secondary() {
            self.secondary.clone()
        } else {
            None
        }
    }
}

/// A dispatched request waiting for its oracle reply.
#[derive(Clone, Debug)]
pub struct PendingAnalysis {
    pub request: AnalysisRequest,
    pub oracle_request: OracleRequest,
}

#[derive(Clone, Debug)]
pub struct PromptSettings {
    pub model: String,
    /// Report language passed to the model ("Arabic", "English").
    pub language: String,
}

/// Owns the view state and the history store for the analyzer.
///
/// At most one request is in flight; [`begin`](Self::begin) refuses a second
/// one with [`AppError::Busy`].
pub struct Orchestrator {
    view: ViewState,
    history: HistoryStore,
    settings: PromptSettings,
    in_flight: bool,
}

impl Orchestrator {
    pub fn new(history: HistoryStore, settings: PromptSettings) -> Self {
        Self {
            view: ViewState::Idle,
            history,
            settings,
            in_flight: false,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Validate and dispatch. On success the view is Loading and the caller
    /// must run `oracle_request` and hand the outcome to [`complete`](Self::complete).
    /// On error nothing has changed.
    pub fn begin(&mut self, request: AnalysisRequest) -> Result<PendingAnalysis> {
        if self.in_flight {
            return Err(AppError::Busy);
        }
        request.validate()?;
        self.view.begin_loading()?;
        self.in_flight = true;

        let oracle_request =
            prompt::analysis_request(&request, &self.settings.model, &self.settings.language);
        info!(mode = request.mode.as_str(), "analysis dispatched");
        Ok(PendingAnalysis {
            request,
            oracle_request,
        })
    }

    /// Apply the oracle outcome for a request started with [`begin`](Self::begin).
    pub fn complete(&mut self, pending: PendingAnalysis, outcome: Result<String>) -> &ViewState {
        self.in_flight = false;
        let request = pending.request;

        let decoded = outcome.and_then(|raw| Report::decode(&raw).map(|report| (raw, report)));
        match decoded {
            Ok((raw, report)) => {
                if let Err(e) = self.view.succeed(report) {
                    warn!(error = %e, "dropping oracle reply");
                    return &self.view;
                }
                self.history.append(HistoryRecord::new(
                    request.primary.clone(),
                    request.effective_secondary(),
                    request.mode,
                    raw,
                ));
                info!(mode = request.mode.as_str(), "analysis complete");
            }
            Err(e) => {
                warn!(error = %e, mode = request.mode.as_str(), "analysis failed");
                if let Err(transition) = self.view.fail(e.user_message()) {
                    warn!(error = %transition, "dropping oracle failure");
                }
            }
        }
        &self.view
    }

    /// Synchronous [`begin`](Self::begin) + oracle call + [`complete`](Self::complete).
    ///
    /// Returns `Err` only for local rejections (validation, busy, invalid
    /// state); oracle failures end up in the view as `Error`.
    pub fn submit(&mut self, oracle: &dyn Oracle, request: AnalysisRequest) -> Result<&ViewState> {
        let pending = self.begin(request)?;
        let outcome = oracle.generate(&pending.oracle_request);
        Ok(self.complete(pending, outcome))
    }

    /// Back to Idle from Success or Error.
    pub fn reset(&mut self) -> Result<()> {
        self.view.reset()
    }

    /// Show a stored report without contacting the oracle. Returns the record
    /// so the caller can repopulate its input fields.
    pub fn select_history(&mut self, id: &str) -> Result<HistoryRecord> {
        if self.in_flight {
            return Err(AppError::Busy);
        }
        let record = self
            .history
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::UnknownRecord(id.to_string()))?;
        let report = Report::decode(&record.result_payload)?;
        self.view.show(report)?;
        Ok(record)
    }

    pub fn delete_history(&mut self, id: &str) -> bool {
        self.history.remove(id)
    }

    /// Chart-free report text, only while a report is shown.
    pub fn export_text(&self) -> Option<&str> {
        self.view.report().map(Report::export_text)
    }
}
