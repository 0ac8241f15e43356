use std::time::{Duration, Instant};

use chrono::Local;
use rust_i18n::t;
use tracing::warn;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::export;
use crate::orchestrator::{AnalysisRequest, Orchestrator, PendingAnalysis, PromptSettings};
use crate::prompt::report_language;
use crate::store::history::HistoryStore;
use crate::store::schema::AnalysisMode;
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub const STATUS_TTL: Duration = Duration::from_secs(2);
pub const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Primary,
    Secondary,
    Elaboration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    shown_at: Instant,
}

#[derive(Clone, Debug, Default)]
pub struct HistoryOverlay {
    pub selected: usize,
    pub confirm_delete: bool,
}

pub struct App {
    pub theme: &'static Theme,
    pub config: Config,
    pub mode: AnalysisMode,
    pub primary: LineInput,
    pub secondary: LineInput,
    pub elaboration: LineInput,
    pub focus: Focus,
    pub orchestrator: Orchestrator,
    pub history_overlay: Option<HistoryOverlay>,
    pub report_scroll: u16,
    pub status: Option<StatusMessage>,
    pub spinner_frame: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme, history: HistoryStore) -> Self {
        let settings = PromptSettings {
            model: config.analysis_model.clone(),
            language: report_language(&config.locale).to_string(),
        };
        Self {
            theme,
            config,
            mode: AnalysisMode::default(),
            primary: LineInput::default(),
            secondary: LineInput::default(),
            elaboration: LineInput::default(),
            focus: Focus::Primary,
            orchestrator: Orchestrator::new(history, settings),
            history_overlay: None,
            report_scroll: 0,
            status: None,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest::new(
            self.mode,
            self.primary.value(),
            self.secondary.value(),
            self.elaboration.value(),
        )
    }

    /// Validate the form and move to Loading. The caller runs the returned
    /// request off the UI thread. Local rejections become a status message.
    pub fn submit(&mut self) -> Option<PendingAnalysis> {
        match self.orchestrator.begin(self.request()) {
            Ok(pending) => {
                self.status = None;
                Some(pending)
            }
            Err(e) => {
                self.set_error(&e);
                None
            }
        }
    }

    pub fn on_oracle_reply(&mut self, pending: PendingAnalysis, outcome: Result<String>) {
        self.orchestrator.complete(pending, outcome);
        self.report_scroll = 0;
    }

    /// Leave the report or error view. The second subject is cleared; the
    /// rest of the form is kept for a follow-up analysis.
    pub fn new_analysis(&mut self) {
        if let Err(e) = self.orchestrator.reset() {
            self.set_error(&e);
            return;
        }
        self.secondary.clear();
        self.report_scroll = 0;
        if self.focus == Focus::Secondary {
            self.focus = Focus::Primary;
        }
    }

    /// Esc on the form: clears a shown error back to Idle, quits otherwise.
    pub fn cancel(&mut self) {
        if self.orchestrator.view().error().is_some() {
            self.new_analysis();
        } else {
            self.should_quit = true;
        }
    }

    pub fn cycle_mode(&mut self, forward: bool) {
        if !self.orchestrator.view().inputs_editable() {
            return;
        }
        self.mode = if forward { self.mode.next() } else { self.mode.prev() };
        if self.focus == Focus::Secondary && !self.mode.requires_secondary() {
            self.focus = Focus::Primary;
        }
    }

    pub fn visible_fields(&self) -> Vec<Focus> {
        if self.mode.requires_secondary() {
            vec![Focus::Primary, Focus::Secondary, Focus::Elaboration]
        } else {
            vec![Focus::Primary, Focus::Elaboration]
        }
    }

    pub fn focus_next(&mut self) {
        self.step_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.step_focus(-1);
    }

    fn step_focus(&mut self, delta: isize) {
        let fields = self.visible_fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let len = fields.len() as isize;
        self.focus = fields[(current + delta).rem_euclid(len) as usize];
    }

    pub fn focused_input_mut(&mut self) -> &mut LineInput {
        match self.focus {
            Focus::Primary => &mut self.primary,
            Focus::Secondary => &mut self.secondary,
            Focus::Elaboration => &mut self.elaboration,
        }
    }

    pub fn scroll_report(&mut self, delta: i32) {
        let next = self.report_scroll as i32 + delta;
        self.report_scroll = next.clamp(0, u16::MAX as i32) as u16;
    }

    // --- history overlay ---

    pub fn open_history(&mut self) {
        if self.orchestrator.view().is_loading() {
            return;
        }
        self.history_overlay = Some(HistoryOverlay::default());
    }

    pub fn close_history(&mut self) {
        self.history_overlay = None;
    }

    pub fn history_move(&mut self, delta: isize) {
        let len = self.orchestrator.history().len();
        if let Some(overlay) = self.history_overlay.as_mut() {
            overlay.confirm_delete = false;
            if len == 0 {
                overlay.selected = 0;
                return;
            }
            let next = (overlay.selected as isize + delta).clamp(0, len as isize - 1);
            overlay.selected = next as usize;
        }
    }

    fn selected_history_id(&self) -> Option<String> {
        let overlay = self.history_overlay.as_ref()?;
        self.orchestrator
            .history()
            .list()
            .get(overlay.selected)
            .map(|r| r.id.clone())
    }

    /// Show the highlighted entry and put its subjects back in the form.
    pub fn select_history_entry(&mut self) {
        let Some(id) = self.selected_history_id() else {
            return;
        };
        match self.orchestrator.select_history(&id) {
            Ok(record) => {
                self.mode = record.mode;
                self.primary.set_value(&record.primary_input);
                self.secondary
                    .set_value(record.secondary_input.as_deref().unwrap_or(""));
                self.report_scroll = 0;
                self.history_overlay = None;
            }
            Err(e) => self.set_error(&e),
        }
    }

    pub fn request_delete(&mut self) {
        if self.selected_history_id().is_none() {
            return;
        }
        if let Some(overlay) = self.history_overlay.as_mut() {
            overlay.confirm_delete = true;
        }
    }

    pub fn confirm_delete(&mut self, yes: bool) {
        let id = self.selected_history_id();
        let Some(overlay) = self.history_overlay.as_mut() else {
            return;
        };
        overlay.confirm_delete = false;
        if !yes {
            return;
        }
        if let Some(id) = id {
            self.orchestrator.delete_history(&id);
            let len = self.orchestrator.history().len();
            if let Some(overlay) = self.history_overlay.as_mut() {
                overlay.selected = overlay.selected.min(len.saturating_sub(1));
            }
            self.set_info(t!("status.deleted").to_string());
        }
    }

    // --- export ---

    pub fn copy_report(&mut self) {
        let Some(text) = self.orchestrator.export_text().map(str::to_string) else {
            return;
        };
        match export::copy_to_clipboard(&text) {
            Ok(()) => self.set_info(t!("status.copied").to_string()),
            Err(e) => {
                warn!(error = %e, "clipboard copy failed");
                self.set_error(&e);
            }
        }
    }

    pub fn download_report(&mut self) {
        let Some(text) = self.orchestrator.export_text().map(str::to_string) else {
            return;
        };
        let dir = self.config.download_path();
        let today = Local::now().date_naive();
        match export::download(&dir, self.mode, &text, today) {
            Ok(path) => self.set_info(
                t!("status.downloaded", path = path.display().to_string()).to_string(),
            ),
            Err(e) => {
                warn!(error = %e, "download failed");
                self.set_error(&e);
            }
        }
    }

    // --- status and animation ---

    pub fn set_info(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            kind: StatusKind::Info,
            shown_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, error: &AppError) {
        self.status = Some(StatusMessage {
            text: error.user_message(),
            kind: StatusKind::Error,
            shown_at: Instant::now(),
        });
    }

    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.orchestrator.view().is_loading() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        }
        if let Some(status) = &self.status {
            if now.saturating_duration_since(status.shown_at) >= STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::view::ViewState;

    fn test_app() -> App {
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let history = HistoryStore::load(Box::new(MemoryStore::new()));
        App::new(Config::default(), theme, history)
    }

    fn type_into(input: &mut LineInput, text: &str) {
        input.set_value(text);
    }

    #[test]
    fn focus_skips_secondary_outside_comparison() {
        let mut app = test_app();
        assert_eq!(app.mode, AnalysisMode::Psychological);
        app.focus_next();
        assert_eq!(app.focus, Focus::Elaboration);
        app.focus_next();
        assert_eq!(app.focus, Focus::Primary);

        app.mode = AnalysisMode::Comparison;
        app.focus_next();
        assert_eq!(app.focus, Focus::Secondary);
        app.focus_prev();
        app.focus_prev();
        assert_eq!(app.focus, Focus::Elaboration);
    }

    #[test]
    fn leaving_comparison_moves_focus_off_secondary() {
        let mut app = test_app();
        app.mode = AnalysisMode::Comparison;
        app.focus = Focus::Secondary;
        app.cycle_mode(true);
        assert_eq!(app.mode, AnalysisMode::Psychological);
        assert_eq!(app.focus, Focus::Primary);
    }

    #[test]
    fn invalid_submit_sets_error_status_and_stays_idle() {
        let mut app = test_app();
        app.mode = AnalysisMode::Comparison;
        type_into(&mut app.primary, "https://fb.com/a");
        assert!(app.submit().is_none());
        assert_eq!(app.orchestrator.view(), &ViewState::Idle);
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Error));
    }

    #[test]
    fn reply_flow_and_new_analysis() {
        let mut app = test_app();
        app.mode = AnalysisMode::Comparison;
        type_into(&mut app.primary, "a");
        type_into(&mut app.secondary, "b");
        let pending = app.submit().expect("dispatched");
        assert!(app.orchestrator.view().is_loading());

        app.cycle_mode(true);
        assert_eq!(app.mode, AnalysisMode::Comparison, "mode locked while loading");

        app.on_oracle_reply(pending, Ok("done".into()));
        assert!(app.orchestrator.view().can_export());

        app.new_analysis();
        assert_eq!(app.orchestrator.view(), &ViewState::Idle);
        assert_eq!(app.secondary.value(), "");
        assert_eq!(app.primary.value(), "a");
    }

    #[test]
    fn esc_clears_error_before_quitting() {
        let mut app = test_app();
        type_into(&mut app.primary, "https://fb.com/a");
        let pending = app.submit().unwrap();
        app.on_oracle_reply(pending, Err(AppError::OracleTransport("503".into())));
        assert!(app.orchestrator.view().error().is_some());

        app.cancel();
        assert_eq!(app.orchestrator.view(), &ViewState::Idle);
        assert!(!app.should_quit);
        assert_eq!(app.primary.value(), "https://fb.com/a");

        app.cancel();
        assert!(app.should_quit);
    }

    #[test]
    fn history_selection_repopulates_form() {
        let mut app = test_app();
        app.mode = AnalysisMode::Comparison;
        type_into(&mut app.primary, "first");
        type_into(&mut app.secondary, "second");
        let pending = app.submit().unwrap();
        app.on_oracle_reply(pending, Ok("stored".into()));
        app.new_analysis();
        app.mode = AnalysisMode::Behavioral;
        type_into(&mut app.primary, "other");

        app.open_history();
        app.select_history_entry();
        assert!(app.history_overlay.is_none());
        assert_eq!(app.mode, AnalysisMode::Comparison);
        assert_eq!(app.primary.value(), "first");
        assert_eq!(app.secondary.value(), "second");
        assert_eq!(app.orchestrator.export_text(), Some("stored"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = test_app();
        type_into(&mut app.primary, "a");
        let pending = app.submit().unwrap();
        app.on_oracle_reply(pending, Ok("r".into()));

        app.open_history();
        app.request_delete();
        assert!(app.history_overlay.as_ref().unwrap().confirm_delete);
        app.confirm_delete(false);
        assert_eq!(app.orchestrator.history().len(), 1);

        app.request_delete();
        app.confirm_delete(true);
        assert!(app.orchestrator.history().is_empty());
        assert_eq!(app.history_overlay.as_ref().unwrap().selected, 0);
    }

    #[test]
    fn download_writes_into_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let theme: &'static Theme = Box::leak(Box::new(Theme::default()));
        let history = HistoryStore::load(Box::new(MemoryStore::new()));
        let config = Config {
            download_dir: dir.path().join("reports").display().to_string(),
            ..Config::default()
        };
        let mut app = App::new(config, theme, history);
        type_into(&mut app.primary, "a");
        let pending = app.submit().unwrap();
        app.on_oracle_reply(pending, Ok("saved text".into()));

        app.download_report();
        assert_eq!(app.status.as_ref().map(|s| s.kind), Some(StatusKind::Info));
        let files: Vec<_> = std::fs::read_dir(dir.path().join("reports")).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn status_expires_after_ttl() {
        let mut app = test_app();
        app.set_info("copied".into());
        let shown = app.status.as_ref().unwrap().shown_at;
        app.tick_at(shown + Duration::from_millis(500));
        assert!(app.status.is_some());
        app.tick_at(shown + STATUS_TTL);
        assert!(app.status.is_none());
    }

    #[test]
    fn spinner_only_advances_while_loading() {
        let mut app = test_app();
        app.tick();
        assert_eq!(app.spinner_frame, 0);
        type_into(&mut app.primary, "a");
        let _pending = app.submit().unwrap();
        app.tick();
        app.tick();
        assert_eq!(app.spinner_frame, 2);
    }
}
