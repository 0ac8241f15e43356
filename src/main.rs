use std::io;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Frame;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use rust_i18n::t;
use tracing::{error, info, warn};

use basira::app::{App, Focus, StatusKind};
use basira::config::Config;
use basira::error::AppError;
use basira::event::{AppEvent, EventHandler};
use basira::logging;
use basira::oracle::Oracle;
use basira::oracle::gemini::GeminiClient;
use basira::orchestrator::PendingAnalysis;
use basira::store::history::HistoryStore;
use basira::store::json_store::JsonStore;
use basira::store::{KeyValueStore, MemoryStore};
use basira::ui::components::analysis_form::{AnalysisForm, FormField};
use basira::ui::components::history_panel::HistoryPanel;
use basira::ui::components::report_view::ReportView;
use basira::ui::layout::{AppLayout, pack_hint_lines};
use basira::ui::line_input::InputResult;
use basira::ui::theme::Theme;
use basira::view::ViewState;

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "basira", version, about = "Personality analysis of public profiles in the terminal")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface and report language (ar, en)")]
    locale: Option<String>,
}

/// The model client, or the reason there is none.
enum OracleHandle {
    Ready(Arc<dyn Oracle>),
    Unavailable(String),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => {
            eprintln!("ignoring config file: {e:#}");
            (Config::default(), Some(e))
        }
    };
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    config.validate();
    rust_i18n::set_locale(&config.locale);

    let _log_guard = match logging::init_file_logging(&config.log_path()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("logging disabled: {e:#}");
            None
        }
    };
    if let Some(e) = config_error {
        warn!(error = %format!("{e:#}"), "config file ignored, using defaults");
    }
    info!(locale = %config.locale, theme = %config.theme, "starting");

    let storage: Box<dyn KeyValueStore> = match JsonStore::with_base_dir(config.data_path()) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!(error = %e, "data directory unavailable, history will not persist");
            Box::new(MemoryStore::new())
        }
    };
    let history = HistoryStore::load(storage);

    let oracle = match GeminiClient::from_config(&config) {
        Ok(client) => OracleHandle::Ready(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "oracle unavailable");
            OracleHandle::Unavailable(e.to_string())
        }
    };

    let theme = Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let mut app = App::new(config, theme, history);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events, &oracle);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(error = ?err, "ui loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    oracle: &OracleHandle,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                if let Some(pending) = handle_key(app, key) {
                    dispatch(app, pending, oracle, events.sender());
                }
            }
            AppEvent::Tick => app.tick(),
            AppEvent::Resize(_, _) => {}
            AppEvent::Oracle(pending, outcome) => app.on_oracle_reply(pending, outcome),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Run the request on a worker thread; the reply comes back as an event.
fn dispatch(app: &mut App, pending: PendingAnalysis, oracle: &OracleHandle, tx: Sender<AppEvent>) {
    match oracle {
        OracleHandle::Ready(oracle) => {
            let oracle = Arc::clone(oracle);
            thread::spawn(move || {
                let outcome = oracle.generate(&pending.oracle_request);
                let _ = tx.send(AppEvent::Oracle(pending, outcome));
            });
        }
        OracleHandle::Unavailable(reason) => {
            app.on_oracle_reply(pending, Err(AppError::Config(reason.clone())));
        }
    }
}

/// Returns a request to dispatch when the key submitted the form.
fn handle_key(app: &mut App, key: KeyEvent) -> Option<PendingAnalysis> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return None;
    }

    if app.history_overlay.is_some() {
        handle_history_key(app, key);
        return None;
    }

    let view = app.orchestrator.view();
    if view.inputs_editable() {
        handle_form_key(app, key)
    } else {
        if view.can_export() {
            handle_report_key(app, key);
        }
        None
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> Option<PendingAnalysis> {
    match key.code {
        KeyCode::F(2) => {
            app.open_history();
            return None;
        }
        KeyCode::Left if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.cycle_mode(false);
            return None;
        }
        KeyCode::Right if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.cycle_mode(true);
            return None;
        }
        _ => {}
    }

    match app.focused_input_mut().handle(key) {
        InputResult::Submit => app.submit(),
        InputResult::Cancel => {
            app.cancel();
            None
        }
        InputResult::NextField => {
            app.focus_next();
            None
        }
        InputResult::PrevField => {
            app.focus_prev();
            None
        }
        InputResult::Continue => None,
    }
}

fn handle_report_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') => app.copy_report(),
        KeyCode::Char('d') => app.download_report(),
        KeyCode::Char('n') | KeyCode::Esc => app.new_analysis(),
        KeyCode::Char('h') | KeyCode::F(2) => app.open_history(),
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.scroll_report(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_report(1),
        KeyCode::PageUp => app.scroll_report(-10),
        KeyCode::PageDown => app.scroll_report(10),
        KeyCode::Home => app.report_scroll = 0,
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    let confirming = app
        .history_overlay
        .as_ref()
        .is_some_and(|o| o.confirm_delete);
    if confirming {
        match key.code {
            KeyCode::Char('y') => app.confirm_delete(true),
            KeyCode::Char('n') | KeyCode::Esc => app.confirm_delete(false),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc | KeyCode::F(2) | KeyCode::Char('q') => app.close_history(),
        KeyCode::Up | KeyCode::Char('k') => app.history_move(-1),
        KeyCode::Down | KeyCode::Char('j') => app.history_move(1),
        KeyCode::Enter => app.select_history_entry(),
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete(),
        _ => {}
    }
}

fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let layout = AppLayout::new(area);
    render_header(frame, app, layout.header);

    match app.orchestrator.view() {
        ViewState::Success(report) => frame.render_widget(
            ReportView {
                report,
                mode: app.mode,
                scroll: app.report_scroll,
                tier: layout.tier,
                theme: app.theme,
            },
            layout.main,
        ),
        view => {
            let fields = app
                .visible_fields()
                .into_iter()
                .map(|focus| FormField {
                    label: field_label(app, focus),
                    input: match focus {
                        Focus::Primary => &app.primary,
                        Focus::Secondary => &app.secondary,
                        Focus::Elaboration => &app.elaboration,
                    },
                    focused: app.focus == focus,
                })
                .collect();
            frame.render_widget(
                AnalysisForm {
                    mode: app.mode,
                    fields,
                    error: view.error(),
                    loading: view.is_loading().then(|| app.spinner()),
                    theme: app.theme,
                },
                layout.main,
            );
        }
    }

    render_footer(frame, app, layout.footer);

    if let Some(overlay) = &app.history_overlay {
        frame.render_widget(
            HistoryPanel {
                records: app.orchestrator.history().list(),
                selected: overlay.selected,
                confirm_delete: overlay.confirm_delete,
                now: Utc::now(),
                theme: app.theme,
            },
            area,
        );
    }
}

fn field_label(app: &App, focus: Focus) -> String {
    match (focus, app.mode.requires_secondary()) {
        (Focus::Primary, false) => t!("form.profile"),
        (Focus::Primary, true) => t!("form.first_profile"),
        (Focus::Secondary, _) => t!("form.second_profile"),
        (Focus::Elaboration, _) => t!("form.elaboration"),
    }
    .to_string()
}

fn render_header(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", t!("app.name")),
            Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD),
        ),
        Span::styled(t!("app.tagline").to_string(), Style::default().fg(colors.header_fg())),
    ]);
    let header = Paragraph::new(title).block(
        Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.header_bg())),
    );
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;

    if let Some(status) = &app.status {
        let color = match status.kind {
            StatusKind::Info => colors.success(),
            StatusKind::Error => colors.error(),
        };
        let line = Line::from(Span::styled(format!("  {}", status.text), Style::default().fg(color)));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let hints: Vec<String> = if app.history_overlay.is_some() {
        vec![t!("hints.history_select").into(), t!("hints.history_delete").into(), t!("hints.close").into()]
    } else {
        match app.orchestrator.view() {
            ViewState::Idle => vec![
                t!("hints.submit").into(),
                t!("hints.next_field").into(),
                t!("hints.mode").into(),
                t!("hints.history").into(),
                t!("hints.quit").into(),
            ],
            ViewState::Error(_) => vec![
                t!("hints.submit").into(),
                t!("hints.next_field").into(),
                t!("hints.mode").into(),
                t!("hints.history").into(),
                t!("hints.dismiss").into(),
            ],
            ViewState::Loading => vec![t!("hints.loading").into()],
            ViewState::Success(_) => vec![
                t!("hints.scroll").into(),
                t!("hints.copy").into(),
                t!("hints.download").into(),
                t!("hints.new").into(),
                t!("hints.history_short").into(),
            ],
        }
    };
    let hint_refs: Vec<&str> = hints.iter().map(String::as_str).collect();
    let lines: Vec<Line> = pack_hint_lines(&hint_refs, area.width as usize)
        .into_iter()
        .map(|l| Line::from(Span::styled(l, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}
