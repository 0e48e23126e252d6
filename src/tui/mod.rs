mod export;
mod help;
mod state;

use crate::cli::Cli;
use crate::gateway::{AnalysisBackend, RequestGateway};
use crate::lifecycle::{LifecycleState, Resolution};
use crate::orchestrator::{self, AppEvent, UiCommand};
use crate::presenter::{Block as ContentBlock, Tab};
use crate::scenarios::Scenario;
use crate::text_summary::DISCLAIMER;
use crate::triage::AlertVariant;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs, Wrap},
    Terminal,
};
use state::{Focus, UiState};
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, time::Duration, time::Instant};
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

const SPINNER: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Startup values handed to the UI thread.
struct Launch {
    base_url: String,
    location: String,
    query: Option<String>,
    scenario: Option<Scenario>,
    export_dir: Option<PathBuf>,
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = crate::cli::build_config(&args)?;
    let gateway = RequestGateway::new(&cfg)?;
    let base_url = gateway.base_url().to_string();
    let backend: Arc<dyn AnalysisBackend> = Arc::new(gateway);

    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<UiCommand>();

    let launch = Launch {
        base_url,
        location: args.location.clone(),
        query: args.query.clone(),
        scenario: args.scenario,
        export_dir: args.export_document.clone(),
    };

    // TUI runs in a dedicated thread to keep all blocking I/O out of the Tokio runtime.
    let ui_handle = std::thread::spawn(move || run_threaded(launch, event_rx, cmd_tx));

    let res = orchestrator::run_controller(backend, cfg.timeout, event_tx, cmd_rx).await;

    let join_res = tokio::task::spawn_blocking(move || ui_handle.join()).await;
    if let Ok(joined) = join_res {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(anyhow::anyhow!("TUI thread panicked")),
        }
    }

    res
}

/// Run the TUI loop on a dedicated thread.
fn run_threaded(
    launch: Launch,
    mut event_rx: UnboundedReceiver<AppEvent>,
    cmd_tx: UnboundedSender<UiCommand>,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).ok();

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    // UiState is owned by the UI thread only; no cross-thread mutation.
    let mut state = UiState {
        location_input: launch.location,
        query_input: launch.query.clone().unwrap_or_default(),
        scenario: launch.scenario,
        base_url: launch.base_url,
        export_dir: launch.export_dir,
        ..Default::default()
    };
    if launch.query.is_some() || launch.scenario.is_some() {
        if let Some(ticket) = state.submit() {
            let _ = cmd_tx.send(UiCommand::Submit(ticket));
        }
    }

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();
    let mut redraw = true;

    let res = loop {
        // Drain events without blocking to keep UI responsive.
        while let Ok(ev) = event_rx.try_recv() {
            apply_event(&mut state, ev);
        }

        if redraw || last_tick.elapsed() >= tick_rate {
            terminal.draw(|f| draw(f.area(), f, &state)).ok();
            last_tick = Instant::now();
            redraw = false;
        }

        // Poll input with a short timeout to avoid blocking the render loop.
        if event::poll(Duration::from_millis(10)).unwrap_or(false) {
            if let Ok(Event::Key(k)) = event::read() {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match handle_key(&mut state, k.code, k.modifiers) {
                    KeyOutcome::Continue => {}
                    KeyOutcome::Send(cmd) => {
                        let _ = cmd_tx.send(cmd);
                    }
                    KeyOutcome::Quit => {
                        let _ = cmd_tx.send(UiCommand::Quit);
                        break Ok(());
                    }
                }
                // Redraw right away so typing feels immediate.
                redraw = true;
            }
        }
    };

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen).ok();
    res
}

fn apply_event(state: &mut UiState, ev: AppEvent) {
    match ev {
        AppEvent::Resolved { id, outcome } => {
            if state.apply_resolution(id, outcome) == Resolution::Stale {
                return;
            }
            if let (Some(dir), Some(p)) = (state.export_dir.as_deref(), state.presenter.as_ref()) {
                let processed = orchestrator::process_result_completion(Some(dir), p);
                if let Some(path) = processed.exported_path {
                    state.last_exported_path = Some(path.to_string_lossy().to_string());
                }
                state.info = processed.export_messages.join("; ");
            }
        }
        AppEvent::Info(msg) => state.info = msg,
    }
}

/// What the UI loop should do after a key press.
#[derive(Debug)]
enum KeyOutcome {
    Continue,
    Send(UiCommand),
    Quit,
}

fn handle_key(state: &mut UiState, code: KeyCode, modifiers: KeyModifiers) -> KeyOutcome {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }

    if state.show_help {
        if matches!(
            code,
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            state.show_help = false;
        }
        return KeyOutcome::Continue;
    }

    if ctrl {
        return match code {
            KeyCode::Char('n') => {
                state.cycle_scenario(true);
                KeyOutcome::Continue
            }
            KeyCode::Char('p') => {
                state.cycle_scenario(false);
                KeyOutcome::Continue
            }
            KeyCode::Char('l') => {
                let was_running = state.lifecycle.is_in_flight();
                state.reset();
                if was_running {
                    KeyOutcome::Send(UiCommand::Abandon)
                } else {
                    KeyOutcome::Continue
                }
            }
            KeyCode::Char('r') => submit(state),
            _ => KeyOutcome::Continue,
        };
    }

    match code {
        KeyCode::F(1) => {
            state.show_help = true;
            return KeyOutcome::Continue;
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            return KeyOutcome::Continue;
        }
        KeyCode::Esc if state.lifecycle.is_in_flight() => {
            state.reset();
            state.info = "Request cancelled".into();
            return KeyOutcome::Send(UiCommand::Abandon);
        }
        _ => {}
    }

    match state.focus {
        Focus::Query | Focus::Location => match code {
            KeyCode::Enter => {
                if state.lifecycle.is_in_flight() {
                    state.info =
                        "A request is already running. Press Ctrl-R to resubmit anyway.".into();
                    KeyOutcome::Continue
                } else {
                    submit(state)
                }
            }
            KeyCode::Backspace => {
                state.pop_char();
                KeyOutcome::Continue
            }
            KeyCode::Esc => {
                state.focus = Focus::Results;
                KeyOutcome::Continue
            }
            KeyCode::Char(c) => {
                state.push_char(c);
                KeyOutcome::Continue
            }
            _ => KeyOutcome::Continue,
        },
        Focus::Results => {
            match code {
                KeyCode::Char('q') => return KeyOutcome::Quit,
                KeyCode::Char('?') => state.show_help = true,
                KeyCode::Left | KeyCode::Char('h') => state.prev_tab(),
                KeyCode::Right | KeyCode::Char('l') => state.next_tab(),
                KeyCode::Char(c @ '1'..='5') => {
                    if let Some(tab) = c.to_digit(10).and_then(|d| Tab::from_index(d as usize - 1))
                    {
                        state.select_tab(tab);
                    }
                }
                KeyCode::Up | KeyCode::Char('k') => state.scroll = state.scroll.saturating_sub(1),
                KeyCode::Down | KeyCode::Char('j') => state.scroll = state.scroll.saturating_add(1),
                KeyCode::PageUp => state.scroll = state.scroll.saturating_sub(10),
                KeyCode::PageDown => state.scroll = state.scroll.saturating_add(10),
                KeyCode::Home => state.scroll = 0,
                KeyCode::Char('s') => export::save_document(state),
                KeyCode::Char('y') => export::copy_document(state),
                KeyCode::Enter => state.focus = Focus::Query,
                _ => {}
            }
            KeyOutcome::Continue
        }
    }
}

fn submit(state: &mut UiState) -> KeyOutcome {
    state.last_exported_path = None;
    match state.submit() {
        Some(ticket) => KeyOutcome::Send(UiCommand::Submit(ticket)),
        None => KeyOutcome::Continue,
    }
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(4),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "⚖️ OBJECTION.ai",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - Your Constitutional Copilot for Legal Rights"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(38), Constraint::Min(0)].as_ref())
        .split(chunks[1]);
    draw_sidebar(body[0], f, state);
    draw_main(body[1], f, state);
    draw_footer(chunks[2], f, state);

    if state.show_help {
        let popup = centered(area, 70, 24);
        f.render_widget(Clear, popup);
        help::draw_help(popup, f);
    }
}

fn focus_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_sidebar(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(5),
            ]
            .as_ref(),
        )
        .split(area);

    let location = Paragraph::new(state.location_input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(state.focus == Focus::Location))
            .title("📍 Your Location"),
    );
    f.render_widget(location, rows[0]);

    let scenario = Paragraph::new(
        state
            .scenario
            .map(|s| s.title())
            .unwrap_or("Custom query"),
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("🎬 Demo Scenario (Ctrl-N/P)"),
    );
    f.render_widget(scenario, rows[1]);

    let query_text = state.effective_query();
    let query = if query_text.is_empty() {
        Paragraph::new(Span::styled(
            "Describe your situation...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(query_text)
    };
    let query = query.wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(state.focus == Focus::Query))
            .title("💬 Describe Your Situation"),
    );
    f.render_widget(query, rows[2]);

    let tip = Paragraph::new(vec![
        Line::from("Enter: analyze   Tab: move focus"),
        Line::from("F1: help         Ctrl-C: quit"),
        Line::from(Span::styled(
            "Be specific: include dates, amounts and who is involved.",
            Style::default().fg(Color::Gray),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title("💡 Tips"));
    f.render_widget(tip, rows[3]);
}

fn draw_main(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let border = focus_style(state.focus == Focus::Results);
    match state.lifecycle.state() {
        LifecycleState::Idle => {
            let p = Paragraph::new(vec![
                Line::from(Span::styled(
                    "👋 Welcome",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from("Describe a legal situation on the left, or pick a demo scenario with Ctrl-N."),
                Line::from("Press Enter to get your rights, an action plan, a draft document,"),
                Line::from("local resources and recent news."),
            ])
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title("Results"),
            );
            f.render_widget(p, area);
        }
        LifecycleState::InFlight { id, started_at } => {
            let elapsed = started_at.elapsed();
            let frame = SPINNER[(elapsed.as_millis() / 250) as usize % SPINNER.len()];
            let p = Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("{frame} Analyzing your situation... This may take 30-60 seconds..."),
                    Style::default().fg(Color::Yellow),
                )),
                Line::from(""),
                Line::from(format!("Elapsed: {}s", elapsed.as_secs())),
                Line::from(format!("Request {id} → {}", state.base_url)),
                Line::from(""),
                Line::from(Span::styled(
                    "Esc cancels. Ctrl-R resubmits and replaces this request.",
                    Style::default().fg(Color::Gray),
                )),
            ])
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title("Working"),
            );
            f.render_widget(p, area);
        }
        LifecycleState::Failed { kind, message } => {
            let p = Paragraph::new(vec![
                Line::from(Span::styled(
                    format!("❌ {message}"),
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(kind.hint()),
                Line::from(format!("Backend: {}", state.base_url)),
                Line::from(""),
                Line::from("Press Enter to try again."),
            ])
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title("Request failed"),
            );
            f.render_widget(p, area);
        }
        LifecycleState::Succeeded { .. } => draw_result(area, f, state),
    }
}

fn alert_color(alert: AlertVariant) -> Color {
    match alert {
        AlertVariant::ActiveViolence => Color::Red,
        AlertVariant::MentalHealthCrisis => Color::Magenta,
        AlertVariant::HighPriority { .. } => Color::Yellow,
        AlertVariant::None => Color::Reset,
    }
}

fn draw_result(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let Some(presenter) = state.presenter.as_ref() else {
        return;
    };
    let composition = presenter.compose();

    // Alert first, then tabs, then the active tab's content.
    let alert_lines: Vec<Line> = match composition.alert_copy.as_ref() {
        Some(copy) => {
            let color = alert_color(composition.alert);
            let mut lines = vec![Line::from(Span::styled(
                copy.title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))];
            lines.extend(copy.body.iter().map(|b| Line::from(b.as_str())));
            lines.extend(
                copy.contacts
                    .iter()
                    .map(|c| Line::from(format!("  • {c}"))),
            );
            lines
        }
        None => Vec::new(),
    };
    let alert = (!alert_lines.is_empty()).then(|| {
        let border_type = if composition.alert.is_emergency() {
            BorderType::Thick
        } else {
            BorderType::Plain
        };
        Paragraph::new(alert_lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(Style::default().fg(alert_color(composition.alert))),
        )
    });
    // Size by wrapped rows so no contact line is clipped; the alert outranks the content.
    let alert_height = alert
        .as_ref()
        .map(|p| p.line_count(area.width.saturating_sub(2)) as u16)
        .unwrap_or(0)
        .min(area.height.saturating_sub(3));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(alert_height),
                Constraint::Length(3),
                Constraint::Min(0),
            ]
            .as_ref(),
        )
        .split(area);

    if let Some(alert) = alert {
        f.render_widget(alert, rows[0]);
    }

    let tabs = Tabs::new(
        composition
            .tabs
            .iter()
            .map(|(t, _)| Line::from(t.label()))
            .collect::<Vec<_>>(),
    )
    .select(presenter.active().index())
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(state.focus == Focus::Results)),
    )
    .highlight_style(Style::default().fg(Color::Yellow));
    f.render_widget(tabs, rows[1]);

    let lines: Vec<Line> = composition.content.iter().flat_map(block_lines).collect();
    let max_scroll = (lines.len() as u16).saturating_sub(1);
    let content = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.scroll.min(max_scroll), 0))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(content, rows[2]);
}

fn block_lines(block: &ContentBlock) -> Vec<Line<'static>> {
    match block {
        ContentBlock::Heading(t) => vec![Line::from(Span::styled(
            t.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))],
        ContentBlock::Subheading(t) => vec![Line::from(Span::styled(
            t.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ))],
        ContentBlock::Paragraph(t) => t.lines().map(|l| Line::from(l.to_string())).collect(),
        ContentBlock::Field { label, value } => vec![Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
            Span::raw(value.clone()),
        ])],
        ContentBlock::Bullet(t) => vec![Line::from(format!("  • {t}"))],
        ContentBlock::Link { label, url } => vec![Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::Cyan)),
            Span::styled(
                url.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ])],
        ContentBlock::Note(t) => vec![Line::from(Span::styled(
            t.clone(),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ))],
        ContentBlock::Blank => vec![Line::from("")],
    }
}

fn draw_footer(area: Rect, f: &mut ratatui::Frame, state: &UiState) {
    let p = Paragraph::new(vec![
        Line::from(state.info.as_str()),
        Line::from(Span::styled(DISCLAIMER, Style::default().fg(Color::Gray))),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
