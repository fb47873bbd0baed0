use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph};

use upsbet_terminal::assets::{self, AssetSlot};
use upsbet_terminal::config::AppConfig;
use upsbet_terminal::logging;
use upsbet_terminal::predict_client::{HttpBackend, PredictError, PredictionClient};
use upsbet_terminal::provider;
use upsbet_terminal::registry::TeamRegistry;
use upsbet_terminal::selection::{SelectionController, Side};
use upsbet_terminal::state::{AppState, Delta, ProviderCommand, drain_deltas};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: mpsc::Sender<ProviderCommand>,
}

impl App {
    fn new(state: AppState, cmd_tx: mpsc::Sender<ProviderCommand>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.state.toggle_focus(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('k') | KeyCode::Up => {
                self.state.cycle_focused(-1)
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Char('j') | KeyCode::Down => {
                self.state.cycle_focused(1)
            }
            KeyCode::Char('s') => self.state.swap(),
            KeyCode::Char('p') | KeyCode::Enter => self.request_prediction(),
            KeyCode::Char('x') | KeyCode::Esc => self.state.dismiss_notice(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_prediction(&mut self) {
        let Some(selection) = self.state.begin_prediction() else {
            return;
        };
        if self.cmd_tx.send(ProviderCommand::Predict(selection)).is_err() {
            self.state.fail_prediction(&PredictError::WorkerGone);
        }
    }
}

fn main() -> Result<()> {
    let cfg = AppConfig::load();
    if let Err(err) = logging::init(&cfg.log_dir) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let registry = TeamRegistry::builtin();
    let selection = SelectionController::initialize(
        registry,
        cfg.assets_base.clone(),
        &cfg.default_home,
        &cfg.default_away,
    )
    .context("failed to set up team selection")?;
    let background = assets::load_background(&cfg.assets_base, &cfg.bg_file);
    let endpoint = cfg.endpoint_url();
    tracing::info!(endpoint = %endpoint, "starting upsbet terminal");

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let client = PredictionClient::new(registry, HttpBackend::new(endpoint.clone(), cfg.timeout));
    let _worker = provider::spawn_prediction_worker(client, tx, cmd_rx);

    let mut state = AppState::new(selection, background, endpoint);
    state.push_log("[INFO] Ready. Enter predicts, ? for help");
    let mut app = App::new(state, cmd_tx);

    enable_raw_mode()?;
    let res = {
        let _restore = RestoreTerminal;
        run_terminal(&mut app, rx)
    };

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal loop failed");
        eprintln!("error: {err}");
    }
    Ok(())
}

/// Leaves raw mode and the alternate screen when dropped, on every exit path.
struct RestoreTerminal;

impl Drop for RestoreTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            crossterm::cursor::Show
        );
    }
}

fn run_terminal(app: &mut App, rx: mpsc::Receiver<Delta>) -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;
    run_app(&mut terminal, app, rx)
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        drain_deltas(&mut app.state, &rx);

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.state;
    let notice_height = if state.notice.is_some() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(notice_height),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_selectors(frame, chunks[1], state);
    render_trigger(frame, chunks[2], state);
    render_prediction(frame, chunks[3], state);

    if let Some(notice) = &state.notice {
        let notice = Paragraph::new(format!("{notice}  (x to dismiss)"))
            .style(Style::default().fg(Color::Red))
            .block(Block::default().title("Notice").borders(Borders::ALL));
        frame.render_widget(notice, chunks[4]);
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[5]);

    let footer = Paragraph::new(
        "Tab Side | ←/→ Team | s Swap | Enter/p Predict | x Dismiss | ? Help | q Quit",
    );
    frame.render_widget(footer, chunks[6]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let line1 = "  .-.  UPSBET | LigaPro match predictor".to_string();
    let line2 = match state.background.file_name() {
        Some(bg) if state.background.visible => format!(" /___\\ theme: {bg}"),
        _ => " /___\\".to_string(),
    };
    let line3 = format!("  |_|  model: {}", state.endpoint);
    format!("{line1}\n{line2}\n{line3}")
}

fn render_selectors(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Percentage(10),
            Constraint::Percentage(45),
        ])
        .split(area);

    let selection = &state.selection;
    let display = selection.display();
    render_selector(
        frame,
        cols[0],
        "Home",
        selection.home_name(),
        &display.home_logo,
        state.focus == Side::Home,
    );
    let vs = Paragraph::new("\n vs\n\n s ⇄")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(vs, cols[1]);
    render_selector(
        frame,
        cols[2],
        "Away",
        selection.away_name(),
        &display.away_logo,
        state.focus == Side::Away,
    );
}

fn render_selector(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    team: &str,
    logo: &AssetSlot,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let team_style = if focused {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(format!("◀ {team} ▶"), team_style)),
        Line::from(""),
        Line::from(Span::styled(
            logo_text(logo),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

fn logo_text(logo: &AssetSlot) -> String {
    if !logo.visible {
        return String::new();
    }
    match (logo.file_name(), logo.dimensions) {
        (Some(name), Some((w, h))) => format!("[{name} {w}x{h}]"),
        (Some(name), None) => format!("[{name}]"),
        _ => String::new(),
    }
}

fn render_trigger(frame: &mut Frame, area: Rect, state: &AppState) {
    let style = if state.calculating {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };
    let button = Paragraph::new(format!("[ {} ]", state.trigger_label()))
        .style(style)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(button, area);
}

fn render_prediction(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Prediction").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let display = state.selection.display();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(inner);

    let (home_pct, draw_pct, away_pct) = state
        .prediction
        .map(|v| (v.home_pct, v.draw_pct, v.away_pct))
        .unwrap_or((0, 0, 0));

    render_bar(frame, rows[0], &display.home_label, home_pct, Color::Green);
    render_bar(frame, rows[1], "Draw", draw_pct, Color::Yellow);
    render_bar(frame, rows[2], &display.away_label, away_pct, Color::Red);

    let summary = match state.prediction {
        Some(view) => format!(
            "Score: {}   Corners: {} / {}   Cards: {} / {}",
            view.score_text(),
            view.corners.0,
            view.corners.1,
            view.cards.0,
            view.cards.1
        ),
        None => "Score: -   Corners: - / -   Cards: - / -".to_string(),
    };
    frame.render_widget(
        Paragraph::new(summary).style(Style::default().add_modifier(Modifier::BOLD)),
        rows[4],
    );
}

fn render_bar(frame: &mut Frame, area: Rect, label: &str, pct: u8, color: Color) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(10)])
        .split(area);
    frame.render_widget(Paragraph::new(label.to_string()), cols[0]);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(pct.min(100)))
        .label(format!("{pct}%"));
    frame.render_widget(gauge, cols[1]);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "UPSBet Terminal - Help",
        "",
        "Selection:",
        "  Tab          Switch home/away",
        "  ←/→ or h/l   Previous/next team",
        "  s            Swap home and away",
        "",
        "Prediction:",
        "  Enter / p    Predict",
        "  x / Esc      Dismiss notice",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
