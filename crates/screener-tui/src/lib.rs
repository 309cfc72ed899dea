// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use screener_app::{
    AppCommand, AppEvent, AppState, ClickTarget, DetailField, DetailRecord, DetailResponse,
    DismissTrigger, FetchTicket, NotificationKind, NotificationToken, RetrievalFailure, ViewKind,
};
use std::io;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, error};

const CLOSE_CONTROL: &str = "[x]";
const INPUT_CURSOR: &str = "▏";
const JUMP_ROWS: isize = 10;

/// Seam between the terminal adapter and whatever answers detail lookups.
pub trait AppRuntime {
    fn fetch_detail(&mut self, key: &str) -> Result<DetailResponse, RetrievalFailure>;

    /// Runs one lookup and reports back through `tx`. The default resolves
    /// inline; real runtimes override this to resolve off the UI thread.
    fn spawn_detail_fetch(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = self.fetch_detail(&ticket.key);
        tx.send(InternalEvent::DetailResolved { ticket, outcome })
            .map_err(|_| anyhow!("detail event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearNotification {
        token: NotificationToken,
    },
    DetailResolved {
        ticket: FetchTicket,
        outcome: Result<DetailResponse, RetrievalFailure>,
    },
}

/// Where the rows came from, shown in the header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionInfo {
    pub job_description: Option<String>,
    pub generated_at: Option<OffsetDateTime>,
    pub server: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ViewData {
    session: SessionInfo,
    input_focused: bool,
    screen: Rect,
}

impl ViewData {
    fn new(session: SessionInfo) -> Self {
        Self {
            session,
            input_focused: false,
            screen: Rect::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenLayout {
    header: Rect,
    input: Rect,
    body: Rect,
    status: Rect,
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    session: SessionInfo,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(session);
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        match terminal.size() {
            Ok(size) => view_data.screen = Rect::new(0, 0, size.width, size.height),
            Err(error) => {
                result = Err(error).context("query terminal size");
                break;
            }
        }

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) => {
                if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(Event::Mouse(mouse)) => {
                handle_mouse_event(state, runtime, &mut view_data, &internal_tx, mouse);
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn process_internal_events<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        let command = match event {
            InternalEvent::ClearNotification { token } => AppCommand::ExpireNotification(token),
            InternalEvent::DetailResolved { ticket, outcome } => {
                AppCommand::DetailResolved { ticket, outcome }
            }
        };
        dispatch(state, runtime, view_data, tx, command);
    }
}

/// Applies `command` and performs the side effects its events ask for.
fn dispatch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    for event in events {
        match event {
            AppEvent::FetchRequested(ticket) => {
                if let Err(error) = runtime.spawn_detail_fetch(ticket, tx.clone()) {
                    error!(%error, "spawn detail lookup");
                    dispatch(
                        state,
                        runtime,
                        view_data,
                        tx,
                        AppCommand::Notify {
                            message: format!("lookup failed to start: {error}"),
                            kind: NotificationKind::Error,
                        },
                    );
                }
            }
            AppEvent::Notified(notification) => {
                schedule_notification_clear(tx, notification.token, state.notifier.duration());
            }
            AppEvent::OverlayOpened { .. } | AppEvent::OverlayClosed => {
                view_data.input_focused = false;
            }
            AppEvent::ViewChanged(view) => {
                debug!(view = view.label(), "view changed");
            }
            AppEvent::VisibilityChanged(_)
            | AppEvent::SelectionChanged(_)
            | AppEvent::ResolutionDiscarded(_)
            | AppEvent::NotificationExpired(_) => {}
        }
    }
}

fn schedule_notification_clear(
    internal_tx: &Sender<InternalEvent>,
    token: NotificationToken,
    after: Duration,
) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(after);
        let _ = sender.send(InternalEvent::ClearNotification { token });
    });
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if key.code == KeyCode::Esc {
        if !state.overlay.is_open() && view_data.input_focused {
            view_data.input_focused = false;
            return false;
        }
        dispatch(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::DismissRequested(DismissTrigger::Escape),
        );
        return false;
    }

    if state.overlay.is_open() {
        if key.code == KeyCode::Char('x') {
            dispatch(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::DismissRequested(DismissTrigger::CloseControl),
            );
        }
        return false;
    }

    if view_data.input_focused {
        handle_input_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    let command = match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('a'), KeyModifiers::NONE) | (KeyCode::Tab, _) => AppCommand::ToggleView,
        _ if state.view != ViewKind::Results => return false,
        (KeyCode::Char('/') | KeyCode::Char('n'), KeyModifiers::NONE) => {
            view_data.input_focused = true;
            return false;
        }
        (KeyCode::Char('j') | KeyCode::Down, _) => AppCommand::MoveSelection(1),
        (KeyCode::Char('k') | KeyCode::Up, _) => AppCommand::MoveSelection(-1),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) | (KeyCode::PageDown, _) => {
            AppCommand::MoveSelection(JUMP_ROWS)
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) | (KeyCode::PageUp, _) => {
            AppCommand::MoveSelection(-JUMP_ROWS)
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => {
            AppCommand::MoveSelection(isize::MIN / 2)
        }
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => AppCommand::MoveSelection(isize::MAX / 2),
        (KeyCode::Enter, _) => AppCommand::ActivateSelected,
        _ => return false,
    };
    dispatch(state, runtime, view_data, internal_tx, command);
    false
}

fn handle_input_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut input = state.truncation.input().to_owned();
    match (key.code, key.modifiers) {
        (KeyCode::Enter | KeyCode::Tab, _) => {
            view_data.input_focused = false;
            return;
        }
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => input.clear(),
        (KeyCode::Backspace, _) => {
            input.pop();
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            input.push(ch);
        }
        _ => return,
    }
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::NumericInputChanged(input),
    );
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    let point = Position::new(mouse.column, mouse.row);

    if state.overlay.is_open() {
        let overlay = overlay_area(view_data.screen);
        let target = if close_control_area(overlay).contains(point) {
            ClickTarget::CloseControl
        } else if overlay.contains(point) {
            ClickTarget::Content
        } else {
            ClickTarget::Backdrop
        };
        dispatch(
            state,
            runtime,
            view_data,
            internal_tx,
            AppCommand::OverlayClicked(target),
        );
        return;
    }

    if state.view != ViewKind::Results {
        return;
    }

    let layout = screen_layout(view_data.screen);
    if layout.input.contains(point) {
        view_data.input_focused = true;
        return;
    }
    view_data.input_focused = false;

    let Some(ordinal) = row_at(state, layout.body, point) else {
        return;
    };
    let Some(key) = state
        .truncation
        .row(ordinal)
        .map(|row| row.row.filename.clone())
    else {
        return;
    };
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::SelectRow(ordinal),
    );
    dispatch(
        state,
        runtime,
        view_data,
        internal_tx,
        AppCommand::DetailTriggerActivated(key),
    );
}

fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);
    ScreenLayout {
        header: chunks[0],
        input: chunks[1],
        body: chunks[2],
        status: chunks[3],
    }
}

fn overlay_area(area: Rect) -> Rect {
    centered_rect(70, 60, area)
}

fn close_control_area(overlay: Rect) -> Rect {
    let width = CLOSE_CONTROL.len() as u16 + 1;
    Rect::new(
        overlay.x + overlay.width.saturating_sub(width + 1),
        overlay.y,
        width,
        1,
    )
    .intersection(overlay)
}

/// Table body rows that fit in `body` (inside the border, below the header).
fn body_row_capacity(body: Rect) -> usize {
    usize::from(body.height.saturating_sub(3))
}

/// Range of visible ordinals drawn for the current selection.
fn table_window(selected: Option<usize>, visible: usize, capacity: usize) -> Range<usize> {
    if capacity == 0 || visible == 0 {
        return 0..0;
    }
    let selected = selected.unwrap_or(0).min(visible - 1);
    let start = (selected + 1).saturating_sub(capacity);
    start..(start + capacity).min(visible)
}

fn row_at(state: &AppState, body: Rect, point: Position) -> Option<usize> {
    let first_row_y = body.y.saturating_add(2);
    let inside_x = point.x > body.x && point.x < body.right().saturating_sub(1);
    if !inside_x || point.y < first_row_y {
        return None;
    }
    let window = table_window(
        state.selected,
        state.truncation.visible_count(),
        body_row_capacity(body),
    );
    let ordinal = window.start + usize::from(point.y - first_row_y);
    window.contains(&ordinal).then_some(ordinal)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = screen_layout(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|view| *view == state.view)
        .unwrap_or(0);
    let tabs = Tabs::new(ViewKind::ALL.iter().map(|view| view.label()))
        .block(
            Block::default()
                .title(header_title(&view_data.session))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout.header);

    match state.view {
        ViewKind::Results => {
            render_input(frame, layout.input, state, view_data);
            render_table(frame, layout.body, state);
        }
        ViewKind::About => {
            let area = layout.input.union(layout.body);
            let about = Paragraph::new(about_text(&view_data.session))
                .wrap(Wrap { trim: false })
                .block(Block::default().title("about").borders(Borders::ALL));
            frame.render_widget(about, area);
        }
    }

    let status_style = match state.notifier.current().map(|note| note.kind) {
        Some(NotificationKind::Error) => Style::default().fg(Color::Red),
        Some(NotificationKind::Info) => Style::default().fg(Color::Green),
        None => Style::default().fg(Color::Yellow),
    };
    let status = Paragraph::new(status_text(state, view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout.status);

    if let Some(record) = state.overlay.state().record() {
        let area = overlay_area(frame.area());
        frame.render_widget(Clear, area);
        let overlay = Paragraph::new(render_overlay_text(record))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(record.title().to_owned())
                    .title(Line::from(CLOSE_CONTROL).right_aligned())
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(overlay, area);
    }
}

fn render_input(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let cursor = if view_data.input_focused {
        INPUT_CURSOR
    } else {
        ""
    };
    let text = format!(
        "{}{cursor}  |  {}",
        state.truncation.input(),
        state.truncation.state().status_text()
    );
    let border_style = if view_data.input_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let input = Paragraph::new(text).block(
        Block::default()
            .title("top n")
            .borders(Borders::ALL)
            .border_style(border_style),
    );
    frame.render_widget(input, area);
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let block = Block::default().title("results").borders(Borders::ALL);
    if state.truncation.total() == 0 {
        let empty = Paragraph::new(state.truncation.state().status_text()).block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(["#", "candidate", "file", "score"].map(|label| {
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let window = table_window(
        state.selected,
        state.truncation.visible_count(),
        body_row_capacity(area),
    );
    let rows = state
        .truncation
        .visible_rows()
        .skip(window.start)
        .take(window.len())
        .map(|handle| {
            let style = if state.selected == Some(handle.ordinal) {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new([
                Cell::from(handle.rank().to_string()),
                Cell::from(handle.row.label().to_owned()),
                Cell::from(handle.row.filename.clone()),
                Cell::from(format_score(handle.row.score)),
            ])
            .style(style)
        });

    let widths = [
        Constraint::Length(4),
        Constraint::Min(12),
        Constraint::Min(12),
        Constraint::Length(7),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn header_title(session: &SessionInfo) -> String {
    let mut title = "screener".to_owned();
    if let Some(job) = &session.job_description {
        title.push_str(&format!(" | jd {job}"));
    }
    if let Some(generated_at) = session.generated_at {
        title.push_str(&format!(" | {}", format_timestamp(generated_at)));
    }
    title
}

fn format_timestamp(value: OffsetDateTime) -> String {
    value
        .format(&time::macros::format_description!(
            "[year]-[month]-[day] [hour]:[minute]"
        ))
        .unwrap_or_else(|_| value.to_string())
}

fn format_score(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

fn render_overlay_text(record: &DetailRecord) -> String {
    let linkedin = match record.linkedin_href() {
        Some(href) if href != record.display(DetailField::LinkedIn) => {
            format!("{} <{href}>", record.display(DetailField::LinkedIn))
        }
        _ => record.display(DetailField::LinkedIn).to_owned(),
    };
    let line = |field: DetailField, value: &str| format!("{}: {value}", field.label());
    [
        line(DetailField::Email, record.display(DetailField::Email)),
        line(DetailField::Phone, record.display(DetailField::Phone)),
        line(DetailField::LinkedIn, &linkedin),
        String::new(),
        record.display(DetailField::Text).to_owned(),
        String::new(),
        "esc or x close | click outside to dismiss".to_owned(),
    ]
    .join("\n")
}

fn about_text(session: &SessionInfo) -> String {
    let server = if session.server.is_empty() {
        "offline (demo data)"
    } else {
        session.server.as_str()
    };
    [
        "Ranked resumes from a screening run, best match first.",
        "",
        "Narrow the list with the top n box; leave it empty to see every row.",
        "Open a row to fetch its contact details from the screening server.",
        "",
        &format!("server: {server}"),
        "",
        "keys: / edit top n | j/k move | enter open | a toggle view | esc close | q quit",
    ]
    .join("\n")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    let mut parts = Vec::new();
    if let Some(note) = state.notifier.current() {
        parts.push(note.message.clone());
    }
    if state.overlay.is_loading() {
        parts.push(format!(
            "loading detail ({})",
            state.overlay.in_flight_count()
        ));
    }
    let hints = if state.overlay.is_open() {
        "esc/x close"
    } else if view_data.input_focused {
        "type a number | enter done | ctrl+u clear"
    } else {
        "/ top n | j/k move | enter open | a about | q quit"
    };
    parts.push(hints.to_owned());
    parts.join(" | ")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
