// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use roster_app::{
    AppCommand, AppState, CommandResult, Controller, FieldKey, Focus, Notice, RecordStore,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

const FORM_WIDTH: u16 = 44;
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    cursor_row: usize,
    help_visible: bool,
    status_token: u64,
}

pub fn run_app<S: RecordStore>(state: &mut AppState, controller: &mut Controller<S>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let result = run_session(state, controller);
    let restored = restore_terminal();
    result.and(restored)
}

/// Everything between entering and leaving raw mode. Errors come back to
/// `run_app` so the terminal is restored on every exit path.
fn run_session<S: RecordStore>(state: &mut AppState, controller: &mut Controller<S>) -> Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    match controller.refresh() {
        Ok(notice) => info!(%notice, "initial load"),
        Err(error) => {
            state.dispatch(AppCommand::SetStatus(format!("load failed: {error}")));
        }
    }

    drive(&mut terminal, state, controller, next_terminal_event)
}

fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    raw.and(screen)
}

fn next_terminal_event() -> Result<Option<Event>> {
    if event::poll(Duration::from_millis(120)).context("poll event")? {
        event::read().context("read event").map(Some)
    } else {
        Ok(None)
    }
}

fn drive<B, S, E>(
    terminal: &mut Terminal<B>,
    state: &mut AppState,
    controller: &mut Controller<S>,
    mut next_event: E,
) -> Result<()>
where
    B: Backend,
    S: RecordStore,
    E: FnMut() -> Result<Option<Event>>,
{
    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        terminal
            .draw(|frame| render(frame, state, controller, &view_data))
            .context("draw frame")?;

        if let Some(Event::Key(key)) = next_event()?
            && handle_key_event(state, controller, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns `true` when the user asked to quit.
fn handle_key_event<S: RecordStore>(
    state: &mut AppState,
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let outcome = match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('n') => controller.create(),
            KeyCode::Char('u') => controller.update(),
            KeyCode::Char('d') => controller.delete(),
            KeyCode::Char('l') => Ok(controller.clear()),
            _ => return false,
        };
        report_command(state, controller, view_data, internal_tx, outcome);
        return false;
    }

    if view_data.help_visible {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            view_data.help_visible = false;
        }
        return false;
    }

    if key.code == KeyCode::Esc {
        state.dispatch(AppCommand::ToggleFocus);
        return false;
    }

    match state.focus {
        Focus::Form(field) => handle_form_key(state, controller, field, key),
        Focus::Table => handle_table_key(state, controller, view_data, internal_tx, key),
    }
    false
}

fn handle_form_key<S: RecordStore>(
    state: &mut AppState,
    controller: &mut Controller<S>,
    field: FieldKey,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Tab | KeyCode::Down | KeyCode::Enter => {
            state.dispatch(AppCommand::NextField);
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.dispatch(AppCommand::PrevField);
        }
        KeyCode::Backspace => {
            controller.form_mut().field_mut(field).pop();
        }
        KeyCode::Char(ch) if !key.modifiers.intersects(KeyModifiers::ALT) => {
            controller.form_mut().field_mut(field).push(ch);
        }
        _ => {}
    }
}

fn handle_table_key<S: RecordStore>(
    state: &mut AppState,
    controller: &mut Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let row_count = controller.rows().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => move_row(view_data, row_count, 1),
        KeyCode::Char('k') | KeyCode::Up => move_row(view_data, row_count, -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.cursor_row = 0,
        KeyCode::Char('G') | KeyCode::End => {
            view_data.cursor_row = row_count.saturating_sub(1);
        }
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Char('r') => {
            let outcome = controller.refresh();
            report_command(state, controller, view_data, internal_tx, outcome);
        }
        KeyCode::Enter => match controller.select_row(view_data.cursor_row) {
            Some(notice) => {
                state.dispatch(AppCommand::FocusForm);
                emit_status(state, view_data, internal_tx, notice.to_string());
            }
            None => emit_status(state, view_data, internal_tx, "no record under the cursor"),
        },
        _ => {}
    }
}

fn report_command<S: RecordStore>(
    state: &mut AppState,
    controller: &Controller<S>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    outcome: CommandResult<Notice>,
) {
    clamp_cursor(view_data, controller.rows().len());
    let message = match outcome {
        Ok(notice) => {
            debug!(%notice, "command succeeded");
            notice.to_string()
        }
        Err(error) => error.to_string(),
    };
    emit_status(state, view_data, internal_tx, message);
}

fn move_row(view_data: &mut ViewData, row_count: usize, delta: isize) {
    if row_count == 0 {
        view_data.cursor_row = 0;
        return;
    }

    let current = view_data.cursor_row;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.cursor_row = next.min(row_count - 1);
}

fn clamp_cursor(view_data: &mut ViewData, row_count: usize) {
    view_data.cursor_row = view_data.cursor_row.min(row_count.saturating_sub(1));
}

fn render<S: RecordStore>(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    controller: &Controller<S>,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(9), Constraint::Length(3)])
        .split(frame.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(20)])
        .split(layout[0]);

    render_form(frame, body[0], state, controller);
    render_table(frame, body[1], state, controller, view_data);

    let status_widget = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[1]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_form<S: RecordStore>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    controller: &Controller<S>,
) {
    let focused = state.focused_field();
    let lines = FieldKey::ALL
        .iter()
        .map(|key| {
            let value = controller.form().field(*key);
            if focused == Some(*key) {
                Line::from(vec![
                    Span::styled(
                        format!("{:>12}: ", key.label()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value.to_owned()),
                    Span::styled("_", Style::default().fg(Color::Cyan)),
                ])
            } else {
                Line::from(format!("{:>12}: {value}", key.label()))
            }
        })
        .collect::<Vec<_>>();

    let form = Paragraph::new(lines).block(
        Block::default()
            .title(form_title(controller))
            .borders(Borders::ALL),
    );
    frame.render_widget(form, area);
}

fn form_title<S: RecordStore>(controller: &Controller<S>) -> String {
    match controller.selection().bound_id() {
        Some(id) => format!("roster | editing {id}"),
        None => "roster | new record".to_owned(),
    }
}

fn render_table<S: RecordStore>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    controller: &Controller<S>,
    view_data: &ViewData,
) {
    let table_focused = state.focus == Focus::Table;
    let bound = controller.selection().bound_id();

    let header_cells = std::iter::once("id")
        .chain(FieldKey::ALL.iter().map(|key| key.column()))
        .map(|label| {
            Cell::from(label).style(
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells);

    let rows = controller
        .rows()
        .iter()
        .enumerate()
        .map(|(row_index, row)| {
            let mut style = Style::default();
            if bound == Some(&row.id) {
                style = style.fg(Color::Yellow);
            }
            if table_focused && row_index == view_data.cursor_row {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            let cells = std::iter::once(row.id.to_string())
                .chain(row.cells.iter().cloned())
                .map(Cell::from)
                .collect::<Vec<_>>();
            Row::new(cells).style(style)
        });

    let widths = vec![Constraint::Min(8); FieldKey::ALL.len() + 1];
    let title = format!("people ({})", controller.rows().len());
    let border_style = if table_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    frame.render_widget(table, area);
}

fn status_text(state: &AppState) -> String {
    let (mode, default) = match state.focus {
        Focus::Form(_) => (
            "FORM",
            "tab/shift+tab field | ctrl+n insert ctrl+u update ctrl+d delete ctrl+l clear | esc table | ctrl+q",
        ),
        Focus::Table => (
            "TABLE",
            "j/k g/G | enter load | r reload | ctrl+d delete | esc form | ? help | ctrl+q",
        ),
    };
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {default}"),
        None => format!("{mode} | {default}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | esc switch form/table\n\
commands: ctrl+n insert | ctrl+u update selected | ctrl+d delete selected | ctrl+l clear form\n\
form: tab/down/enter next field | shift+tab/up previous field | backspace delete char\n\
table: j/k or up/down move | g/G first/last | enter load into form | r reload | ? help"
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
