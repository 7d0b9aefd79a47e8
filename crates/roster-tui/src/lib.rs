// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
    Table, TableState, Wrap,
};
use roster_app::{
    AppCommand, AppEvent, AppState, COLUMN_HEADERS, EditCursor, Focus, FormField, LayoutState,
    RecordStore, StudentRecord, TableRow, TableView, render_table,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

const FORM_HEIGHT: u16 = 7;
const SCROLL_MARK: &str = "↕";
const FOCUS_MARK: &str = "›";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableUiState {
    selected_row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ViewData {
    table: TableUiState,
    layout: LayoutState,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScreenAreas {
    header: Rect,
    form: Rect,
    table: Rect,
    status: Rect,
}

pub fn run_app<S: RecordStore>(state: &mut AppState, store: &mut S) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    debug!(records = store.len(), "terminal session started");

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, store, &view_data, &internal_rx);

        let area = match terminal.draw(|frame| render(frame, state, store.records(), &view_data)) {
            Ok(completed) => completed.area,
            Err(error) => {
                result = Err(error).context("draw frame");
                break;
            }
        };
        measure_layout(&mut view_data, store.records(), area);

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
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if handle_key_event(state, store, &mut view_data, &internal_tx, key) {
                    break;
                }
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    debug!("terminal session ended");
    result
}

fn process_internal_events<S: RecordStore>(
    state: &mut AppState,
    store: &mut S,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(store, AppCommand::ClearStatus);
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

fn emit_status<S: RecordStore>(
    state: &mut AppState,
    store: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(store, AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<S: RecordStore>(
    state: &mut AppState,
    store: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('q') {
        return true;
    }

    if state.pending.is_some() {
        let command = match key.code {
            KeyCode::Char('y' | 'Y') | KeyCode::Enter => Some(AppCommand::Confirm),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(AppCommand::Decline),
            _ => None,
        };
        if let Some(command) = command {
            dispatch_command(state, store, view_data, internal_tx, command);
        }
        return false;
    }

    if state.alert.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            dispatch_command(state, store, view_data, internal_tx, AppCommand::DismissAlert);
        }
        return false;
    }

    if ctrl {
        let command = match key.code {
            KeyCode::Char('s') => Some(AppCommand::Submit),
            KeyCode::Char('r') => Some(AppCommand::Reset),
            _ => None,
        };
        if let Some(command) = command {
            dispatch_command(state, store, view_data, internal_tx, command);
        }
        return false;
    }

    let command = match state.focus {
        Focus::Field(_) => form_command_for_key(key),
        Focus::Table => {
            if key.code == KeyCode::Char('q') {
                return true;
            }
            table_command_for_key(key, view_data, store.len())
        }
    };
    if let Some(command) = command {
        dispatch_command(state, store, view_data, internal_tx, command);
    }
    false
}

fn form_command_for_key(key: KeyEvent) -> Option<AppCommand> {
    match key.code {
        KeyCode::Enter => Some(AppCommand::Submit),
        KeyCode::Tab | KeyCode::Down => Some(AppCommand::FocusNext),
        KeyCode::BackTab | KeyCode::Up => Some(AppCommand::FocusPrev),
        KeyCode::Esc => Some(AppCommand::FocusTable),
        KeyCode::Backspace => Some(AppCommand::Backspace),
        KeyCode::Char(ch) => Some(AppCommand::InputChar(ch)),
        _ => None,
    }
}

fn table_command_for_key(
    key: KeyEvent,
    view_data: &mut ViewData,
    record_count: usize,
) -> Option<AppCommand> {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => {
            move_row(view_data, record_count, -1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            move_row(view_data, record_count, 1);
            None
        }
        KeyCode::Home | KeyCode::Char('g') => {
            view_data.table.selected_row = 0;
            None
        }
        KeyCode::End | KeyCode::Char('G') => {
            view_data.table.selected_row = record_count.saturating_sub(1);
            None
        }
        KeyCode::Char('e') | KeyCode::Enter if record_count > 0 => {
            Some(AppCommand::EditRow(view_data.table.selected_row))
        }
        KeyCode::Char('d') | KeyCode::Delete if record_count > 0 => {
            Some(AppCommand::DeleteRow(view_data.table.selected_row))
        }
        KeyCode::Tab | KeyCode::Char('i') => Some(AppCommand::FocusNext),
        KeyCode::BackTab => Some(AppCommand::FocusPrev),
        _ => None,
    }
}

fn dispatch_command<S: RecordStore>(
    state: &mut AppState,
    store: &mut S,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(store, command);
    for event in &events {
        if let AppEvent::RecordInserted(index) = event {
            view_data.table.selected_row = *index;
        }
        if let Some(message) = status_for_event(event) {
            emit_status(state, store, view_data, internal_tx, message);
        }
    }
    clamp_selection(view_data, store.len());
}

fn status_for_event(event: &AppEvent) -> Option<String> {
    match event {
        AppEvent::RecordInserted(index) => Some(format!("student added as row {}", index + 1)),
        AppEvent::RecordUpdated(index) => Some(format!("row {} saved", index + 1)),
        AppEvent::RecordDeleted(index) => Some(format!("row {} deleted", index + 1)),
        AppEvent::EditStarted(index) => Some(format!("editing row {}", index + 1)),
        AppEvent::ConfirmationDeclined => Some("canceled".to_owned()),
        AppEvent::FormReset
        | AppEvent::FieldChanged(_)
        | AppEvent::FocusChanged(_)
        | AppEvent::Rejected(_)
        | AppEvent::ConfirmationRequested(_)
        | AppEvent::AlertDismissed
        | AppEvent::StoreFailed(_)
        | AppEvent::StatusUpdated(_)
        | AppEvent::StatusCleared => None,
    }
}

fn move_row(view_data: &mut ViewData, record_count: usize, delta: isize) {
    if record_count == 0 {
        view_data.table.selected_row = 0;
        return;
    }
    let max = record_count as isize - 1;
    let next = (view_data.table.selected_row as isize + delta).clamp(0, max);
    view_data.table.selected_row = next as usize;
}

fn clamp_selection(view_data: &mut ViewData, record_count: usize) {
    view_data.table.selected_row = view_data
        .table
        .selected_row
        .min(record_count.saturating_sub(1));
}

fn screen_layout(area: Rect) -> ScreenAreas {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(FORM_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);
    ScreenAreas {
        header: layout[0],
        form: layout[1],
        table: layout[2],
        status: layout[3],
    }
}

/// Rows the table body can show once borders and the header row are taken.
fn table_body_height(table_area: Rect) -> usize {
    usize::from(table_area.height.saturating_sub(3))
}

/// Runs once a frame has been flushed: decides whether the table needs a
/// scroll affordance on the next draw.
fn measure_layout(view_data: &mut ViewData, records: &[StudentRecord], area: Rect) {
    // One row per record, or the single placeholder row.
    let content = records.len().max(1);
    let visible = table_body_height(screen_layout(area).table);
    if view_data.layout.apply(content, visible) {
        debug!(
            content,
            visible,
            scrollable = view_data.layout.scrollable,
            "table scroll state changed"
        );
    }
}

fn render(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    records: &[StudentRecord],
    view_data: &ViewData,
) {
    let areas = screen_layout(frame.area());

    let header = Paragraph::new(header_text(state, records.len()))
        .style(Style::default().fg(Color::White))
        .block(Block::default().title("roster").borders(Borders::ALL));
    frame.render_widget(header, areas.header);

    render_form(frame, areas.form, state);

    let view = render_table(records, state.edit_cursor);
    render_records(frame, areas.table, state, &view, view_data);

    let status = Paragraph::new(status_text(state))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, areas.status);

    if let Some(pending) = &state.pending {
        render_modal(
            frame,
            "confirm",
            format!("{}\n\n[y] yes   [n] no", pending.prompt()),
        );
    } else if let Some(alert) = &state.alert {
        render_modal(frame, "notice", format!("{alert}\n\n[enter] ok"));
    }
}

fn header_text(state: &AppState, record_count: usize) -> String {
    let mode = match state.edit_cursor {
        EditCursor::None => "adding".to_owned(),
        EditCursor::Editing(index) => format!("editing row {}", index + 1),
    };
    format!("student records: {record_count} | {mode}")
}

fn render_form(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState) {
    let mut lines = FormField::ALL
        .iter()
        .map(|field| {
            let focused = state.focus == Focus::Field(*field);
            let marker = if focused { FOCUS_MARK } else { " " };
            let cursor = if focused { "_" } else { "" };
            let style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("{marker} {:<11}", field.label()), style),
                Span::raw(format!("{}{cursor}", state.form.field(*field))),
            ])
        })
        .collect::<Vec<_>>();
    lines.push(Line::from(vec![
        Span::styled(
            format!("[ {} ]", state.submit_label()),
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("[ Reset ]", Style::default().fg(Color::White)),
    ]));

    let form = Paragraph::new(lines).block(Block::default().title("student").borders(Borders::ALL));
    frame.render_widget(form, area);
}

fn render_records(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &AppState,
    view: &TableView,
    view_data: &ViewData,
) {
    let title = table_title(view, view_data.layout);
    let table_focused = state.focus == Focus::Table;
    let border_style = if table_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style);

    if let [TableRow::Placeholder(message)] = view.rows.as_slice() {
        let placeholder = Paragraph::new(format!("\n{message}"))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let header = Row::new(COLUMN_HEADERS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let rows = view.rows.iter().filter_map(|row| {
        let TableRow::Record(record) = row else {
            return None;
        };
        let selected = table_focused && record.index == view_data.table.selected_row;
        let mut style = Style::default();
        if record.editing {
            style = style.fg(Color::Yellow);
        }
        if selected {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        let mut cells = record
            .cells
            .iter()
            .map(|value| Cell::from(value.clone()))
            .collect::<Vec<_>>();
        cells.push(Cell::from("[e]dit [d]elete"));
        Some(Row::new(cells).style(style))
    });

    let widths = [
        Constraint::Percentage(24),
        Constraint::Percentage(14),
        Constraint::Percentage(28),
        Constraint::Percentage(16),
        Constraint::Percentage(18),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    let mut table_state = TableState::default().with_selected(Some(view_data.table.selected_row));
    frame.render_stateful_widget(table, area, &mut table_state);

    if view_data.layout.scrollable {
        let mut scrollbar_state =
            ScrollbarState::new(view.record_count()).position(view_data.table.selected_row);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn table_title(view: &TableView, layout: LayoutState) -> String {
    let mut title = format!("records ({})", view.record_count());
    if layout.scrollable {
        title.push(' ');
        title.push_str(SCROLL_MARK);
    }
    title
}

fn render_modal(frame: &mut ratatui::Frame<'_>, title: &str, body: String) {
    let area = centered_rect(50, 30, frame.area());
    frame.render_widget(Clear, area);
    let modal = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .title(title.to_owned())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
    frame.render_widget(modal, area);
}

fn status_text(state: &AppState) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    match state.focus {
        Focus::Field(_) => {
            "tab next field | enter submit | ctrl-r reset | esc table | ctrl-q quit".to_owned()
        }
        Focus::Table => {
            "j/k move | e edit | d delete | tab form | ctrl-r reset | q quit".to_owned()
        }
    }
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
