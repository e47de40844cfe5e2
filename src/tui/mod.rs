//! Ratatui-based terminal UI.
//!
//! Left: the radar chart (drag the manual profile's handles with the mouse).
//! Right: prediction, editable profile fields, the reference customer list and
//! the selected customers. All state changes go through `Session::apply`.

use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{info, warn};

use crate::config::Settings;
use crate::data::sample::{LOAN_INTENTS, PRODUCT_TYPES};
use crate::data::spawn_loader;
use crate::domain::{AXES, AttributeVector, AxisId, ReferenceSet};
use crate::error::AppError;
use crate::estimator::{Estimate, KnnEstimator};
use crate::geometry::{ChartGeometry, round_attributes};
use crate::io::ingest::{DatasetStats, IngestedData};
use crate::io::{SessionSnapshot, write_snapshot};
use crate::report::{
    Rgb, customer_color, customer_details, customer_tags, format_currency, format_value, prediction_label,
    probability_bar,
};
use crate::session::{Session, SessionEvent, VirtualWindow};

mod radar_chart;

use radar_chart::{ChartViewport, RadarChart, term_color};

/// Snapshot output directory (relative to the working directory).
const SNAPSHOT_DIR: &str = "snapshots";

/// Grab distance for drag handles, in cells.
const HANDLE_GRAB_CELLS: f64 = 2.5;

/// Start the TUI.
pub fn run(settings: Settings) -> Result<(), AppError> {
    info!(source = %settings.data, k = settings.k, "starting tui");
    let loader = spawn_loader(settings.data.clone());

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(settings, loader);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen, mouse) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Profile,
    Customers,
}

/// A text field being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Editing {
    Axis(AxisId),
    LoanAmount,
    Search,
}

enum DataState {
    Loading(Receiver<Result<IngestedData, AppError>>),
    Ready(DatasetStats),
    Failed(String),
}

struct App {
    settings: Settings,
    geometry: ChartGeometry,
    estimator: KnnEstimator,
    session: Session,
    refs: ReferenceSet,
    data: DataState,
    estimate: Estimate,

    focus: Focus,
    axis: AxisId,
    editing: Option<Editing>,
    input: String,

    window: VirtualWindow,
    list_cursor: usize,
    list_scroll: usize,
    list_area: Option<Rect>,

    viewport: Option<ChartViewport>,
    dragging: Option<AxisId>,

    status: String,
}

impl App {
    fn new(settings: Settings, loader: Receiver<Result<IngestedData, AppError>>) -> Self {
        let estimator = KnnEstimator::new(settings.k);
        let session = Session::default();
        let refs = ReferenceSet::default();
        let estimate = session.estimate(&refs, &estimator);
        Self {
            status: format!("Loading {}...", settings.data),
            settings,
            geometry: ChartGeometry::default(),
            estimator,
            session,
            refs,
            data: DataState::Loading(loader),
            estimate,
            focus: Focus::Profile,
            axis: AxisId::CreditScore,
            editing: None,
            input: String::new(),
            window: VirtualWindow {
                item_height: 1.0,
                buffer: 2,
            },
            list_cursor: 0,
            list_scroll: 0,
            list_area: None,
            viewport: None,
            dragging: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_loader() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Mouse(mouse) => {
                    if self.handle_mouse(mouse) {
                        needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Pick up the background dataset load. Returns true when state changed.
    fn poll_loader(&mut self) -> bool {
        let DataState::Loading(rx) = &self.data else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(AppError::runtime("Dataset loader stopped unexpectedly.")),
        };

        match result {
            Ok(data) => {
                self.status = format!(
                    "Loaded {} reference customers ({} rows skipped).",
                    data.rows_used,
                    data.row_errors.len()
                );
                self.refs = data.records;
                self.data = DataState::Ready(data.stats);
            }
            Err(err) => {
                warn!(error = %err, "dataset load failed");
                self.status = format!("Dataset load failed: {err}");
                self.data = DataState::Failed(err.message().to_string());
            }
        }
        self.refresh_estimate();
        true
    }

    fn apply(&mut self, event: SessionEvent) {
        match self.session.apply(event, &self.refs, &self.geometry) {
            Ok(true) => self.refresh_estimate(),
            Ok(false) => {}
            Err(err) => self.status = err.to_string(),
        }
    }

    fn refresh_estimate(&mut self) {
        self.estimate = self.session.estimate(&self.refs, &self.estimator);
    }

    // ----- keyboard -----

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if let Some(editing) = self.editing {
            self.handle_edit_key(editing, key.code);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Profile => Focus::Customers,
                    Focus::Customers => Focus::Profile,
                };
            }
            KeyCode::Char('/') => self.start_edit(Editing::Search, String::new()),
            KeyCode::Char('a') => {
                let current = format!("{:.0}", self.session.loan.loan_amount);
                self.start_edit(Editing::LoanAmount, current);
            }
            KeyCode::Char('p') => self.cycle_product_type(1),
            KeyCode::Char('P') => self.cycle_product_type(-1),
            KeyCode::Char('i') => self.cycle_loan_intent(1),
            KeyCode::Char('I') => self.cycle_loan_intent(-1),
            KeyCode::Char('c') => {
                self.apply(SessionEvent::ClearAll);
                self.status = "Cleared selected customers.".to_string();
            }
            KeyCode::Char('m') => self.apply(SessionEvent::ToggleManualData),
            KeyCode::Char('d') => self.write_snapshot(),
            code => match self.focus {
                Focus::Profile => self.handle_profile_key(code),
                Focus::Customers => self.handle_list_key(code),
            },
        }
        false
    }

    fn handle_profile_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.axis = self.axis.prev(),
            KeyCode::Down => self.axis = self.axis.next(),
            KeyCode::Left => self.nudge(-1.0),
            KeyCode::Right => self.nudge(1.0),
            KeyCode::Enter => {
                let current = format!("{}", self.session.values[self.axis]);
                self.start_edit(Editing::Axis(self.axis), current);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        let total = self.refs.len();
        if total == 0 {
            return;
        }
        let page = self.list_area.map(|a| a.height.saturating_sub(2) as usize).unwrap_or(10).max(1);
        match code {
            KeyCode::Up => self.list_cursor = self.list_cursor.saturating_sub(1),
            KeyCode::Down => self.list_cursor = (self.list_cursor + 1).min(total - 1),
            KeyCode::PageUp => self.list_cursor = self.list_cursor.saturating_sub(page),
            KeyCode::PageDown => self.list_cursor = (self.list_cursor + page).min(total - 1),
            KeyCode::Home => self.list_cursor = 0,
            KeyCode::End => self.list_cursor = total - 1,
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(r) = self.refs.records().get(self.list_cursor) {
                    let id = r.customer_id.clone();
                    self.apply(SessionEvent::ToggleCustomer(id));
                }
            }
            KeyCode::Char('e') => {
                if let Some(r) = self.refs.records().get(self.list_cursor) {
                    let id = r.customer_id.clone();
                    self.apply(SessionEvent::ToggleExpanded(id));
                }
            }
            _ => {}
        }
        self.keep_cursor_visible(page);
    }

    fn keep_cursor_visible(&mut self, page: usize) {
        if self.list_cursor < self.list_scroll {
            self.list_scroll = self.list_cursor;
        } else if self.list_cursor >= self.list_scroll + page {
            self.list_scroll = self.list_cursor + 1 - page;
        }
    }

    fn start_edit(&mut self, editing: Editing, initial: String) {
        self.editing = Some(editing);
        self.input = initial;
    }

    fn handle_edit_key(&mut self, editing: Editing, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = None;
                self.input.clear();
                return;
            }
            KeyCode::Enter => {
                self.editing = None;
                let text = std::mem::take(&mut self.input);
                match editing {
                    Editing::Axis(axis) => self.apply(SessionEvent::ValueCommit {
                        axis,
                        raw: parse_number(&text),
                    }),
                    Editing::LoanAmount => self.apply(SessionEvent::LoanAmountCommit(text)),
                    Editing::Search => self.add_customer(text),
                }
                return;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => {
                let accepted = match editing {
                    Editing::Search => !c.is_control(),
                    _ => c.is_ascii_digit() || matches!(c, '.' | '-' | ',' | '$'),
                };
                if accepted {
                    self.input.push(c);
                }
            }
            _ => return,
        }

        // Live updates while typing.
        match editing {
            Editing::Axis(axis) => self.apply(SessionEvent::ValueInput {
                axis,
                raw: parse_number(&self.input),
            }),
            Editing::LoanAmount => self.apply(SessionEvent::LoanAmountInput(self.input.clone())),
            Editing::Search => {}
        }
    }

    fn add_customer(&mut self, query: String) {
        if query.trim().is_empty() {
            return;
        }
        match self.session.apply(SessionEvent::AddCustomer(query), &self.refs, &self.geometry) {
            Ok(added) => {
                if added {
                    self.refresh_estimate();
                }
                if let Some(id) = self.session.selected.last() {
                    self.status = format!("Showing customer {id}.");
                }
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn nudge(&mut self, direction: f64) {
        let spec = self.axis.axis();
        let step = spec.rounding.step().max(spec.span() / 100.0);
        let raw = self.session.values[self.axis] + direction * step;
        self.apply(SessionEvent::ValueCommit { axis: self.axis, raw });
    }

    fn cycle_product_type(&mut self, delta: isize) {
        let options = options_or(self.refs.product_types(), &PRODUCT_TYPES);
        let next = cycle(&options, &self.session.loan.product_type, delta);
        self.apply(SessionEvent::ProductType(next));
    }

    fn cycle_loan_intent(&mut self, delta: isize) {
        let options = options_or(self.refs.loan_intents(), &LOAN_INTENTS);
        let next = cycle(&options, &self.session.loan.loan_intent, delta);
        self.apply(SessionEvent::LoanIntent(next));
    }

    fn write_snapshot(&mut self) {
        let dataset = self.settings.data.to_string();
        let snapshot = SessionSnapshot::new(&self.session, &self.estimate, &dataset);
        self.status = match write_snapshot(&PathBuf::from(SNAPSHOT_DIR), &snapshot) {
            Ok(path) => format!("Wrote snapshot: {}", path.display()),
            Err(err) => format!("Snapshot failed: {err}"),
        };
    }

    // ----- mouse -----

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let (col, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(vp) = self.viewport.filter(|vp| vp.contains(col, row)) {
                    if !self.session.handles_enabled() || !self.session.show_manual {
                        return false;
                    }
                    let cursor = vp.to_chart(col, row);
                    let tolerance = vp.cell_size() * HANDLE_GRAB_CELLS;
                    self.dragging = self.geometry.nearest_handle(&self.session.values, cursor, tolerance);
                    if let Some(axis) = self.dragging {
                        self.axis = axis;
                        self.focus = Focus::Profile;
                    }
                    return true;
                }
                if let Some(index) = self.list_row_at(col, row) {
                    self.focus = Focus::Customers;
                    self.list_cursor = index;
                    if let Some(r) = self.refs.records().get(index) {
                        let id = r.customer_id.clone();
                        self.apply(SessionEvent::ToggleCustomer(id));
                    }
                    return true;
                }
                false
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let (Some(axis), Some(vp)) = (self.dragging, self.viewport) else {
                    return false;
                };
                let cursor = vp.to_chart(col, row);
                self.apply(SessionEvent::Drag { axis, cursor });
                true
            }
            MouseEventKind::Up(MouseButton::Left) => self.dragging.take().is_some(),
            MouseEventKind::ScrollDown => self.scroll_list(3, col, row),
            MouseEventKind::ScrollUp => self.scroll_list(-3, col, row),
            _ => false,
        }
    }

    fn list_row_at(&self, col: u16, row: u16) -> Option<usize> {
        let area = self.list_area?;
        let inner_top = area.y + 1;
        let inner_bottom = area.y + area.height.saturating_sub(1);
        if col <= area.x || col >= area.x + area.width.saturating_sub(1) || row < inner_top || row >= inner_bottom {
            return None;
        }
        let index = self.list_scroll + usize::from(row - inner_top);
        (index < self.refs.len()).then_some(index)
    }

    fn scroll_list(&mut self, delta: isize, col: u16, row: u16) -> bool {
        let Some(area) = self.list_area else {
            return false;
        };
        if col < area.x || col >= area.x + area.width || row < area.y || row >= area.y + area.height {
            return false;
        }
        let page = (area.height.saturating_sub(2) as usize).max(1);
        let max_scroll = self.refs.len().saturating_sub(page);
        self.list_scroll = self.list_scroll.saturating_add_signed(delta).min(max_scroll);
        self.list_cursor = self.list_cursor.clamp(self.list_scroll, (self.list_scroll + page).saturating_sub(1));
        true
    }

    // ----- drawing -----

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        self.draw_chart(frame, body[0]);
        self.draw_side(frame, body[1]);

        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let dataset = match &self.data {
            DataState::Loading(_) => format!("loading {}", self.settings.data),
            DataState::Ready(stats) => format!(
                "{} customers | approved {:.1}% | k={}",
                stats.n_records,
                stats.approval_rate() * 100.0,
                self.estimator.k()
            ),
            DataState::Failed(msg) => format!("dataset unavailable: {msg}"),
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("radar", Style::default().fg(Color::Cyan)),
                Span::raw(" | Loan approval radar"),
            ]),
            Line::from(Span::styled(dataset, Style::default().fg(Color::Gray))),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = if self.session.handles_enabled() {
            "Radar (drag handles to edit)"
        } else {
            "Radar (handles locked while customers are shown)"
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        // Leave a label row top and bottom.
        let plot_area = Rect {
            x: inner.x,
            y: inner.y + 1,
            width: inner.width,
            height: inner.height.saturating_sub(2),
        };
        let vp = ChartViewport::fit(plot_area, &self.geometry);
        self.viewport = Some(vp);

        let customers: Vec<(AttributeVector, Rgb)> = self
            .session
            .selected
            .iter()
            .enumerate()
            .filter_map(|(i, id)| self.refs.find(id).map(|r| (round_attributes(&r.raw_values()), customer_color(i))))
            .collect();

        let widget = RadarChart {
            geometry: self.geometry,
            extent: vp.extent,
            manual: self.session.show_manual.then_some(&self.session.values),
            handles: self.session.handles_enabled(),
            focus: (self.focus == Focus::Profile).then_some(self.axis),
            customers: &customers,
        };
        frame.render_widget(widget, vp.area);

        self.draw_axis_labels(frame, inner, &vp);
    }

    fn draw_axis_labels(&self, frame: &mut ratatui::Frame<'_>, inner: Rect, vp: &ChartViewport) {
        let offset = self.geometry.radius() * 0.08;
        for axis in AxisId::ALL {
            let label = axis.axis().name;
            let Some((col, row)) = vp.to_cell(self.geometry.label_point(axis, offset)) else {
                continue;
            };
            let width = (label.chars().count() as u16).min(inner.width);
            let start = col
                .saturating_sub(width / 2)
                .clamp(inner.x, (inner.x + inner.width).saturating_sub(width));
            let row = row.clamp(inner.y, (inner.y + inner.height).saturating_sub(1));
            let style = if axis == self.axis && self.focus == Focus::Profile {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            frame.render_widget(
                Paragraph::new(label).style(style),
                Rect {
                    x: start,
                    y: row,
                    width,
                    height: 1,
                },
            );
        }
    }

    fn draw_side(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let selected_height = (self.selected_lines().len() as u16 + 2).clamp(3, area.height / 3);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Length(11),
                Constraint::Min(5),
                Constraint::Length(selected_height),
            ])
            .split(area);

        self.draw_prediction(frame, chunks[0]);
        self.draw_profile(frame, chunks[1]);
        self.draw_customer_list(frame, chunks[2]);
        self.draw_selected(frame, chunks[3]);
    }

    fn draw_prediction(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let color = if self.estimate.decision.is_approved() {
            Color::Green
        } else {
            Color::Red
        };
        let bar_width = area.width.saturating_sub(10) as usize;
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    format!("{:>3}% ", self.estimate.percentage()),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::styled(probability_bar(self.estimate.probability, bar_width), Style::default().fg(color)),
            ]),
            Line::from(Span::styled(prediction_label(&self.estimate), Style::default().fg(color))),
        ];
        let detail = if matches!(self.data, DataState::Loading(_)) {
            "waiting for reference data".to_string()
        } else if self.estimate.fallback {
            format!("{} candidates (no exact loan match)", self.estimate.candidates)
        } else {
            format!("{} candidates", self.estimate.candidates)
        };
        lines.push(Line::from(Span::styled(detail, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().title("Approval").borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_profile(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items: Vec<ListItem> = AXES
            .iter()
            .map(|axis| {
                let value = match self.editing {
                    Some(Editing::Axis(a)) if a == axis.id => format!("{}_", self.input),
                    _ => format_value(self.session.values[axis.id], axis.id),
                };
                ListItem::new(format!("{:<15} {value}", axis.name))
            })
            .collect();

        let amount = match self.editing {
            Some(Editing::LoanAmount) => format!("{}_", self.input),
            _ => format_currency(self.session.loan.loan_amount),
        };
        let muted = Style::default().fg(Color::Gray);
        items.push(ListItem::new(format!("{:<15} {} (p)", "Product Type", self.session.loan.product_type)).style(muted));
        items.push(ListItem::new(format!("{:<15} {} (i)", "Loan Intent", self.session.loan.loan_intent)).style(muted));
        items.push(ListItem::new(format!("{:<15} {amount} (a)", "Loan Amount")).style(muted));

        let title = if self.session.show_manual { "Your profile" } else { "Your profile (hidden)" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        if self.focus == Focus::Profile {
            state.select(Some(self.axis.index()));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_customer_list(&mut self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        self.list_area = Some(area);
        let title = match self.editing {
            Some(Editing::Search) => format!("Customers | add id: {}_", self.input),
            _ => "Customers (/ add by id, space toggle, e details)".to_string(),
        };
        let block = Block::default().title(title).borders(Borders::ALL);

        if self.refs.is_empty() {
            let msg = match &self.data {
                DataState::Loading(_) => "Loading customers...",
                _ => "No customers available.",
            };
            let p = Paragraph::new(msg).style(Style::default().fg(Color::Yellow)).block(block);
            frame.render_widget(p, area);
            return;
        }

        let viewport = area.height.saturating_sub(2) as usize;
        let total = self.refs.len();
        self.list_scroll = self.list_scroll.min(total.saturating_sub(viewport.max(1)));
        let Some(range) = self.window.visible_range(total, self.list_scroll as f64, viewport as f64) else {
            frame.render_widget(block, area);
            return;
        };
        let start = *range.start();

        let items: Vec<ListItem> = self.refs.records()[range]
            .iter()
            .map(|r| {
                let (mark, style) = match self.session.selection_index(&r.customer_id) {
                    Some(i) => ("■", Style::default().fg(term_color(customer_color(i)))),
                    None => ("·", Style::default().fg(Color::DarkGray)),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{mark} "), style),
                    Span::raw(format!("{:<14}", r.customer_id)),
                    Span::styled(
                        format!(" {:<9}", r.outcome.display_name()),
                        Style::default().fg(if r.outcome.is_approved() { Color::Green } else { Color::Red }),
                    ),
                    Span::styled(
                        format!(" {} / {}", r.product_type, r.loan_intent),
                        Style::default().fg(Color::Gray),
                    ),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_offset(self.list_scroll - start);
        if self.focus == Focus::Customers {
            state.select(self.list_cursor.checked_sub(start));
        }
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn selected_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        if let Some(warning) = self.session.selection_warning() {
            lines.push(Line::from(Span::styled(warning, Style::default().fg(Color::Yellow))));
        }
        for (i, id) in self.session.selected.iter().enumerate() {
            let Some(record) = self.refs.find(id) else {
                continue;
            };
            let color = term_color(customer_color(i));
            lines.push(Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::styled(record.customer_id.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(format!(" [{}]", record.outcome.display_name())),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  {}", customer_tags(record).join(" | ")),
                Style::default().fg(Color::Gray),
            )));
            if self.session.expanded.contains(id) {
                for detail in customer_details(record) {
                    lines.push(Line::from(format!("    {detail}")));
                }
            }
        }
        lines
    }

    fn draw_selected(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = self.selected_lines();
        let title = format!("Selected ({})  c clear  m my data", self.session.selected.len());
        let p = if lines.is_empty() {
            Paragraph::new("No customers selected.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
        } else {
            Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true })
        };
        frame.render_widget(p.block(Block::default().title(title).borders(Borders::ALL)), area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab focus  ↑/↓ select  ←/→ adjust  Enter edit  p/i loan  a amount  d snapshot  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Parse a typed number; anything unparsable becomes NaN (ignored by the session).
fn parse_number(text: &str) -> f64 {
    let cleaned: String = text.chars().filter(|c| !matches!(c, ',' | '$')).collect();
    cleaned.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn options_or(found: Vec<String>, fallback: &[&str]) -> Vec<String> {
    if found.is_empty() {
        fallback.iter().map(|s| s.to_string()).collect()
    } else {
        found
    }
}

/// Next option after `current` (wrapping). Unknown values start from the first option.
fn cycle(options: &[String], current: &str, delta: isize) -> String {
    let Some(pos) = options.iter().position(|o| o == current) else {
        return options.first().cloned().unwrap_or_else(|| current.to_string());
    };
    let len = options.len() as isize;
    let next = (pos as isize + delta).rem_euclid(len) as usize;
    options[next].clone()
}
