use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use galleria_core::{PageFetch, PageResponse, PaginatedSelectionController, Record, Resolution};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};
use ratatui::{Frame, Terminal};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::theme::{self, TuiTheme};

// longest input accepted by the "select first N" box
const MAX_COUNT_DIGITS: usize = 9;

pub trait EventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>>;
}
pub struct RealEventSource;
impl EventSource for RealEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if crossterm::event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

pub enum Action {
    None,
    Fetch(PageFetch),
    Quit,
}

/// View-side state around the controller: row cursor, the bulk-select
/// overlay and short-lived toasts. Everything page- or selection-related is
/// read back from the controller on every draw.
pub struct Browser {
    controller: PaginatedSelectionController,
    cursor: usize,
    // input buffer of the bulk-select overlay while it is open
    bulk_input: Option<String>,
    toast: Option<(String, Instant)>,
}

impl Browser {
    pub fn new(controller: PaginatedSelectionController) -> Self {
        Self {
            controller,
            cursor: 0,
            bulk_input: None,
            toast: None,
        }
    }

    pub fn controller(&self) -> &PaginatedSelectionController {
        &self.controller
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_overlay_open(&self) -> bool {
        self.bulk_input.is_some()
    }

    pub fn selected_records(&self) -> Vec<Record> {
        self.controller.selection().to_ordered_vec()
    }

    pub fn start(&mut self) -> PageFetch {
        self.controller.go_to_page(0)
    }

    pub fn on_response(&mut self, response: PageResponse) {
        if let Resolution::Applied = self.controller.resolve(response) {
            self.cursor = 0;
        }
    }

    fn toast(&mut self, msg: impl Into<String>, ms: u64) {
        self.toast = Some((msg.into(), Instant::now() + Duration::from_millis(ms)));
    }

    // Relative moves start from the page being loaded, so quick repeated
    // presses keep advancing instead of re-requesting the same page.
    fn navigation_base(&self) -> usize {
        self.controller
            .pending_page()
            .unwrap_or_else(|| self.controller.page_index())
    }

    fn last_page(&self) -> Option<usize> {
        self.controller.page_count().checked_sub(1)
    }

    fn go(&mut self, index: usize) -> Action {
        debug!(page = index, "page change requested");
        Action::Fetch(self.controller.go_to_page(index))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        if self.bulk_input.is_some() {
            self.handle_overlay_key(key);
            return Action::None;
        }
        let base = self.navigation_base();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < self.controller.records().len() {
                    self.cursor += 1;
                }
                Action::None
            }
            KeyCode::Char(' ') => {
                if let Some(record) = self.controller.records().get(self.cursor).cloned() {
                    self.controller.toggle_row_selection(&record);
                }
                Action::None
            }
            KeyCode::Char('a') => {
                let rows = self.controller.records().to_vec();
                let n = rows.len();
                self.controller.replace_selection(rows);
                self.toast(format!("Selected {} rows", n), 900);
                Action::None
            }
            KeyCode::Char('c') => {
                self.controller.replace_selection(Vec::new());
                self.toast("Selection cleared", 900);
                Action::None
            }
            KeyCode::Char('n') => {
                self.bulk_input = Some(String::new());
                Action::None
            }
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') if base > 0 => self.go(base - 1),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => match self.last_page() {
                Some(last) if base < last => self.go(base + 1),
                _ => Action::None,
            },
            KeyCode::Home if base != 0 => self.go(0),
            KeyCode::End => match self.last_page() {
                Some(last) if base != last => self.go(last),
                _ => Action::None,
            },
            KeyCode::Char('r') => self.go(base),
            _ => Action::None,
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) {
        let Some(buf) = self.bulk_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Esc => self.bulk_input = None,
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Char(ch)
                if buf.len() < MAX_COUNT_DIGITS
                    && (ch.is_ascii_digit() || (ch == '-' && buf.is_empty())) =>
            {
                buf.push(ch);
            }
            KeyCode::Enter => {
                let raw = buf.clone();
                // Invalid counts leave the overlay open, like a disabled submit.
                if self.controller.request_bulk_select_input(&raw) {
                    self.bulk_input = None;
                    let n = self.controller.selection().len();
                    self.toast(format!("Selected {} rows", n), 900);
                }
            }
            _ => {}
        }
    }

    fn draw(&self, f: &mut Frame, thm: &TuiTheme) {
        let view = self.controller.view();
        let area = f.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // selection count + loading/notice
                Constraint::Min(5),    // table
                Constraint::Length(4), // pager + shortcuts
            ])
            .split(area);

        let mut status = vec![
            Span::raw("Selected: "),
            Span::styled(
                view.selected_count.to_string(),
                Style::default().fg(thm.selected_fg).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" rows"),
        ];
        if let Some(p) = view.requested_page {
            status.push(Span::styled(
                format!("  Loading page {}…", p + 1),
                Style::default().add_modifier(Modifier::DIM),
            ));
        }
        if let Some(notice) = &view.notice {
            status.push(Span::styled(
                format!("  Load failed: {}", truncate_msg(notice, 80)),
                Style::default().fg(thm.help_fg),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(status)), chunks[0]);

        let header = Row::new([
            "", "TITLE", "PLACE OF ORIGIN", "ARTIST", "INSCRIPTIONS", "START DATE", "END DATE",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = view
            .rows
            .iter()
            .map(|row| {
                let r = &row.record;
                let style = if row.selected {
                    Style::default().fg(thm.selected_fg)
                } else {
                    Style::default()
                };
                Row::new(vec![
                    Cell::from(if row.selected { "[x]" } else { "[ ]" }),
                    Cell::from(cell_text(&r.title)),
                    Cell::from(cell_text(&r.place_of_origin)),
                    Cell::from(cell_text(&r.artist_display)),
                    Cell::from(cell_text(&r.inscriptions)),
                    Cell::from(r.date_start.map(|d| d.to_string()).unwrap_or_default()),
                    Cell::from(r.date_end.map(|d| d.to_string()).unwrap_or_default()),
                ])
                .style(style)
            })
            .collect();
        let widths = [
            Constraint::Length(3),
            Constraint::Percentage(24),
            Constraint::Percentage(14),
            Constraint::Percentage(24),
            Constraint::Percentage(18),
            Constraint::Length(10),
            Constraint::Length(10),
        ];
        let title = format!(
            "Artworks — page {} of {}",
            view.page_index + 1,
            view.page_count.max(1)
        );
        let table = Table::new(rows, widths)
            .header(header)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(thm.border_fg)),
            )
            .row_highlight_style(
                Style::default()
                    .fg(thm.highlight_fg)
                    .bg(thm.highlight_bg),
            );
        let mut state = TableState::default().with_selected(if view.rows.is_empty() {
            None
        } else {
            Some(self.cursor)
        });
        f.render_stateful_widget(table, chunks[1], &mut state);

        let links: String = view
            .page_links
            .iter()
            .map(|&p| {
                if p == view.page_index {
                    format!("[{}]", p + 1)
                } else {
                    format!(" {} ", p + 1)
                }
            })
            .collect();
        let ln1 = format!(
            "{}   {} {} {}",
            view.report,
            if view.has_previous { "‹" } else { " " },
            links,
            if view.has_next { "›" } else { " " }
        );
        let mut ln2 = String::from(
            "Space toggle | a select page | c clear | n select first N | ←/→ page | Home/End | r reload | q quit",
        );
        if let Some((msg, until)) = &self.toast {
            if Instant::now() <= *until {
                ln2.push_str(&format!("  — {}", msg));
            }
        }
        let footer = Paragraph::new(vec![Line::raw(ln1), Line::raw(ln2)])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Pager")
                    .border_style(Style::default().fg(thm.border_fg)),
            )
            .style(Style::default().fg(thm.help_fg))
            .wrap(Wrap { trim: true });
        f.render_widget(footer, chunks[2]);

        if let Some(input) = &self.bulk_input {
            let popup = centered_rect(40, 3, area);
            let text = if input.is_empty() {
                Line::from(Span::styled(
                    "Select rows",
                    Style::default().add_modifier(Modifier::DIM),
                ))
            } else {
                Line::from(input.as_str())
            };
            f.render_widget(Clear, popup);
            f.render_widget(
                Paragraph::new(text).block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Select first N — Enter submit")
                        .border_style(Style::default().fg(thm.border_fg)),
                ),
                popup,
            );
        }
    }
}

/// Runs page fetches on the runtime and keeps at most one in flight.
struct Fetcher<'a> {
    rt: &'a Handle,
    tx: mpsc::UnboundedSender<PageResponse>,
    in_flight: Option<JoinHandle<()>>,
}

impl Fetcher<'_> {
    fn spawn(&mut self, fetch: PageFetch) {
        if let Some(prev) = self.in_flight.take() {
            prev.abort();
        }
        let ticket = fetch.ticket();
        debug!(page = ticket.index(), seq = ticket.seq(), "page fetch spawned");
        let tx = self.tx.clone();
        self.in_flight = Some(self.rt.spawn(async move {
            // receiver gone means the browser already exited
            let _ = tx.send(fetch.run().await);
        }));
    }

    fn abort(&mut self) {
        if let Some(h) = self.in_flight.take() {
            h.abort();
        }
    }
}

pub fn run_browser_default(
    controller: PaginatedSelectionController,
    rt: &Handle,
    alt_screen: bool,
) -> Result<Vec<Record>> {
    let mut es = RealEventSource;
    run_browser_with(controller, rt, &mut es, true, alt_screen)
}

/// Drive the browser until the user quits and return the selection.
///
/// With `draw == false` nothing touches the terminal and every outstanding
/// page is applied before the next event is read, which keeps scripted
/// sessions deterministic.
pub fn run_browser_with(
    controller: PaginatedSelectionController,
    rt: &Handle,
    es: &mut dyn EventSource,
    draw: bool,
    alt_screen: bool,
) -> Result<Vec<Record>> {
    let mut browser = Browser::new(controller);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut fetcher = Fetcher {
        rt,
        tx,
        in_flight: None,
    };
    fetcher.spawn(browser.start());

    let mut terminal = if draw {
        match open_terminal(alt_screen) {
            Ok(t) => Some(t),
            Err(e) => {
                fetcher.abort();
                return Err(e);
            }
        }
    } else {
        None
    };
    let thm = theme::load_tui_theme();

    let res = event_loop(
        &mut browser,
        &mut rx,
        &mut fetcher,
        es,
        terminal.as_mut(),
        &thm,
    );

    fetcher.abort();
    if draw {
        disable_raw_mode()?;
        if alt_screen {
            crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen)?;
        }
    }
    res?;
    Ok(browser.selected_records())
}

/// Raw mode (and the alternate screen) are rolled back if any later setup
/// step fails.
fn open_terminal(alt_screen: bool) -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let setup = || -> Result<Terminal<CrosstermBackend<Stdout>>> {
        let mut stdout = io::stdout();
        if alt_screen {
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        }
        Ok(Terminal::new(CrosstermBackend::new(stdout))?)
    };
    rollback_on_err(setup, || restore_terminal(alt_screen))
}

fn rollback_on_err<T>(step: impl FnOnce() -> Result<T>, rollback: impl FnOnce()) -> Result<T> {
    let res = step();
    if res.is_err() {
        rollback();
    }
    res
}

fn restore_terminal(alt_screen: bool) {
    if alt_screen {
        let _ = crossterm::execute!(io::stdout(), crossterm::terminal::LeaveAlternateScreen);
    }
    let _ = disable_raw_mode();
}

fn event_loop(
    browser: &mut Browser,
    rx: &mut mpsc::UnboundedReceiver<PageResponse>,
    fetcher: &mut Fetcher<'_>,
    es: &mut dyn EventSource,
    mut terminal: Option<&mut Terminal<CrosstermBackend<Stdout>>>,
    thm: &TuiTheme,
) -> Result<()> {
    loop {
        if terminal.is_none() {
            while browser.controller().is_loading() {
                match rx.blocking_recv() {
                    Some(resp) => browser.on_response(resp),
                    None => break,
                }
            }
        }
        while let Ok(resp) = rx.try_recv() {
            browser.on_response(resp);
        }

        if let Some(term) = terminal.as_mut() {
            term.draw(|f| browser.draw(f, thm))?;
        }

        if let Some(Event::Key(k)) = es.poll(Duration::from_millis(100))? {
            match browser.handle_key(k) {
                Action::Fetch(fetch) => fetcher.spawn(fetch),
                Action::Quit => return Ok(()),
                Action::None => {}
            }
        }
    }
}

fn cell_text(s: &Option<String>) -> String {
    s.as_deref().unwrap_or("").replace('\n', " ")
}

fn truncate_msg(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        format!("{}…", s.chars().take(max).collect::<String>())
    } else {
        s.to_string()
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
