use crate::activity::{ActivityEvent, ActivityLog, EventType};
use crate::clipboard::SystemClipboard;
use crate::lookup::{LookupController, LookupOutcome, Ticket};
use crate::size::ImageSize;
use crate::surface::{MovieCard, Panel, Surface};
use crate::tmdb::{MovieSearch, TmdbClient};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

const BLINK_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Focus {
    Input,
    Result,
}

/// A result only takes focus if the search box is untouched since the
/// lookup started, so keys typed meanwhile keep going into the input.
fn focus_after_result(current: Focus, input_edited: bool) -> Focus {
    if input_edited {
        current
    } else {
        Focus::Result
    }
}

type LookupReply = (Ticket, LookupOutcome);

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    client: TmdbClient,
    controller: LookupController<SystemClipboard>,
    lookup_tx: mpsc::UnboundedSender<LookupReply>,
    lookup_rx: mpsc::UnboundedReceiver<LookupReply>,
    activity: ActivityLog,
    input_buffer: String,
    focus: Focus,
    input_edited: bool,
    cursor_visible: bool,
    last_blink: Instant,
}

impl Tui {
    pub fn new(client: TmdbClient, controller: LookupController<SystemClipboard>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        let (lookup_tx, lookup_rx) = mpsc::unbounded_channel();

        Ok(Self {
            terminal,
            client,
            controller,
            lookup_tx,
            lookup_rx,
            activity: ActivityLog::new(),
            input_buffer: String::new(),
            focus: Focus::Input,
            input_edited: false,
            cursor_visible: true,
            last_blink: Instant::now(),
        })
    }

    pub async fn run(&mut self, initial_query: Option<String>) -> Result<()> {
        if let Some(query) = initial_query {
            self.input_buffer = query;
            self.submit();
        }

        loop {
            self.check_pending_lookups();

            let now = Instant::now();
            self.controller.tick(now);
            if now.duration_since(self.last_blink) >= BLINK_INTERVAL {
                self.cursor_visible = !self.cursor_visible;
                self.last_blink = now;
            }

            self.draw()?;

            let next = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await?;

            if let Some(Event::Key(key)) = next {
                if key.kind == KeyEventKind::Press && self.handle_key(key) {
                    break;
                }
            }
        }

        Ok(())
    }

    fn check_pending_lookups(&mut self) {
        while let Ok((ticket, outcome)) = self.lookup_rx.try_recv() {
            if !self.controller.finish(ticket, outcome) {
                continue;
            }
            match &self.controller.surface().panel {
                Panel::Result(card) => {
                    let message = format!("Found {}", card.title);
                    self.activity.push(EventType::Success, message);
                    self.focus = focus_after_result(self.focus, self.input_edited);
                }
                Panel::Error(message) => {
                    let message = message.clone();
                    self.activity.push(EventType::Error, message);
                }
                Panel::Hidden => {}
            }
        }
    }

    fn submit(&mut self) {
        let Some(pending) = self.controller.begin(&self.input_buffer) else {
            return;
        };
        self.activity
            .push(EventType::Info, format!("Searching for '{}'", pending.query));
        self.focus = Focus::Input;
        self.input_edited = false;

        let client = self.client.clone();
        let tx = self.lookup_tx.clone();
        tokio::spawn(async move {
            let outcome = client.search_movie(&pending.query).await;
            if tx.send((pending.ticket, outcome)).is_err() {
                debug!("UI closed before lookup #{} finished", pending.ticket.id());
            }
        });
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }
        match self.focus {
            Focus::Input => self.handle_input_key(key.code),
            Focus::Result => self.handle_result_key(key.code),
        }
    }

    fn handle_input_key(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Esc => return true,
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => {
                if self.controller.surface().result().is_some() {
                    self.focus = Focus::Result;
                }
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                self.input_edited = true;
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
                self.input_edited = true;
            }
            _ => {}
        }
        false
    }

    fn handle_result_key(&mut self, key: KeyCode) -> bool {
        let active = self.controller.surface().active_size;
        match key {
            KeyCode::Char('q') => return true,
            KeyCode::Esc | KeyCode::Tab | KeyCode::Char('/') => {
                self.focus = Focus::Input;
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.controller.select_size(active.smaller().token());
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.controller.select_size(active.larger().token());
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                let index = c.to_digit(10).unwrap_or(0) as usize;
                if let Some(size) = ImageSize::from_index(index) {
                    self.controller.select_size(size.token());
                }
            }
            KeyCode::Char('c') | KeyCode::Enter => {
                self.controller.copy_link(Instant::now());
                let message = format!("Copied {} link", self.controller.surface().active_size);
                self.activity.push(EventType::Copy, message);
            }
            _ => {}
        }
        false
    }

    fn draw(&mut self) -> Result<()> {
        let surface = self.controller.surface().clone();
        let events = self.activity.events().clone();
        let input_buffer = self.input_buffer.clone();
        let focus = self.focus;
        let cursor_visible = self.cursor_visible;

        self.terminal.draw(|frame| {
            let size = frame.size();

            let main_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Length(3),
                    Constraint::Min(10),
                    Constraint::Length(1),
                ])
                .split(size);

            Self::render_header(frame, main_chunks[0], &surface);
            Self::render_search_input(
                frame,
                main_chunks[1],
                &input_buffer,
                focus == Focus::Input && cursor_visible,
                focus == Focus::Input,
            );

            let body_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                .split(main_chunks[2]);

            Self::render_panel(frame, body_chunks[0], &surface, focus == Focus::Result);
            Self::render_activity_log(frame, body_chunks[1], &events);
            Self::render_help_bar(frame, main_chunks[3], focus);
        })?;

        Ok(())
    }

    fn render_header(frame: &mut Frame, area: Rect, surface: &Surface) {
        let status = if surface.loading {
            ("◐ SEARCHING", Color::Yellow)
        } else {
            match surface.panel {
                Panel::Hidden => ("○ IDLE", Color::DarkGray),
                Panel::Error(_) => ("✗ ERROR", Color::Red),
                Panel::Result(_) => ("● FOUND", Color::Green),
            }
        };

        let header = Paragraph::new(Line::from(vec![
            Span::styled(" POSTER LOOKUP ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            Span::styled("│ ", Style::default().fg(Color::DarkGray)),
            Span::styled("TMDb", Style::default().fg(Color::Cyan)),
            Span::styled(" │ ", Style::default().fg(Color::DarkGray)),
            Span::styled(status.0, Style::default().fg(status.1)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta)),
        );

        frame.render_widget(header, area);
    }

    fn render_search_input(frame: &mut Frame, area: Rect, input: &str, cursor: bool, focused: bool) {
        let cursor_char = if cursor { "▌" } else { " " };
        let border = if focused { Color::Yellow } else { Color::DarkGray };

        let line = Line::from(vec![
            Span::styled(" > ", Style::default().fg(Color::Yellow)),
            Span::styled(input, Style::default().fg(Color::White)),
            Span::styled(cursor_char, Style::default().fg(Color::Yellow)),
        ]);

        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(" Movie title ")
                .title_style(Style::default().fg(border).add_modifier(Modifier::BOLD)),
        );

        frame.render_widget(paragraph, area);
    }

    fn render_panel(frame: &mut Frame, area: Rect, surface: &Surface, focused: bool) {
        let (title, color, text) = if surface.loading {
            (
                " Searching ",
                Color::Yellow,
                vec![
                    Line::from(""),
                    Line::from(Span::styled("  Searching TMDb...", Style::default().fg(Color::Yellow))),
                ],
            )
        } else {
            match &surface.panel {
                Panel::Hidden => (
                    " Result ",
                    Color::DarkGray,
                    vec![
                        Line::from(""),
                        Line::from(Span::styled(
                            "  Type a movie title and press Enter.",
                            Style::default().fg(Color::DarkGray),
                        )),
                    ],
                ),
                Panel::Error(message) => (
                    " Error ",
                    Color::Red,
                    vec![
                        Line::from(""),
                        Line::from(Span::styled(format!("  {}", message), Style::default().fg(Color::Red))),
                    ],
                ),
                Panel::Result(card) => (" Result ", Color::Green, Self::result_lines(card, surface, focused)),
            }
        };

        let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        );

        frame.render_widget(paragraph, area);
    }

    fn result_lines<'a>(card: &'a MovieCard, surface: &'a Surface, focused: bool) -> Vec<Line<'a>> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {}", card.title),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];

        if !card.description.is_empty() {
            text.push(Line::from(Span::styled(
                format!("  {}", card.description),
                Style::default().fg(Color::Gray),
            )));
            text.push(Line::from(""));
        }

        text.push(Line::from(vec![
            Span::styled("  Poster  ", Style::default().fg(Color::DarkGray)),
            Span::styled(&card.poster_src, Style::default().fg(Color::Cyan)),
        ]));
        text.push(Line::from(""));

        let mut sizes = vec![Span::styled("  Size    ", Style::default().fg(Color::DarkGray))];
        for (i, size) in ImageSize::all().iter().enumerate() {
            let style = if *size == surface.active_size {
                Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            sizes.push(Span::styled(format!(" {} {} ", i + 1, size.label()), style));
            sizes.push(Span::raw(" "));
        }
        text.push(Line::from(sizes));
        text.push(Line::from(""));

        let link_style = if surface.link_selected {
            Style::default().fg(Color::White).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::White)
        };
        text.push(Line::from(vec![
            Span::styled("  Link    ", Style::default().fg(Color::DarkGray)),
            Span::styled(&surface.thumbnail_link, link_style),
        ]));
        text.push(Line::from(""));

        let button_color = if focused { Color::Green } else { Color::DarkGray };
        text.push(Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(
                format!("[ {} ]", surface.copy_label()),
                Style::default().fg(button_color).add_modifier(Modifier::BOLD),
            ),
        ]));

        text
    }

    fn render_activity_log(
        frame: &mut Frame,
        area: Rect,
        events: &std::collections::VecDeque<ActivityEvent>,
    ) {
        let max_visible = (area.height.saturating_sub(2)) as usize;
        let skip = events.len().saturating_sub(max_visible);

        let items: Vec<ListItem> = events
            .iter()
            .skip(skip)
            .map(|event| {
                let time_str = event.timestamp.format("%H:%M:%S").to_string();
                let (icon, color) = match event.event_type {
                    EventType::Info => ("ℹ", Color::Blue),
                    EventType::Success => ("✓", Color::Green),
                    EventType::Error => ("✗", Color::Red),
                    EventType::Copy => ("⧉", Color::Magenta),
                };

                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {} ", time_str), Style::default().fg(Color::DarkGray)),
                    Span::styled(format!("{}  ", icon), Style::default().fg(color)),
                    Span::styled(event.message.clone(), Style::default().fg(Color::White)),
                ]))
            })
            .collect();

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Activity ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        );

        frame.render_widget(list, area);
    }

    fn render_help_bar(frame: &mut Frame, area: Rect, focus: Focus) {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let label = |l: &'static str| Span::styled(l, Style::default().fg(Color::DarkGray));

        let spans = match focus {
            Focus::Input => vec![
                Span::raw(" "),
                key("[Enter]", Color::Yellow),
                label(" Search  "),
                key("[Tab]", Color::Cyan),
                label(" Result  "),
                key("[Esc]", Color::Red),
                label(" Quit"),
            ],
            Focus::Result => vec![
                Span::raw(" "),
                key("[←→/1-7]", Color::Magenta),
                label(" Size  "),
                key("[C]", Color::Green),
                label(" Copy  "),
                key("[Tab]", Color::Cyan),
                label(" Search  "),
                key("[Q]", Color::Red),
                label(" Quit"),
            ],
        };

        let help = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
        frame.render_widget(help, area);
    }

    pub fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

pub async fn run_tui(
    client: TmdbClient,
    controller: LookupController<SystemClipboard>,
    initial_query: Option<String>,
) -> Result<()> {
    let mut tui = Tui::new(client, controller)?;
    tui.run(initial_query).await?;
    tui.cleanup()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_takes_focus_when_input_untouched() {
        assert_eq!(focus_after_result(Focus::Input, false), Focus::Result);
    }

    #[test]
    fn test_typing_keeps_input_focus() {
        assert_eq!(focus_after_result(Focus::Input, true), Focus::Input);
    }

    #[test]
    fn test_result_focus_is_kept() {
        assert_eq!(focus_after_result(Focus::Result, true), Focus::Result);
    }
}
