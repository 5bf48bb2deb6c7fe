//! Interactive terminal browser for the download history.
//!
//! Lists the user's downloads newest first. Enter (or a click) picks a record
//! to download again, `c` copies its source URL, Esc/q leaves.

use crate::history::DownloadRecord;
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

const BG: Color = Color::Rgb(0, 0, 0);
const FG: Color = Color::Rgb(255, 255, 255);
const META_FG: Color = Color::Rgb(100, 100, 100);
const HIGHLIGHT_BG: Color = Color::Rgb(20, 20, 20);

const NOTIFICATION_TIME: Duration = Duration::from_millis(500);
const CLICK_DELAY: Duration = Duration::from_millis(200);

/// What the user chose in the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    /// Submit this record's source URL again
    Redownload(DownloadRecord),
    /// Copy the source URL to the clipboard
    CopySource(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Exit,
    Up,
    Down,
    Redownload(usize),
    CopySource(usize),
}

fn action_for_key(code: KeyCode, selected: Option<usize>) -> Option<KeyAction> {
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Some(KeyAction::Exit),
        KeyCode::Up | KeyCode::Char('k') => Some(KeyAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(KeyAction::Down),
        KeyCode::Enter => selected.map(KeyAction::Redownload),
        KeyCode::Char('c') => selected.map(KeyAction::CopySource),
        _ => None,
    }
}

pub struct HistoryViewer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    records: Vec<DownloadRecord>,
    list_state: ListState,
    notification: Option<(String, Instant)>,
    pending_click: Option<(usize, Instant)>,
}

impl HistoryViewer {
    /// Enters the alternate screen and prepares the list.
    ///
    /// # Errors
    /// - If the terminal cannot be switched to raw/alternate mode
    pub fn new(records: Vec<DownloadRecord>) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        let mut list_state = ListState::default();
        if !records.is_empty() {
            list_state.select(Some(0));
        }

        Ok(Self {
            terminal,
            records,
            list_state,
            notification: None,
            pending_click: None,
        })
    }

    /// Runs the event loop until the user picks an action or leaves.
    pub fn run(&mut self) -> Result<Option<HistoryAction>> {
        if self.records.is_empty() {
            self.cleanup()?;
            return Ok(None);
        }

        tracing::debug!("History browser started with {} records", self.records.len());

        let mut chosen: Option<HistoryAction> = None;

        loop {
            self.draw()?;

            if let Some((_, shown_at)) = self.notification {
                if shown_at.elapsed() >= NOTIFICATION_TIME {
                    self.notification = None;
                    if chosen.is_some() {
                        break;
                    }
                }
            }

            if let Some((index, clicked_at)) = self.pending_click {
                if clicked_at.elapsed() >= CLICK_DELAY {
                    self.pending_click = None;
                    chosen = self.choose(KeyAction::Redownload(index));
                }
            }

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => {
                        match action_for_key(key.code, self.list_state.selected()) {
                            Some(KeyAction::Exit) => break,
                            Some(KeyAction::Up) => self.list_state.select_previous(),
                            Some(KeyAction::Down) => self.list_state.select_next(),
                            Some(action) if chosen.is_none() => {
                                chosen = self.choose(action);
                            }
                            _ => {}
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }

        self.cleanup()?;
        Ok(chosen)
    }

    /// Turns a selection into a result and shows the matching notice.
    fn choose(&mut self, action: KeyAction) -> Option<HistoryAction> {
        let (message, chosen) = match action {
            KeyAction::Redownload(index) => (
                "Downloading again...",
                HistoryAction::Redownload(self.records.get(index)?.clone()),
            ),
            KeyAction::CopySource(index) => (
                "Source URL copied!",
                HistoryAction::CopySource(self.records.get(index)?.source_url.clone()),
            ),
            _ => return None,
        };
        tracing::debug!("History browser selection: {:?}", chosen);
        self.notification = Some((message.to_string(), Instant::now()));
        Some(chosen)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollUp => self.list_state.select_previous(),
            MouseEventKind::ScrollDown => self.list_state.select_next(),
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(selected) = self.list_state.selected() {
                    self.pending_click = Some((selected, Instant::now()));
                }
            }
            _ => {}
        }
    }

    fn draw(&mut self) -> Result<()> {
        let notification = self.notification.clone();
        let count = self.records.len();

        let items: Vec<ListItem> = self
            .records
            .iter()
            .map(|record| {
                let meta = Line::styled(
                    format!(
                        "{}  {}",
                        record.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                        record.source_url
                    ),
                    Style::default().fg(META_FG),
                );
                let title = Line::styled(record.title.clone(), Style::default().fg(FG));
                ListItem::new(vec![title, meta])
            })
            .collect();

        self.terminal.draw(|frame| {
            let area = frame.area();

            let padding_block = Block::default()
                .padding(Padding::uniform(1))
                .style(Style::default().bg(BG).fg(FG));
            frame.render_widget(&padding_block, area);
            let inner_area = padding_block.inner(area);

            let [list_area, footer_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner_area);

            let list = List::new(items)
                .block(
                    Block::default()
                        .title(format!(" Downloads ({count}) "))
                        .borders(Borders::ALL)
                        .padding(Padding::bottom(1)),
                )
                .highlight_style(Style::default().bg(HIGHLIGHT_BG))
                .highlight_symbol("> ")
                .highlight_spacing(HighlightSpacing::Always);
            frame.render_stateful_widget(list, list_area, &mut self.list_state);

            let help = Paragraph::new("↑↓ select, ↵ download again, c copy URL, esc/q exit")
                .alignment(Alignment::Center)
                .style(Style::default().fg(META_FG));
            frame.render_widget(help, footer_area);

            if let Some((message, _)) = notification {
                render_notification(frame, area, &message);
            }
        })?;

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Centered green notice box.
fn render_notification(frame: &mut Frame, screen: Rect, message: &str) {
    let width = (message.chars().count() as u16).saturating_add(4).min(screen.width);
    let height = 3;
    let modal = Rect {
        x: screen.x + screen.width.saturating_sub(width) / 2,
        y: screen.y + screen.height.saturating_sub(height) / 2,
        width,
        height: height.min(screen.height),
    };

    let style = Style::default().bg(Color::Green).fg(Color::Black);
    let block = Block::default().borders(Borders::ALL).style(style);
    frame.render_widget(&block, modal);
    frame.render_widget(
        Paragraph::new(message).style(style).alignment(Alignment::Center),
        block.inner(modal),
    );
}

impl Drop for HistoryViewer {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bindings() {
        assert_eq!(action_for_key(KeyCode::Esc, Some(0)), Some(KeyAction::Exit));
        assert_eq!(action_for_key(KeyCode::Char('q'), None), Some(KeyAction::Exit));
        assert_eq!(action_for_key(KeyCode::Up, Some(1)), Some(KeyAction::Up));
        assert_eq!(action_for_key(KeyCode::Char('j'), Some(1)), Some(KeyAction::Down));
        assert_eq!(
            action_for_key(KeyCode::Enter, Some(2)),
            Some(KeyAction::Redownload(2))
        );
        assert_eq!(
            action_for_key(KeyCode::Char('c'), Some(0)),
            Some(KeyAction::CopySource(0))
        );
        assert_eq!(action_for_key(KeyCode::Enter, None), None);
        assert_eq!(action_for_key(KeyCode::Char('x'), Some(0)), None);
    }
}
