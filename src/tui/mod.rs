// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Terminal viewer.
//!
//! Keyboard-driven stand-in for pointer interaction: moving the annotation
//! selection hovers (leave old, enter new), Enter toggles the lock, `u`
//! unlocks directly. The page pane renders the headless line model with the
//! highlight classes mapped to styles.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::model::{CommentId, PageDoc};
use crate::ops::{Coordinator, GuiCoordinator};
use crate::render::{page_lines, SpanFlags};
use crate::scan::scan_page;
use crate::tabs::TabStrip;

const FOOTER_LABEL_COLOR: Color = Color::Gray;
const FOOTER_KEY_COLOR: Color = Color::Cyan;
const TOAST_COLOR: Color = Color::Yellow;

/// The built-in demo page (also served by `--demo` on the CLI).
pub fn demo_page() -> PageDoc {
    crate::model::fixtures::annotated_demo_page()
}

/// Runs the viewer over the demo page.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    run_with_pages(vec![("demo".to_owned(), demo_page())])
}

/// Runs the interactive viewer over a set of named pages.
pub fn run_with_pages(pages: Vec<(String, PageDoc)>) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut app = App::new(pages);

    while !app.should_quit {
        terminal.draw(|frame| draw(frame, &mut app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                _ => {}
            }
        }
    }

    Ok(())
}

/// One interactive annotation in the selection list.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    Code { comment_id: CommentId, substitutes: bool },
    Gui { comment_id: CommentId },
}

impl Entry {
    fn label(&self) -> String {
        match self {
            Self::Code { comment_id, substitutes: true } => format!("{comment_id} ▸ swaps code"),
            Self::Code { comment_id, substitutes: false } => format!("{comment_id} ▸ highlights"),
            Self::Gui { comment_id } => format!("{comment_id} ▸ swaps image"),
        }
    }
}

struct PageView {
    name: String,
    doc: PageDoc,
    coordinator: Coordinator,
    gui: GuiCoordinator,
    strips: Vec<TabStrip>,
    entries: Vec<Entry>,
    hovered: Option<usize>,
    scan_error_count: usize,
}

impl PageView {
    fn new(name: String, mut doc: PageDoc) -> Self {
        let report = scan_page(&doc);
        let (strips, strip_errors) = TabStrip::build_all(&mut doc);
        let scan_error_count = report.errors().len() + strip_errors.len();
        let (comments, gui_comments, _) = report.into_parts();

        let mut entries = Vec::with_capacity(comments.len() + gui_comments.len());
        for comment in &comments {
            entries.push(Entry::Code {
                comment_id: comment.comment_id().clone(),
                substitutes: comment.replacement().is_some(),
            });
        }
        for comment in &gui_comments {
            entries.push(Entry::Gui { comment_id: comment.comment_id().clone() });
        }

        Self {
            name,
            doc,
            coordinator: Coordinator::new(comments),
            gui: GuiCoordinator::new(gui_comments),
            strips,
            entries,
            hovered: None,
            scan_error_count,
        }
    }

    fn hover(&mut self, index: Option<usize>) -> Result<(), String> {
        if index == self.hovered {
            return Ok(());
        }
        if let Some(old) = self.hovered.take() {
            self.leave_entry(old)?;
        }
        if let Some(new) = index {
            self.enter_entry(new)?;
            self.hovered = Some(new);
        }
        Ok(())
    }

    fn enter_entry(&mut self, index: usize) -> Result<(), String> {
        match self.entries[index].clone() {
            Entry::Code { comment_id, .. } => self
                .coordinator
                .hover_enter(&mut self.doc, &comment_id)
                .map(drop)
                .map_err(|err| err.to_string()),
            Entry::Gui { comment_id } => self
                .gui
                .hover_enter(&mut self.doc, &comment_id)
                .map(drop)
                .map_err(|err| err.to_string()),
        }
    }

    fn leave_entry(&mut self, index: usize) -> Result<(), String> {
        match self.entries[index].clone() {
            Entry::Code { comment_id, .. } => self
                .coordinator
                .hover_leave(&mut self.doc, &comment_id)
                .map(drop)
                .map_err(|err| err.to_string()),
            Entry::Gui { comment_id } => self
                .gui
                .hover_leave(&mut self.doc, &comment_id)
                .map(drop)
                .map_err(|err| err.to_string()),
        }
    }

    fn click_hovered(&mut self) -> Result<(), String> {
        let Some(index) = self.hovered else {
            return Err("nothing hovered".to_owned());
        };
        match self.entries[index].clone() {
            Entry::Code { comment_id, .. } => self
                .coordinator
                .click(&mut self.doc, &comment_id)
                .map(drop)
                .map_err(|err| err.to_string()),
            Entry::Gui { .. } => Err("gui comments have no lock".to_owned()),
        }
    }

    fn unlock_hovered(&mut self) -> Result<(), String> {
        let Some(index) = self.hovered else {
            return Err("nothing hovered".to_owned());
        };
        match self.entries[index].clone() {
            Entry::Code { comment_id, .. } => self
                .coordinator
                .unlock(&mut self.doc, &comment_id)
                .map(drop)
                .map_err(|err| err.to_string()),
            Entry::Gui { .. } => Ok(()),
        }
    }
}

struct App {
    pages: Vec<PageView>,
    page_ix: usize,
    strip_ix: usize,
    should_quit: bool,
    toast: Option<String>,
}

impl App {
    fn new(pages: Vec<(String, PageDoc)>) -> Self {
        let pages: Vec<PageView> =
            pages.into_iter().map(|(name, doc)| PageView::new(name, doc)).collect();
        Self { pages, page_ix: 0, strip_ix: 0, should_quit: false, toast: None }
    }

    fn page(&self) -> Option<&PageView> {
        self.pages.get(self.page_ix)
    }

    fn page_mut(&mut self) -> Option<&mut PageView> {
        self.pages.get_mut(self.page_ix)
    }

    fn set_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(message.into());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.toast = None;
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Down | KeyCode::Char('j') => self.move_hover(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_hover(-1),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let result = self.page_mut().map(PageView::click_hovered);
                if let Some(Err(message)) = result {
                    self.set_toast(message);
                }
            }
            KeyCode::Char('u') => {
                let result = self.page_mut().map(PageView::unlock_hovered);
                if let Some(Err(message)) = result {
                    self.set_toast(message);
                }
            }
            KeyCode::Tab => self.next_page(),
            KeyCode::Char('s') => self.next_strip(),
            KeyCode::Char(']') => self.move_tab(1),
            KeyCode::Char('[') => self.move_tab(-1),
            _ => {}
        }
    }

    fn move_hover(&mut self, step: isize) {
        let Some(page) = self.page_mut() else {
            return;
        };
        if page.entries.is_empty() {
            return;
        }
        let len = page.entries.len() as isize;
        let next = match page.hovered {
            Some(current) => (current as isize + step).rem_euclid(len) as usize,
            None if step >= 0 => 0,
            None => (len - 1) as usize,
        };
        if let Err(message) = page.hover(Some(next)) {
            self.set_toast(message);
        }
    }

    fn next_page(&mut self) {
        if self.pages.len() < 2 {
            return;
        }
        // The hover ends when the pointer leaves the page.
        let leave = self.page_mut().map(|page| page.hover(None));
        if let Some(Err(message)) = leave {
            self.set_toast(message);
        }
        self.page_ix = (self.page_ix + 1) % self.pages.len();
        self.strip_ix = 0;
    }

    fn next_strip(&mut self) {
        let Some(page) = self.page() else {
            return;
        };
        if page.strips.is_empty() {
            return;
        }
        self.strip_ix = (self.strip_ix + 1) % page.strips.len();
    }

    fn move_tab(&mut self, step: isize) {
        let strip_ix = self.strip_ix;
        let Some(page) = self.page_mut() else {
            return;
        };
        let Some(strip) = page.strips.get_mut(strip_ix) else {
            return;
        };
        let len = strip.tabs().len() as isize;
        let next = (strip.selected() as isize + step).rem_euclid(len) as usize;
        if let Err(err) = strip.select(&mut page.doc, next) {
            self.set_toast(err.to_string());
        }
    }
}

fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.size();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let main_area = layout[0];
    let footer_area = layout[1];

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(32), Constraint::Min(0)])
        .split(main_area);

    draw_entry_list(frame, panes[0], app);
    draw_page(frame, panes[1], app);
    draw_footer(frame, footer_area, app);
}

fn draw_entry_list(frame: &mut Frame<'_>, area: Rect, app: &mut App) {
    let Some(page) = app.page() else {
        return;
    };
    let items: Vec<ListItem<'_>> =
        page.entries.iter().map(|entry| ListItem::new(entry.label())).collect();
    let mut state = ListState::default();
    state.select(page.hovered);

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" annotations "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_page(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let Some(page) = app.page() else {
        return;
    };
    let lines: Vec<Line<'_>> = page_lines(&page.doc)
        .into_iter()
        .map(|line| {
            Line::from(
                line.into_iter()
                    .map(|span| Span::styled(span.text, style_for(span.flags)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    let mut title = format!(" page: {} ", page.name);
    if let Some(owner) = page.coordinator.lock().current() {
        title.push_str(&format!("[locked: {owner}] "));
    }
    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame<'_>, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for (key, label) in [
        ("↑/↓", "hover"),
        ("⏎", "lock"),
        ("u", "unlock"),
        ("[/]", "tab"),
        ("⇥", "page"),
        ("q", "quit"),
    ] {
        spans.push(Span::styled(format!(" {key} "), Style::default().fg(FOOTER_KEY_COLOR)));
        spans.push(Span::styled(label, Style::default().fg(FOOTER_LABEL_COLOR)));
    }
    if let Some(page) = app.page() {
        if page.scan_error_count > 0 {
            spans.push(Span::styled(
                format!("  {} scan errors", page.scan_error_count),
                Style::default().fg(TOAST_COLOR),
            ));
        }
    }
    if let Some(toast) = &app.toast {
        spans.push(Span::styled(format!("  {toast}"), Style::default().fg(TOAST_COLOR)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Maps highlight flags to terminal styles, combined states last.
fn style_for(flags: SpanFlags) -> Style {
    let mut style = Style::default();
    let highlighted = flags.contains(SpanFlags::HIGHLIGHTED);
    let locked = flags.contains(SpanFlags::LOCKED);
    match (highlighted, locked) {
        (true, false) => style = style.bg(Color::Yellow).fg(Color::Black),
        (false, true) => style = style.bg(Color::Cyan).fg(Color::Black),
        (true, true) => style = style.bg(Color::Magenta).fg(Color::Black),
        (false, false) => {}
    }
    if flags.contains(SpanFlags::INSERTED) {
        style = style.add_modifier(Modifier::BOLD);
    }
    style
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
