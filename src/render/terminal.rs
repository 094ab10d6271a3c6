//! Terminal presenter implementation using ratatui
//!
//! Rows and the list container carry time-based fades. A fade is "playing" until the
//! configured duration has elapsed since it started; ratatui cannot blend alpha, so
//! fade progress is approximated with hidden, dimmed and normal text.

use crate::error::{ListError, Result};
use crate::item::Item;
use crate::presentation::{PresentationAdapter, Transition, TransitionTarget};
use crate::render::markup;
use crate::render::{ColorTheme, FrameRenderer, StatusLine};
use ratatui::crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Handle addressing one terminal row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RowHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Fade {
    transition: Transition,
    started: Instant,
}

impl Fade {
    fn new(transition: Transition) -> Self {
        Self {
            transition,
            started: Instant::now(),
        }
    }

    fn is_playing(&self, duration: Duration) -> bool {
        self.started.elapsed() < duration
    }

    /// 0.0 fully hidden, 1.0 fully shown
    fn opacity(&self, duration: Duration) -> f32 {
        let progress = if duration.is_zero() {
            1.0
        } else {
            (self.started.elapsed().as_secs_f32() / duration.as_secs_f32()).min(1.0)
        };
        match self.transition {
            Transition::Enter => progress,
            Transition::Exit => 1.0 - progress,
        }
    }
}

#[derive(Debug)]
struct TerminalRow {
    handle: RowHandle,
    text: String,
    fade: Option<Fade>,
}

/// Terminal presenter with ratatui backend
pub struct TerminalPresenter {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
    title: String,
    fade_duration: Duration,
    rows: Vec<TerminalRow>,
    container: Option<Fade>,
    next_handle: u64,
    layout_suspended: bool,
}

impl TerminalPresenter {
    pub fn new(fade_duration: Duration) -> Self {
        Self::with_theme(fade_duration, ColorTheme::default())
    }

    pub fn with_theme(fade_duration: Duration, theme: ColorTheme) -> Self {
        Self {
            terminal: None,
            theme,
            title: "Deals".to_string(),
            fade_duration,
            rows: Vec::new(),
            container: None,
            next_handle: 0,
            layout_suspended: false,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    fn row_index(&self, handle: RowHandle, operation: &str) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.handle == handle)
            .ok_or_else(|| ListError::adapter(operation, format!("unknown row {}", handle.0)))
    }

    fn container_opacity(&self) -> f32 {
        self.container
            .map_or(1.0, |fade| fade.opacity(self.fade_duration))
    }

    fn render_rows(
        frame: &mut Frame,
        area: Rect,
        rows: &[TerminalRow],
        container_opacity: f32,
        fade_duration: Duration,
        theme: &ColorTheme,
        title: &str,
    ) {
        let lines: Vec<Line> = rows
            .iter()
            .filter_map(|row| {
                let opacity = container_opacity
                    * row.fade.map_or(1.0, |fade| fade.opacity(fade_duration));
                let style = faded(theme.entry_style(), opacity)?;
                Some(markup::to_line(
                    &row.text,
                    style,
                    theme.markup_colors,
                    theme.muted_text,
                ))
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::styled(title.to_string(), theme.title));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_status(frame: &mut Frame, area: Rect, status: &StatusLine, theme: &ColorTheme) {
        let style = theme.status_style(status.busy);
        frame.render_widget(Paragraph::new(status.summary()).style(style), area);
    }
}

/// Style for a row at `opacity`, or None while it should not be drawn
fn faded(style: Style, opacity: f32) -> Option<Style> {
    if opacity < 0.34 {
        None
    } else if opacity < 0.67 {
        Some(style.add_modifier(Modifier::DIM))
    } else {
        Some(style)
    }
}

impl PresentationAdapter for TerminalPresenter {
    type Handle = RowHandle;

    fn create_entry(&mut self, item: &Item) -> Result<RowHandle> {
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        self.rows.push(TerminalRow {
            handle,
            text: item.display_text.clone(),
            fade: None,
        });
        Ok(handle)
    }

    fn update_entry_text(&mut self, handle: &RowHandle, text: &str) -> Result<()> {
        let index = self.row_index(*handle, "update_entry_text")?;
        self.rows[index].text = text.to_string();
        Ok(())
    }

    fn remove_entry(&mut self, handle: RowHandle) -> Result<()> {
        let index = self.row_index(handle, "remove_entry")?;
        self.rows.remove(index);
        Ok(())
    }

    fn play_transition(
        &mut self,
        target: TransitionTarget<'_, RowHandle>,
        transition: Transition,
    ) -> Result<()> {
        match target {
            TransitionTarget::Container => self.container = Some(Fade::new(transition)),
            TransitionTarget::Entry(handle) => {
                let index = self.row_index(*handle, "play_transition")?;
                self.rows[index].fade = Some(Fade::new(transition));
            }
        }
        Ok(())
    }

    fn is_playing(&self, target: TransitionTarget<'_, RowHandle>) -> bool {
        let fade = match target {
            TransitionTarget::Container => self.container,
            TransitionTarget::Entry(handle) => self
                .rows
                .iter()
                .find(|row| row.handle == *handle)
                .and_then(|row| row.fade),
        };
        fade.is_some_and(|fade| fade.is_playing(self.fade_duration))
    }

    fn set_layout_suspended(&mut self, suspended: bool) -> Result<()> {
        self.layout_suspended = suspended;
        Ok(())
    }
}

impl FrameRenderer for TerminalPresenter {
    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn render_frame(&mut self, status: &StatusLine) -> Result<()> {
        if self.layout_suspended {
            return Ok(());
        }

        let container_opacity = self.container_opacity();
        if let Some(ref mut terminal) = self.terminal {
            let rows = &self.rows;
            let theme = &self.theme;
            let title = self.title.as_str();
            let fade_duration = self.fade_duration;

            terminal.draw(move |frame| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(1)].as_ref())
                    .split(frame.size());

                Self::render_rows(
                    frame,
                    chunks[0],
                    rows,
                    container_opacity,
                    fade_duration,
                    theme,
                    title,
                );
                Self::render_status(frame, chunks[1], status, theme);
            })?;
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if self.terminal.is_some() {
            disable_raw_mode()?;
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.terminal = None;
        }
        Ok(())
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
