//! Rendering subsystem.
//!
//! Presenters that the host draws once per frame implement [`FrameRenderer`] next to
//! [`PresentationAdapter`](crate::presentation::PresentationAdapter). The terminal
//! presenter draws with ratatui; the headless presenter uses its frame hook to advance
//! its transition clock and log row changes.

pub mod markup;
pub mod terminal;
pub mod theme;

pub use terminal::{RowHandle, TerminalPresenter};
pub use theme::ColorTheme;

use crate::driver::DriverStats;
use crate::error::Result;
use crate::presentation::HeadlessPresenter;
use crate::sequencer::SequencerPhase;
use log::info;

/// Host state shown under the list
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub frame: u64,
    pub busy: bool,
    pub phase: SequencerPhase,
    pub pending_swaps: usize,
    pub stats: DriverStats,
    pub message: Option<String>,
}

impl StatusLine {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "ticks {} | patches {} | rebuilds {}/{} | skipped {} | failures {}",
            self.stats.ticks,
            self.stats.patches,
            self.stats.rebuilds_completed,
            self.stats.rebuilds_started,
            self.stats.skipped,
            self.stats.failures,
        );
        if self.busy {
            text.push_str(&format!(" | {:?}", self.phase));
        }
        if self.pending_swaps > 0 {
            text.push_str(&format!(" | swaps {}", self.pending_swaps));
        }
        if let Some(message) = &self.message {
            text.push_str(" | ");
            text.push_str(message);
        }
        text
    }
}

/// Lifecycle and per-frame drawing of a presenter
pub trait FrameRenderer {
    /// Set up the output (raw mode, alternate screen, ...)
    fn initialize(&mut self) -> Result<()>;

    /// Draw the current state. Called once per host frame after the driver ran.
    fn render_frame(&mut self, status: &StatusLine) -> Result<()>;

    /// Restore the output
    fn cleanup(&mut self) -> Result<()>;
}

impl FrameRenderer for HeadlessPresenter {
    fn initialize(&mut self) -> Result<()> {
        info!("Headless presenter ready");
        Ok(())
    }

    fn render_frame(&mut self, status: &StatusLine) -> Result<()> {
        self.advance_frame();
        if let Some(rows) = self.take_changed_rows() {
            info!("frame {}: [{}] ({})", status.frame, rows, status.summary());
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::presentation::PresentationAdapter;

    #[test]
    fn summary_mentions_phase_only_while_busy() {
        let mut status = StatusLine {
            phase: SequencerPhase::ExitPlaying,
            ..StatusLine::default()
        };
        assert!(!status.summary().contains("ExitPlaying"));
        status.busy = true;
        assert!(status.summary().contains("ExitPlaying"));

        status.message = Some("paused".to_string());
        assert!(status.summary().ends_with("| paused"));
    }

    #[test]
    fn headless_render_advances_frames() {
        let mut presenter = HeadlessPresenter::new(1);
        presenter.initialize().unwrap();
        presenter.create_entry(&Item::new("A", "a")).unwrap();

        let status = StatusLine::default();
        presenter.render_frame(&status).unwrap();
        presenter.render_frame(&status).unwrap();
        assert_eq!(presenter.frame(), 2);
        presenter.cleanup().unwrap();
    }
}
