//! Application orchestration layer
//!
//! Owns one [`RefreshDriver`] over a [`DealBook`] and runs the host loop: a tick
//! interval that steps the market and reconciles, a frame interval that resumes the
//! driver and renders, user commands and Ctrl-C.

pub mod messages;
pub mod runtime;

pub use messages::HostCommand;

use crate::config::Settings;
use crate::deals::{DealBook, MarketSimulator};
use crate::driver::{DriverStats, FrameOutcome, RefreshDriver, TickOutcome};
use crate::error::Result;
use crate::presentation::PresentationAdapter;
use crate::render::{FrameRenderer, StatusLine};
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, MissedTickBehavior};

/// What a finished run looked like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub frames: u64,
    pub stats: DriverStats,
    /// `(id, text)` rows shown when the loop stopped
    pub rows: Vec<(String, String)>,
}

/// Host loop around one refresh driver
pub struct Application<P: PresentationAdapter + FrameRenderer> {
    driver: RefreshDriver<DealBook, P>,
    market: MarketSimulator,
    settings: Settings,
    tick_limit: Option<u64>,
    ticks: u64,
    frames: u64,
    message: Option<String>,
}

impl<P: PresentationAdapter + FrameRenderer> Application<P> {
    /// Wire a fresh deal book and market to `presenter`
    pub fn new(presenter: P, settings: Settings) -> Self {
        let mut market = MarketSimulator::new(settings.seed, settings.churn);
        let book = market.opening_book();
        let driver = RefreshDriver::new(book, presenter)
            .with_policy(settings.timeout_policy())
            .with_swap_style(settings.swap_style);

        Self {
            driver,
            market,
            settings,
            tick_limit: None,
            ticks: 0,
            frames: 0,
            message: None,
        }
    }

    /// Stop after `limit` ticks, once the driver has settled
    pub fn with_tick_limit(mut self, limit: Option<u64>) -> Self {
        self.tick_limit = limit;
        self
    }

    pub fn driver(&self) -> &RefreshDriver<DealBook, P> {
        &self.driver
    }

    /// Run until quit, Ctrl-C or the tick limit. The list is disposed on every exit path.
    pub async fn run(mut self, mut commands: UnboundedReceiver<HostCommand>) -> Result<RunSummary> {
        self.driver.presenter_mut().initialize()?;
        self.populate();
        let outcome = self.event_loop(&mut commands).await;

        let summary = RunSummary {
            ticks: self.ticks,
            frames: self.frames,
            stats: *self.driver.stats(),
            rows: self
                .driver
                .store()
                .texts()
                .into_iter()
                .map(|(id, text)| (id.to_string(), text.to_string()))
                .collect(),
        };

        let disposed = self.driver.dispose();
        let cleaned = match disposed {
            Ok(mut presenter) => presenter.cleanup(),
            Err(err) => {
                warn!("Failed to dispose list: {}", err);
                Err(err)
            }
        };

        outcome?;
        cleaned?;
        Ok(summary)
    }

    async fn event_loop(&mut self, commands: &mut UnboundedReceiver<HostCommand>) -> Result<()> {
        let mut ticks = interval(self.settings.tick_interval());
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut frames = interval(self.settings.frame_interval());
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut input_open = true;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    if !self.tick_limit_reached() {
                        self.tick();
                    }
                }
                _ = frames.tick() => {
                    self.frame()?;
                    if self.tick_limit_reached() && self.driver.is_settled() {
                        info!("Stopping after {} ticks", self.ticks);
                        return Ok(());
                    }
                }
                command = commands.recv(), if input_open => match command {
                    Some(HostCommand::Quit) => {
                        info!("Quit requested");
                        return Ok(());
                    }
                    Some(HostCommand::Refresh) => {
                        self.tick();
                    }
                    None => input_open = false,
                },
                _ = &mut ctrl_c => {
                    info!("Interrupted");
                    return Ok(());
                }
            }
        }
    }

    fn tick_limit_reached(&self) -> bool {
        self.tick_limit.is_some_and(|limit| self.ticks >= limit)
    }

    /// Show the opening book before the first tick. Failures leave the list
    /// uninitialized and the next tick retries.
    fn populate(&mut self) {
        match self.driver.initialize() {
            Ok(entries) => info!("Opening book shows {} entries", entries),
            Err(err) if err.is_missing_dependency() => {
                info!("Deferring initialization: {}", err);
                self.message = Some("waiting for presenter".to_string());
            }
            Err(err) => {
                warn!("Initialization failed, retrying on next tick: {}", err);
                self.message = Some("initialization failed".to_string());
            }
        }
    }

    fn tick(&mut self) {
        if self.driver.is_initialized() {
            self.market.step(self.driver.source_mut());
        }
        self.ticks += 1;

        let outcome = self.driver.on_tick();
        debug!("tick {}: {:?}", self.ticks, outcome);
        self.message = match outcome {
            TickOutcome::Deferred => Some("waiting for presenter".to_string()),
            TickOutcome::Failed => Some("last cycle failed".to_string()),
            _ => None,
        };
    }

    fn frame(&mut self) -> Result<()> {
        self.frames += 1;
        match self.driver.on_frame() {
            FrameOutcome::Completed(report) => {
                debug!("frame {}: rebuild completed {:?}", self.frames, report)
            }
            FrameOutcome::Aborted => self.message = Some("rebuild aborted".to_string()),
            FrameOutcome::Idle | FrameOutcome::InProgress(_) => {}
        }

        let status = StatusLine {
            frame: self.frames,
            busy: self.driver.is_busy(),
            phase: self.driver.phase(),
            pending_swaps: self.driver.pending_swaps(),
            stats: *self.driver.stats(),
            message: self.message.clone(),
        };
        self.driver.presenter_mut().render_frame(&status)
    }
}
