//! listsync - keyed list reconciliation demo
//!
//! Runs the refresh driver over a simulated deal book, either in the terminal or
//! headless with the final list printed on exit.

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use listsync::app::runtime::spawn_input_thread;
use listsync::presentation::HeadlessPresenter;
use listsync::render::TerminalPresenter;
use listsync::{Application, Settings};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (RUST_LOG controls verbosity)
    env_logger::init();

    let matches = Command::new("listsync")
        .version(listsync::VERSION)
        .about("Keeps an on-screen keyed list in sync with periodic snapshots")
        .long_about(
            "listsync reconciles a list of deal summaries against a simulated market on every \
             tick, patching text in place and rebuilding the list with exit/enter \
             transitions when entries come or go.",
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Run without a terminal UI and print the final list")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("ticks")
                .long("ticks")
                .value_name("N")
                .help("Stop after N ticks once the list has settled")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("N")
                .help("Seed for the market simulation")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("tick-ms")
                .long("tick-ms")
                .value_name("MS")
                .help("Milliseconds between refresh ticks")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("frame-ms")
                .long("frame-ms")
                .value_name("MS")
                .help("Milliseconds between frames")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Settings file (TOML)")
                .value_parser(value_parser!(PathBuf)),
        )
        .get_matches();

    let settings = resolve_settings(&matches)?;
    let tick_limit = matches.get_one::<u64>("ticks").copied();

    if matches.get_flag("headless") {
        let presenter = HeadlessPresenter::new(transition_frames(&settings));
        // Keep the sender alive so the command channel stays open
        let (_tx, rx) = unbounded_channel();
        let summary = Application::new(presenter, settings)
            .with_tick_limit(tick_limit)
            .run(rx)
            .await?;

        println!("{} ticks, {} frames", summary.ticks, summary.frames);
        println!("{:?}", summary.stats);
        for (id, text) in &summary.rows {
            println!("{:>12}  {}", id, listsync::render::markup::plain(text));
        }
        return Ok(());
    }

    let presenter = TerminalPresenter::new(settings.fade_duration());
    let (tx, rx) = unbounded_channel();
    let shutdown = Arc::new(AtomicBool::new(false));
    let input = spawn_input_thread(tx, Arc::clone(&shutdown), Duration::from_millis(50));

    let result = Application::new(presenter, settings)
        .with_tick_limit(tick_limit)
        .run(rx)
        .await;

    shutdown.store(true, Ordering::SeqCst);
    if input.join().is_err() {
        log::warn!("Input thread panicked");
    }
    result?;
    Ok(())
}

/// File settings (when built with `config`) overridden by command-line flags
fn resolve_settings(matches: &ArgMatches) -> Result<Settings> {
    let config_path = matches.get_one::<PathBuf>("config");
    let mut settings = load_settings(config_path)?;

    if let Some(seed) = matches.get_one::<u64>("seed") {
        settings.seed = *seed;
    }
    if let Some(ms) = matches.get_one::<u64>("tick-ms") {
        settings.tick_interval_ms = *ms;
    }
    if let Some(ms) = matches.get_one::<u64>("frame-ms") {
        settings.frame_interval_ms = *ms;
    }
    settings.validate()?;
    Ok(settings)
}

#[cfg(feature = "config")]
fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    Ok(Settings::load(path.map(PathBuf::as_path))?)
}

#[cfg(not(feature = "config"))]
fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    if let Some(path) = path {
        anyhow::bail!(
            "Cannot read {}: built without the `config` feature",
            path.display()
        );
    }
    Ok(Settings::default())
}

/// Headless transitions last as many frames as a terminal fade takes
fn transition_frames(settings: &Settings) -> u32 {
    let frames = settings.fade_ms.div_ceil(settings.frame_interval_ms.max(1));
    u32::try_from(frames).unwrap_or(u32::MAX)
}
