#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a scripted Terminal Abyss run.

mod config;
mod script;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use terminal_abyss_core::Phase;
use terminal_abyss_rendering::{compose_frame, RenderingBackend, TextBackend, Viewport};
use terminal_abyss_system_bootstrap::Bootstrap;
use terminal_abyss_world::Session;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by the Terminal Abyss binary.
#[derive(Debug, Parser)]
#[command(name = "terminal-abyss", version, about = "Headless driver for the Terminal Abyss")]
struct CliArgs {
    /// Run seed; a random one is picked when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with game and viewport settings.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Width of the first-person view in glyphs.
    #[arg(long)]
    columns: Option<usize>,

    /// Height of the first-person view in glyphs.
    #[arg(long)]
    rows: Option<usize>,

    /// Keystrokes to replay, one frame per token (w s a d < > e .).
    #[arg(long, default_value = "")]
    script: String,

    /// Print every frame instead of only the last one.
    #[arg(long)]
    every_frame: bool,
}

/// Entry point for the Terminal Abyss command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();
    run(&args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &CliArgs) -> Result<()> {
    let mut settings = config::load(args.config.as_deref())?;
    if let Some(columns) = args.columns {
        settings.columns = columns;
    }
    if let Some(rows) = args.rows {
        settings.rows = rows;
    }
    let viewport = Viewport::new(settings.columns, settings.rows).context("invalid viewport")?;
    let frames = script::parse(&args.script).context("invalid --script")?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let final_floor = settings.game.progression.final_floor;

    let mut session = Session::new(seed, settings.game).context("failed to start a new game")?;
    info!(seed, frames = frames.len(), "starting scripted run");

    let mut out = io::stdout().lock();
    writeln!(out, "{}", Bootstrap.welcome_banner()).context("failed to write banner")?;
    let mut backend = TextBackend::new(out);

    for mut intents in frames {
        let report = session.advance(&mut intents);
        for event in &report.events {
            debug!(frame = report.frame, ?event, "event");
        }
        if args.every_frame {
            backend.present(&compose_frame(session.snapshot(), viewport, final_floor))?;
        }
        if report.phase != Phase::Playing {
            info!(frame = report.frame, phase = ?report.phase, "run finished");
            break;
        }
    }

    if !args.every_frame || session.frame() == 0 {
        backend.present(&compose_frame(session.snapshot(), viewport, final_floor))?;
    }

    let mut out = backend.into_inner();
    writeln!(out, "phase: {:?}", session.snapshot().phase()).context("failed to write phase")?;
    Ok(())
}
