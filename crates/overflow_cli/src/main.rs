//! Smart Overflow CLI
//!
//! Replay a scripted gesture against a headless viewport and print the
//! resulting scroll model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use overflow_scroll::OverflowConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod replay;

use replay::{Gesture, Platform, ReplayOptions};

#[derive(Parser)]
#[command(name = "smart-overflow")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Replay scroll gestures against a headless Smart Overflow viewport", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Visible height of the viewport
    #[arg(long, default_value = "200", global = true)]
    viewport: f32,

    /// Total height of the content
    #[arg(long, default_value = "1000", global = true)]
    content: f32,

    /// Simulated input platform
    #[arg(short, long, value_enum, default_value = "mouse", global = true)]
    platform: Platform,

    /// Print the report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    gesture: Gesture,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = match &cli.config {
        Some(path) => OverflowConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => OverflowConfig::default(),
    };

    let options = ReplayOptions {
        viewport: cli.viewport,
        content: cli.content,
        platform: cli.platform,
    };
    let report = replay::run(&options, config, cli.gesture)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
