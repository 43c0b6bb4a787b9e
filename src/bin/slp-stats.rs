//! Slippi replay (.slp) statistics CLI
//!
//! Decodes a replay and prints the requested sections as pretty JSON.
//! The default output covers settings and the game-end record; `--stats`,
//! `--metadata`, and `--frames` add their sections.

use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use slp_parser::{FrameEntry, GameEnd, GameStart, GameStats, SlippiGame};

/// Slippi replay (.slp) statistics reporter
#[derive(Parser)]
#[command(name = "slp-stats")]
#[command(about = "Slippi replay (.slp) statistics reporter", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the replay file
    file: PathBuf,

    /// Include computed match statistics
    #[arg(long)]
    stats: bool,

    /// Include the trailing metadata block
    #[arg(long)]
    metadata: bool,

    /// Include every finalized frame (large)
    #[arg(long)]
    frames: bool,
}

#[derive(Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<GameStart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    game_end: Option<GameEnd>,
    last_frame: Option<i32>,
    finalized_frame_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<GameStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frames: Option<BTreeMap<i32, FrameEntry>>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut game = match SlippiGame::from_file(&cli.file) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("error: cannot open {}: {err}", cli.file.display());
            return ExitCode::FAILURE;
        }
    };

    let report = Report {
        settings: game.settings(),
        game_end: game.game_end(),
        last_frame: game.latest_frame().map(|f| f.frame),
        finalized_frame_count: game.frames().len(),
        stats: if cli.stats { game.stats() } else { None },
        metadata: if cli.metadata {
            game.metadata().cloned()
        } else {
            None
        },
        frames: if cli.frames {
            Some(game.frames().clone())
        } else {
            None
        },
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: failed to serialize report: {err}");
            ExitCode::FAILURE
        }
    }
}
