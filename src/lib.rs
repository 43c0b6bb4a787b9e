//! # SLP Parser
//!
//! A Slippi replay (.slp) parser and statistics library.
//!
//! Replays are a UBJSON container wrapping a self-describing binary event
//! stream: a message-size table, game settings, per-frame pre/post updates
//! and items, frame bookends, and a game-end record, followed by a trailing
//! UBJSON metadata block. Files written under rollback netcode can rewrite
//! recent frames; this library reconciles those rewrites into a finalized,
//! gap-free frame sequence and derives match statistics from it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use slp_parser::SlippiGame;
//!
//! fn main() -> slp_parser::Result<()> {
//!     let mut game = SlippiGame::from_file("game.slp")?;
//!
//!     if let Some(settings) = game.settings() {
//!         for player in &settings.players {
//!             println!("port {}: character {:?}", player.port, player.character_id);
//!         }
//!     }
//!
//!     if let Some(stats) = game.stats() {
//!         for overall in &stats.overall {
//!             println!(
//!                 "player {}: {} kills, {:.1}% dealt",
//!                 overall.player_index, overall.kill_count, overall.total_damage
//!             );
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every getter is lazy and pull-based: the decode chain runs on demand and
//! resumes where it last stopped, so the same API serves finished files and
//! files still being written by the game.
//!
//! ## Module Overview
//!
//! - [`error`] - Error type and result alias
//! - [`binary`] - Bounds-checked big-endian field readers
//! - [`text`] - Shift-JIS decoding and fullwidth normalization
//! - [`source`] - Byte-source abstraction over files and buffers
//! - [`header`] - Container layout and message-size table decoding
//! - [`events`] - Commands, typed event records, per-command decoding
//! - [`stream`] - Resumable iteration over the raw event region
//! - [`frames`] - Per-frame game state model
//! - [`parser`] - Frame assembly and rollback reconciliation
//! - [`metadata`] - Trailing UBJSON metadata decoding
//! - [`stats`] - Incremental statistics pipeline
//! - [`game`] - The [`SlippiGame`] facade
//!
//! All multi-byte integers in the event stream are big-endian. Malformed
//! replay data never errors; it degrades to absent fields and partial
//! results, because in-progress and severed recordings are normal inputs.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod binary;
pub mod error;
pub mod events;
pub mod frames;
pub mod game;
pub mod header;
pub mod metadata;
pub mod parser;
pub mod source;
pub mod stats;
pub mod stream;
pub mod text;

// Re-export commonly used types at the crate root
pub use error::{Result, SlpError};
pub use events::{
    Command, ControllerFix, Event, FrameBookend, GameEnd, GameStart, ItemUpdate, PlayerSettings,
    PostFrameUpdate, PreFrameUpdate,
};
pub use frames::{FrameEntry, PlayerFrameData, FIRST_FRAME, FIRST_PLAYABLE_FRAME};
pub use game::{GameStats, SlippiGame};
pub use header::FileInfo;
pub use parser::{ParserState, SlpParser};
pub use source::ByteSource;
pub use stats::{
    ActionCounts, Combo, Conversion, OpeningType, OverallStats, PlayerInput, Ratio, Stats,
    StatComputer, Stock,
};
