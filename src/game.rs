//! Replay facade.
//!
//! [`SlippiGame`] ties the whole decode chain together: byte source, header
//! scan, event iteration, frame assembly, and statistics. Every getter is
//! lazy and pull-based; each call re-scans the source from the last resume
//! position, which makes the same API work for finished files and for files
//! still being written by the game.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::events::{GameEnd, GameStart};
use crate::frames::FrameEntry;
use crate::header::FileInfo;
use crate::metadata::read_metadata;
use crate::parser::{ParserState, SlpParser};
use crate::source::ByteSource;
use crate::stats::{
    ActionCounts, Combo, Conversion, OverallStats, PlayerInput, Stats, Stock,
};
use crate::stream::iterate_events;

/// The full statistics report for a game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    /// Whether a `GameEnd` event was seen.
    pub game_complete: bool,
    /// The most recently written frame number.
    pub last_frame: Option<i32>,
    /// Finalized frames on which players had control.
    pub playable_frame_count: i32,
    /// Stock records per player.
    pub stocks: Vec<Stock>,
    /// Combos detected.
    pub combos: Vec<Combo>,
    /// Conversions detected.
    pub conversions: Vec<Conversion>,
    /// Action counts per player.
    pub action_counts: Vec<ActionCounts>,
    /// Input counts per player.
    pub inputs: Vec<PlayerInput>,
    /// Aggregate metrics per player.
    pub overall: Vec<OverallStats>,
    /// The settings the game started with.
    pub settings: GameStart,
}

/// A lazily decoded replay.
///
/// ```no_run
/// use slp_parser::SlippiGame;
///
/// # fn main() -> slp_parser::Result<()> {
/// let mut game = SlippiGame::from_file("game.slp")?;
/// if let Some(settings) = game.settings() {
///     println!("{} players", settings.players.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SlippiGame {
    source: ByteSource,
    parser: SlpParser,
    stats: Stats,
    read_position: Option<usize>,
    metadata: Option<Value>,
    metadata_checked: bool,
    final_stats: Option<GameStats>,
}

impl SlippiGame {
    /// Opens a replay file.
    ///
    /// # Errors
    ///
    /// Returns `SlpError::Io` if the file cannot be opened. Malformed file
    /// *contents* never error; they surface as absent getters.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::with_source(ByteSource::file(path)?))
    }

    /// Wraps an in-memory replay buffer.
    #[must_use]
    pub fn from_buffer(data: Vec<u8>) -> Self {
        Self::with_source(ByteSource::buffer(data))
    }

    fn with_source(source: ByteSource) -> Self {
        SlippiGame {
            source,
            parser: SlpParser::new(),
            stats: Stats::new(),
            read_position: None,
            metadata: None,
            metadata_checked: false,
            final_stats: None,
        }
    }

    /// Decodes any bytes that appeared since the last call and routes them
    /// through the assembler and the stats pipeline.
    fn process(&mut self, settings_only: bool) {
        if self.parser.state() == ParserState::Complete {
            return;
        }
        let bytes = self.source.read_all();
        let info = FileInfo::scan(&bytes);

        let parser = &mut self.parser;
        let position = iterate_events(&bytes, &info, self.read_position, |_, event| {
            if settings_only && parser.settings().is_some() {
                // Stop before consuming; a later full pass resumes here
                return true;
            }
            if let Some(event) = event {
                parser.handle_event(event);
            }
            false
        });
        self.read_position = Some(position);

        if self.parser.take_settings_ready() {
            if let Some(settings) = self.parser.settings() {
                self.stats.setup(settings);
            }
        }
        for frame in self.parser.drain_finalized() {
            self.stats.add_frame(frame);
        }
        self.stats.process();
    }

    /// Returns the game settings, or `None` until `GameStart` is decodable.
    pub fn settings(&mut self) -> Option<GameStart> {
        self.process(true);
        self.parser.settings().cloned()
    }

    /// Returns the most recently written frame (possibly speculative).
    pub fn latest_frame(&mut self) -> Option<FrameEntry> {
        self.process(false);
        self.parser.latest_frame().cloned()
    }

    /// Returns the finalized frames, keyed by frame number.
    pub fn frames(&mut self) -> &BTreeMap<i32, FrameEntry> {
        self.process(false);
        self.parser.finalized_frames()
    }

    /// Returns superseded snapshots retained from rollback rewrites.
    pub fn rollback_frames(&mut self) -> &BTreeMap<i32, Vec<FrameEntry>> {
        self.process(false);
        self.parser.rollback_frames()
    }

    /// Returns the game-end record, or `None` while in progress.
    pub fn game_end(&mut self) -> Option<GameEnd> {
        self.process(false);
        self.parser.game_end().copied()
    }

    /// Returns the statistics report, or `None` before settings exist.
    ///
    /// Once the game has ended the report is cached and every later call
    /// returns the identical value.
    pub fn stats(&mut self) -> Option<GameStats> {
        if let Some(cached) = &self.final_stats {
            return Some(cached.clone());
        }
        self.process(false);
        let settings = self.parser.settings()?.clone();

        let playable_frame_count = self.parser.playable_frame_count();
        let report = GameStats {
            game_complete: self.parser.game_end().is_some(),
            last_frame: self.parser.latest_frame_number(),
            playable_frame_count,
            stocks: self.stats.stocks().to_vec(),
            combos: self.stats.combos().to_vec(),
            conversions: self.stats.conversions().to_vec(),
            action_counts: self.stats.action_counts().into_iter().cloned().collect(),
            inputs: self.stats.inputs().to_vec(),
            overall: self.stats.overall(playable_frame_count),
            settings,
        };
        if report.game_complete {
            self.final_stats = Some(report.clone());
        }
        Some(report)
    }

    /// Returns the trailing metadata block, decoded once and cached.
    pub fn metadata(&mut self) -> Option<&Value> {
        if !self.metadata_checked {
            let bytes = self.source.read_all();
            let info = FileInfo::scan(&bytes);
            self.metadata = read_metadata(&bytes, &info);
            // A severed file stays severed; no point re-decoding
            self.metadata_checked = self.metadata.is_some() || self.game_end().is_some();
        }
        self.metadata.as_ref()
    }

    /// Returns the file path backing this game, if file-based.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.source.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::command;

    pub(crate) fn game_start_message(player_types: [u8; 4]) -> Vec<u8> {
        let mut msg = vec![0u8; 0x141];
        msg[0] = command::GAME_START;
        msg[1] = 3;
        msg[2] = 16;
        msg[3] = 0;
        msg[0x14] = 31; // stage
        for (i, &player_type) in player_types.iter().enumerate() {
            msg[0x65 + i * 0x24] = 2; // character
            msg[0x66 + i * 0x24] = player_type;
            msg[0x67 + i * 0x24] = 4; // stocks
        }
        msg
    }

    pub(crate) fn post_frame_message(
        frame: i32,
        player: u8,
        action_state: u16,
        percent: f32,
        stocks: u8,
    ) -> Vec<u8> {
        let mut msg = vec![0u8; 0x47];
        msg[0] = command::POST_FRAME_UPDATE;
        msg[1..5].copy_from_slice(&frame.to_be_bytes());
        msg[5] = player;
        msg[8..10].copy_from_slice(&action_state.to_be_bytes());
        msg[0x16..0x1A].copy_from_slice(&percent.to_be_bytes());
        msg[0x21] = stocks;
        msg
    }

    pub(crate) fn bookend_message(frame: i32, finalized: i32) -> Vec<u8> {
        let mut msg = vec![command::FRAME_BOOKEND];
        msg.extend_from_slice(&frame.to_be_bytes());
        msg.extend_from_slice(&finalized.to_be_bytes());
        msg
    }

    pub(crate) fn game_end_message(method: u8) -> Vec<u8> {
        vec![command::GAME_END, method, 0xFF]
    }

    /// Builds a wrapped replay around the given messages with a matching
    /// size table.
    pub(crate) fn replay(messages: &[Vec<u8>]) -> Vec<u8> {
        let entries: &[(u8, u16)] = &[
            (command::GAME_START, 0x140),
            (command::POST_FRAME_UPDATE, 0x46),
            (command::FRAME_BOOKEND, 0x8),
            (command::GAME_END, 0x2),
        ];
        let mut raw = vec![command::MESSAGE_SIZES, (entries.len() * 3 + 1) as u8];
        for &(cmd, size) in entries {
            raw.push(cmd);
            raw.extend_from_slice(&size.to_be_bytes());
        }
        for msg in messages {
            raw.extend_from_slice(msg);
        }

        let mut bytes = Vec::new();
        bytes.push(crate::header::CONTAINER_MARKER);
        bytes.extend_from_slice(b"U\x03raw[$U#l");
        bytes.extend_from_slice(&(raw.len() as i32).to_be_bytes());
        bytes.extend_from_slice(&raw);
        bytes
    }

    fn full_game() -> Vec<u8> {
        let mut messages = vec![game_start_message([0, 0, 3, 3])];
        for frame in 0..10 {
            messages.push(post_frame_message(frame, 0, 0x0E, 0.0, 4));
            messages.push(post_frame_message(frame, 1, 0x0E, 0.0, 4));
            messages.push(bookend_message(frame, frame));
        }
        messages.push(game_end_message(2));
        replay(&messages)
    }

    #[test]
    fn test_settings_filtered_to_active_players() {
        let mut game = SlippiGame::from_buffer(full_game());
        let settings = game.settings().unwrap();
        assert_eq!(settings.players.len(), 2);
        assert_eq!(settings.slp_version.as_deref(), Some("3.16.0"));
        assert_eq!(settings.stage_id, Some(31));
    }

    #[test]
    fn test_finalized_frames_contiguous() {
        let mut game = SlippiGame::from_buffer(full_game());
        let keys: Vec<i32> = game.frames().keys().copied().collect();
        assert_eq!(keys, (0..10).collect::<Vec<i32>>());
        assert!(game.rollback_frames().is_empty());
    }

    #[test]
    fn test_game_end_and_cached_stats() {
        let mut game = SlippiGame::from_buffer(full_game());
        assert_eq!(game.game_end().unwrap().game_end_method, Some(2));

        let first = game.stats().unwrap();
        assert!(first.game_complete);
        assert_eq!(first.last_frame, Some(9));
        assert_eq!(first.stocks.len(), 2);

        let second = game.stats().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stats_none_before_settings() {
        let mut game = SlippiGame::from_buffer(replay(&[]));
        assert!(game.stats().is_none());
        assert!(game.settings().is_none());
    }

    #[test]
    fn test_empty_buffer_degrades() {
        let mut game = SlippiGame::from_buffer(Vec::new());
        assert!(game.settings().is_none());
        assert!(game.frames().is_empty());
        assert!(game.game_end().is_none());
        assert!(game.metadata().is_none());
        assert!(game.file_path().is_none());
    }

    #[test]
    fn test_truncated_final_message_tolerated() {
        let mut bytes = full_game();
        // Sever the file mid-message
        bytes.truncate(bytes.len() - 1);
        let mut game = SlippiGame::from_buffer(bytes);
        // The game end was the severed message; everything else decoded
        assert!(game.game_end().is_none());
        assert_eq!(game.frames().len(), 10);
    }
}
