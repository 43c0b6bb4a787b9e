//! Frame-assembly state machine.
//!
//! [`SlpParser`] consumes decoded events and assembles them into per-frame
//! game state, reconciling the speculative writes produced by rollback
//! netcode into a monotonically growing finalized sequence.
//!
//! # Latest vs. finalized
//!
//! Rollback netcode re-simulates recent frames when remote inputs arrive
//! late, so the event stream can write the same frame number several times.
//! The parser therefore keeps two views:
//!
//! - the **latest** view, overwritten in place by every write, and
//! - the **finalized** map, populated only once a `FrameBookend` confirms a
//!   frame will never be rewritten. Finalized entries are cloned out of the
//!   latest view and never touched again.
//!
//! Superseded snapshots are retained in a third, diagnostic map of rollback
//! frames: one frame number may carry several snapshots.
//!
//! # Notifications
//!
//! Instead of an event emitter, the parser records what happened and lets
//! the caller drain it: [`SlpParser::take_settings_ready`] flips once after
//! settings arrive, and [`SlpParser::drain_finalized`] yields newly
//! finalized frames in ascending order, each exactly once.
//!
//! # Failure policy
//!
//! Malformed or out-of-order events are dropped silently. Queries answer
//! with "not present yet" (`None` / empty maps), never an error.

use std::collections::BTreeMap;

use tracing::debug;

use crate::events::{
    Event, FrameBookend, GameEnd, GameStart, ItemUpdate, PostFrameUpdate, PreFrameUpdate,
};
use crate::frames::{FrameEntry, FIRST_PLAYABLE_FRAME};

/// Lifecycle of a parsed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No `GameStart` seen yet.
    AwaitingSettings,
    /// Settings known; frames are accumulating.
    InProgress,
    /// `GameEnd` seen; all state is terminal.
    Complete,
}

/// Assembles decoded events into frames and tracks game lifecycle.
#[derive(Debug)]
pub struct SlpParser {
    state: ParserState,
    settings: Option<GameStart>,
    game_end: Option<GameEnd>,
    latest_frame_index: Option<i32>,
    frames: BTreeMap<i32, FrameEntry>,
    finalized: BTreeMap<i32, FrameEntry>,
    rollback_frames: BTreeMap<i32, Vec<FrameEntry>>,
    last_finalized_frame: Option<i32>,
    current_rollback_frame: Option<i32>,
    settings_ready: bool,
    newly_finalized: Vec<i32>,
}

impl Default for SlpParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SlpParser {
    /// Creates a parser in the `AwaitingSettings` state.
    #[must_use]
    pub fn new() -> Self {
        SlpParser {
            state: ParserState::AwaitingSettings,
            settings: None,
            game_end: None,
            latest_frame_index: None,
            frames: BTreeMap::new(),
            finalized: BTreeMap::new(),
            rollback_frames: BTreeMap::new(),
            last_finalized_frame: None,
            current_rollback_frame: None,
            settings_ready: false,
            newly_finalized: Vec::new(),
        }
    }

    /// Feeds one decoded event into the state machine.
    ///
    /// Once the game is complete this is an idempotent no-op.
    pub fn handle_event(&mut self, event: &Event) {
        if self.state == ParserState::Complete {
            return;
        }
        match event {
            Event::GameStart(start) => self.handle_game_start(start),
            Event::PreFrameUpdate(pre) => self.handle_pre_frame(pre),
            Event::PostFrameUpdate(post) => self.handle_post_frame(post),
            Event::ItemUpdate(item) => self.handle_item(item),
            Event::FrameBookend(bookend) => self.handle_bookend(bookend),
            Event::GameEnd(end) => self.handle_game_end(end),
        }
    }

    fn handle_game_start(&mut self, start: &GameStart) {
        if self.state != ParserState::AwaitingSettings {
            return;
        }
        let mut settings = start.clone();
        // Drop empty slots; stats and consumers only care about occupied ones
        settings.players.retain(|p| p.player_type != Some(3));
        debug!(
            version = settings.slp_version.as_deref().unwrap_or("unknown"),
            players = settings.players.len(),
            "game settings decoded"
        );
        self.settings = Some(settings);
        self.settings_ready = true;
        self.state = ParserState::InProgress;
    }

    fn handle_pre_frame(&mut self, pre: &PreFrameUpdate) {
        let (Some(frame), Some(player_index)) = (pre.frame, pre.player_index) else {
            return;
        };
        let index = usize::from(player_index);
        if index >= 4 {
            return;
        }
        self.note_frame_write(frame);

        let is_follower = pre.is_follower.unwrap_or(false);
        if !is_follower && self.slot_has_pre(frame, index) {
            self.record_rollback(frame);
        }

        let entry = self
            .frames
            .entry(frame)
            .or_insert_with(|| FrameEntry::new(frame));
        let slot = if is_follower {
            entry.followers[index].get_or_insert_with(Default::default)
        } else {
            entry.players[index].get_or_insert_with(Default::default)
        };
        slot.pre = Some(pre.clone());
    }

    fn handle_post_frame(&mut self, post: &PostFrameUpdate) {
        let (Some(frame), Some(player_index)) = (post.frame, post.player_index) else {
            return;
        };
        let index = usize::from(player_index);
        if index >= 4 {
            return;
        }
        self.note_frame_write(frame);

        let is_follower = post.is_follower.unwrap_or(false);
        if !is_follower && self.slot_has_post(frame, index) {
            self.record_rollback(frame);
        }

        let entry = self
            .frames
            .entry(frame)
            .or_insert_with(|| FrameEntry::new(frame));
        let slot = if is_follower {
            entry.followers[index].get_or_insert_with(Default::default)
        } else {
            entry.players[index].get_or_insert_with(Default::default)
        };
        slot.post = Some(post.clone());
    }

    fn handle_item(&mut self, item: &ItemUpdate) {
        let Some(frame) = item.frame else {
            return;
        };
        self.note_frame_write(frame);
        let entry = self
            .frames
            .entry(frame)
            .or_insert_with(|| FrameEntry::new(frame));
        entry.items.push(item.clone());
    }

    fn handle_bookend(&mut self, bookend: &FrameBookend) {
        let Some(frame) = bookend.frame else {
            return;
        };
        // Old protocol versions predate the finalized counter; without
        // rollback there, the bookend's own frame is final.
        let latest_finalized = bookend.latest_finalized_frame.unwrap_or(frame);
        self.finalize_through(latest_finalized);
    }

    fn handle_game_end(&mut self, end: &GameEnd) {
        // Whatever is still outstanding can no longer roll back
        if let Some(latest) = self.latest_frame_index {
            self.finalize_through(latest);
        }
        debug!(method = ?end.game_end_method, "game end");
        self.game_end = Some(*end);
        self.state = ParserState::Complete;
    }

    /// Copies every not-yet-finalized frame up to `upto` out of the latest
    /// view, in ascending order.
    fn finalize_through(&mut self, upto: i32) {
        // A corrupt counter must not make us loop to i32::MAX
        let Some(latest_seen) = self.latest_frame_index else {
            return;
        };
        let upto = std::cmp::min(upto, latest_seen);

        let start = match self.last_finalized_frame {
            Some(last) => last + 1,
            None => match self.frames.keys().next() {
                Some(&first) => first,
                None => return,
            },
        };
        if upto < start {
            return;
        }

        for frame in start..=upto {
            if let Some(entry) = self.frames.get(&frame) {
                self.finalized.insert(frame, entry.clone());
                self.newly_finalized.push(frame);
            }
        }
        self.last_finalized_frame = Some(upto);
    }

    fn note_frame_write(&mut self, frame: i32) {
        self.latest_frame_index = Some(frame);
        if self.current_rollback_frame.is_some_and(|f| f != frame) {
            self.current_rollback_frame = None;
        }
    }

    fn slot_has_pre(&self, frame: i32, index: usize) -> bool {
        self.frames
            .get(&frame)
            .and_then(|e| e.players[index].as_ref())
            .is_some_and(|p| p.pre.is_some())
    }

    fn slot_has_post(&self, frame: i32, index: usize) -> bool {
        self.frames
            .get(&frame)
            .and_then(|e| e.players[index].as_ref())
            .is_some_and(|p| p.post.is_some())
    }

    /// Snapshots the frame's current latest view before a rollback rewrite,
    /// at most once per contiguous resend of that frame.
    fn record_rollback(&mut self, frame: i32) {
        if self.current_rollback_frame == Some(frame) {
            return;
        }
        self.current_rollback_frame = Some(frame);
        if let Some(entry) = self.frames.get_mut(&frame) {
            let snapshot = entry.clone();
            // Items will be re-emitted by the re-simulation
            entry.items.clear();
            self.rollback_frames.entry(frame).or_default().push(snapshot);
            debug!(frame, "rollback rewrite");
        }
    }

    /// Returns the decoded settings, or `None` before `GameStart`.
    #[must_use]
    pub fn settings(&self) -> Option<&GameStart> {
        self.settings.as_ref()
    }

    /// Returns the terminal game-end record, if the game has ended.
    #[must_use]
    pub fn game_end(&self) -> Option<&GameEnd> {
        self.game_end.as_ref()
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Returns the most recently written frame (possibly speculative).
    #[must_use]
    pub fn latest_frame(&self) -> Option<&FrameEntry> {
        self.frames.get(&self.latest_frame_index?)
    }

    /// Returns the most recently written frame number.
    #[must_use]
    pub fn latest_frame_number(&self) -> Option<i32> {
        self.latest_frame_index
    }

    /// Returns the finalized frames, keyed by frame number.
    ///
    /// Entries in this map never change once present.
    #[must_use]
    pub fn finalized_frames(&self) -> &BTreeMap<i32, FrameEntry> {
        &self.finalized
    }

    /// Returns superseded snapshots retained from rollback rewrites.
    #[must_use]
    pub fn rollback_frames(&self) -> &BTreeMap<i32, Vec<FrameEntry>> {
        &self.rollback_frames
    }

    /// Returns the number of finalized frames on which players had control.
    ///
    /// The pre-match countdown (negative frames up to the first playable
    /// frame) is excluded.
    #[must_use]
    pub fn playable_frame_count(&self) -> i32 {
        match self.last_finalized_frame {
            Some(last) if last >= FIRST_PLAYABLE_FRAME => last - FIRST_PLAYABLE_FRAME,
            _ => 0,
        }
    }

    /// Returns whether settings became available since the last call.
    pub fn take_settings_ready(&mut self) -> bool {
        std::mem::take(&mut self.settings_ready)
    }

    /// Drains newly finalized frames, cloned in ascending frame order.
    ///
    /// Each finalized frame is yielded exactly once across all calls.
    pub fn drain_finalized(&mut self) -> Vec<FrameEntry> {
        let numbers = std::mem::take(&mut self.newly_finalized);
        numbers
            .into_iter()
            .filter_map(|frame| self.finalized.get(&frame).cloned())
            .collect()
    }
}
