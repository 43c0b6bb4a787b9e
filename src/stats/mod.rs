//! Incremental statistics pipeline.
//!
//! Five analyzers run over finalized frames in a fixed order: actions,
//! combos, conversions, inputs, stocks. Each implements [`StatComputer`]
//! and owns private state only; analyzers never read each other. Feeding
//! frames one at a time or in a batch produces identical results, and the
//! orchestrator only advances over contiguous frame numbers so an analyzer
//! always sees every frame exactly once, in order.

pub mod actions;
pub mod combos;
pub mod common;
pub mod conversions;
pub mod inputs;
pub mod overall;
pub mod stocks;

use std::collections::BTreeMap;

use tracing::debug;

use crate::events::GameStart;
use crate::frames::FrameEntry;

pub use actions::{ActionCounts, ActionsComputer, GrabCount, GroundTechCount};
pub use combos::ComboComputer;
pub use common::{Combo, Conversion, MoveLanded, OpeningType, Ratio, Stock};
pub use conversions::ConversionComputer;
pub use inputs::{InputComputer, PlayerInput};
pub use overall::{generate_overall_stats, OverallStats};
pub use stocks::StockComputer;

/// A frame-fed statistic analyzer.
pub trait StatComputer {
    /// Resets the analyzer for a new game's settings.
    fn setup(&mut self, settings: &GameStart);

    /// Feeds one finalized frame. Frames arrive in strictly increasing
    /// order, each exactly once; `all_frames` holds every frame fed so far
    /// for previous-frame and cross-player lookups.
    fn process_frame(&mut self, frame: &FrameEntry, all_frames: &BTreeMap<i32, FrameEntry>);
}

/// Owns the analyzers and drives them over finalized frames.
#[derive(Default)]
pub struct Stats {
    settings: Option<GameStart>,
    frames: BTreeMap<i32, FrameEntry>,
    last_processed_frame: Option<i32>,
    actions: ActionsComputer,
    combos: ComboComputer,
    conversions: ConversionComputer,
    inputs: InputComputer,
    stocks: StockComputer,
}

impl Stats {
    /// Creates an empty pipeline; call `setup` before adding frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes every analyzer for the game's settings.
    pub fn setup(&mut self, settings: &GameStart) {
        self.actions.setup(settings);
        self.combos.setup(settings);
        self.conversions.setup(settings);
        self.inputs.setup(settings);
        self.stocks.setup(settings);
        self.settings = Some(settings.clone());
        self.frames.clear();
        self.last_processed_frame = None;
    }

    /// Stores a finalized frame for processing.
    pub fn add_frame(&mut self, frame: FrameEntry) {
        self.frames.insert(frame.frame, frame);
    }

    /// Catches every analyzer up over contiguous stored frames.
    pub fn process(&mut self) {
        if self.settings.is_none() {
            return;
        }
        let mut next = match self.last_processed_frame {
            Some(last) => last + 1,
            None => match self.frames.keys().next() {
                Some(&first) => first,
                None => return,
            },
        };
        while let Some(frame) = self.frames.get(&next) {
            self.actions.process_frame(frame, &self.frames);
            self.combos.process_frame(frame, &self.frames);
            self.conversions.process_frame(frame, &self.frames);
            self.inputs.process_frame(frame, &self.frames);
            self.stocks.process_frame(frame, &self.frames);
            self.last_processed_frame = Some(next);
            next += 1;
        }
        debug!(last_processed = ?self.last_processed_frame, "stats caught up");
    }

    /// Returns action counts per player.
    #[must_use]
    pub fn action_counts(&self) -> Vec<&ActionCounts> {
        self.actions.fetch()
    }

    /// Returns all combos detected so far.
    #[must_use]
    pub fn combos(&self) -> &[Combo] {
        self.combos.fetch()
    }

    /// Returns all conversions detected so far.
    #[must_use]
    pub fn conversions(&self) -> &[Conversion] {
        self.conversions.fetch()
    }

    /// Returns input counts per player.
    #[must_use]
    pub fn inputs(&self) -> &[PlayerInput] {
        self.inputs.fetch()
    }

    /// Returns all stock records so far.
    #[must_use]
    pub fn stocks(&self) -> &[Stock] {
        self.stocks.fetch()
    }

    /// Returns overall per-player metrics for a playable-frame count.
    #[must_use]
    pub fn overall(&self, playable_frame_count: i32) -> Vec<OverallStats> {
        let Some(settings) = &self.settings else {
            return Vec::new();
        };
        generate_overall_stats(
            settings,
            self.inputs.fetch(),
            self.conversions.fetch(),
            playable_frame_count,
        )
    }
}
