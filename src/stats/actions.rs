//! Action counting.
//!
//! Counts are keyed on animation entry: a state only counts on the frame
//! the player enters it, so a 30-frame roll is one roll. Composite
//! techniques (dash dance, wavedash, waveland) are recognized from a short
//! window of recent animations rather than a single state id.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::GameStart;
use crate::frames::FrameEntry;
use crate::stats::StatComputer;

const TURN: u16 = 0x12;
const DASH: u16 = 0x14;
const KNEE_BEND: u16 = 0x18;
const LANDING_FALL_SPECIAL: u16 = 0x2B;
const TECH_MISS_UP: u16 = 0xB7;
const TECH_MISS_DOWN: u16 = 0xBF;
const NEUTRAL_TECH: u16 = 0xC7;
const TECH_AWAY: u16 = 0xC8;
const TECH_IN: u16 = 0xC9;
const WALL_TECH: u16 = 0xCA;
const WALL_TECH_JUMP: u16 = 0xCB;
const GRAB: u16 = 0xD4;
const GRAB_PULL: u16 = 0xD5;
const ROLL_FORWARD: u16 = 0xE9;
const ROLL_BACKWARD: u16 = 0xEA;
const SPOT_DODGE: u16 = 0xEB;
const AIR_DODGE: u16 = 0xEC;
const CLIFF_CATCH: u16 = 0xFC;

/// Recent-animation window consulted for composite techniques.
const ANIMATION_WINDOW: usize = 8;

/// Grab attempts split by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrabCount {
    /// Grabs that connected.
    pub success: u32,
    /// Whiffed grabs.
    pub fail: u32,
}

/// Ground techs split by direction, plus misses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroundTechCount {
    /// Knockdowns with no tech input.
    pub fail: u32,
    /// Techs in place.
    pub neutral: u32,
    /// Techs toward the opponent.
    #[serde(rename = "in")]
    pub toward: u32,
    /// Techs away from the opponent.
    pub away: u32,
}

/// Action counts for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    /// The player these counts belong to.
    pub player_index: u8,
    /// Wavedashes (air dodge into the ground out of a jump squat).
    pub wavedash_count: u32,
    /// Wavelands (air dodge into the ground from the air).
    pub waveland_count: u32,
    /// Air dodges, wavedashes and wavelands excluded.
    pub air_dodge_count: u32,
    /// Dash-dance direction changes.
    pub dash_dance_count: u32,
    /// Spot dodges.
    pub spot_dodge_count: u32,
    /// Ledge grabs.
    pub ledgegrab_count: u32,
    /// Rolls, either direction.
    pub roll_count: u32,
    /// Grab attempts.
    pub grab_count: GrabCount,
    /// Ground tech outcomes.
    pub ground_tech_count: GroundTechCount,
    /// Wall techs, jump variant included.
    pub wall_tech_count: u32,
}

struct PlayerActionState {
    counts: ActionCounts,
    animations: Vec<u16>,
    grab_pending: bool,
}

/// Counts defensive and movement actions per player.
#[derive(Default)]
pub struct ActionsComputer {
    players: Vec<PlayerActionState>,
}

impl ActionsComputer {
    /// Creates an unconfigured analyzer; call `setup` before feeding frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the running counts per player.
    #[must_use]
    pub fn fetch(&self) -> Vec<&ActionCounts> {
        self.players.iter().map(|p| &p.counts).collect()
    }
}

impl StatComputer for ActionsComputer {
    fn setup(&mut self, settings: &GameStart) {
        self.players = settings
            .players
            .iter()
            .map(|p| PlayerActionState {
                counts: ActionCounts {
                    player_index: p.player_index,
                    ..Default::default()
                },
                animations: Vec::new(),
                grab_pending: false,
            })
            .collect();
    }

    fn process_frame(&mut self, frame: &FrameEntry, _all_frames: &BTreeMap<i32, FrameEntry>) {
        for state in &mut self.players {
            let index = usize::from(state.counts.player_index);
            let Some(post) = frame.post(index) else {
                continue;
            };
            let Some(animation) = post.action_state_id else {
                continue;
            };

            let is_new_animation = state.animations.last() != Some(&animation);
            state.animations.push(animation);
            if state.animations.len() > ANIMATION_WINDOW + 1 {
                state.animations.remove(0);
            }
            if !is_new_animation {
                continue;
            }

            state.resolve_pending_grab(animation);

            match animation {
                ROLL_FORWARD | ROLL_BACKWARD => state.counts.roll_count += 1,
                SPOT_DODGE => state.counts.spot_dodge_count += 1,
                AIR_DODGE => state.counts.air_dodge_count += 1,
                CLIFF_CATCH => state.counts.ledgegrab_count += 1,
                TECH_MISS_UP | TECH_MISS_DOWN => state.counts.ground_tech_count.fail += 1,
                NEUTRAL_TECH => state.counts.ground_tech_count.neutral += 1,
                TECH_IN => state.counts.ground_tech_count.toward += 1,
                TECH_AWAY => state.counts.ground_tech_count.away += 1,
                WALL_TECH | WALL_TECH_JUMP => state.counts.wall_tech_count += 1,
                GRAB => state.grab_pending = true,
                DASH => state.count_dash_dance(),
                LANDING_FALL_SPECIAL => state.count_wave_technique(),
                _ => {}
            }
        }
    }
}

impl PlayerActionState {
    /// An open grab attempt resolves on the next animation: a pull means it
    /// connected, anything else is a whiff.
    fn resolve_pending_grab(&mut self, animation: u16) {
        if !self.grab_pending || animation == GRAB {
            return;
        }
        if animation == GRAB_PULL {
            self.counts.grab_count.success += 1;
        } else {
            self.counts.grab_count.fail += 1;
        }
        self.grab_pending = false;
    }

    fn count_dash_dance(&mut self) {
        let len = self.animations.len();
        if len < 3 {
            return;
        }
        if self.animations[len - 2] == TURN && self.animations[len - 3] == DASH {
            self.counts.dash_dance_count += 1;
        }
    }

    /// Classifies a special landing as a wavedash or waveland when an air
    /// dodge sits in the recent-animation window.
    fn count_wave_technique(&mut self) {
        let len = self.animations.len();
        let window = &self.animations[len.saturating_sub(ANIMATION_WINDOW + 1)..len - 1];
        if !window.contains(&AIR_DODGE) {
            return;
        }
        // The air dodge was spent executing the technique
        self.counts.air_dodge_count = self.counts.air_dodge_count.saturating_sub(1);
        if window.contains(&KNEE_BEND) {
            self.counts.wavedash_count += 1;
        } else {
            self.counts.waveland_count += 1;
        }
    }
}
