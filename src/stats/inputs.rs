//! Input counting.
//!
//! An "input" is a rising edge: a digital button newly pressed, an analog
//! trigger crossing its activation threshold, or a stick moving into a new
//! region. Held inputs never recount across frames.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::GameStart;
use crate::frames::FrameEntry;
use crate::stats::StatComputer;

/// Analog trigger depression counting as a press.
const TRIGGER_THRESHOLD: f32 = 0.3;

/// Stick deflection below which the stick reads as centered.
const STICK_DEADZONE: f32 = 0.2875;

/// The defined bits of the physical button bitfield.
const BUTTON_MASK: u16 = 0x1FFF;

/// Compass region a stick currently points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StickRegion {
    DeadZone,
    NorthEast,
    SouthEast,
    SouthWest,
    NorthWest,
    North,
    East,
    South,
    West,
}

fn stick_region(x: f32, y: f32) -> StickRegion {
    if x >= STICK_DEADZONE && y >= STICK_DEADZONE {
        StickRegion::NorthEast
    } else if x >= STICK_DEADZONE && y <= -STICK_DEADZONE {
        StickRegion::SouthEast
    } else if x <= -STICK_DEADZONE && y <= -STICK_DEADZONE {
        StickRegion::SouthWest
    } else if x <= -STICK_DEADZONE && y >= STICK_DEADZONE {
        StickRegion::NorthWest
    } else if y >= STICK_DEADZONE {
        StickRegion::North
    } else if x >= STICK_DEADZONE {
        StickRegion::East
    } else if y <= -STICK_DEADZONE {
        StickRegion::South
    } else if x <= -STICK_DEADZONE {
        StickRegion::West
    } else {
        StickRegion::DeadZone
    }
}

/// Input counts for one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerInput {
    /// The player these counts belong to.
    pub player_index: u8,
    /// Digital button presses.
    pub button_input_count: u32,
    /// Analog trigger activations (L and R independently).
    pub trigger_input_count: u32,
    /// Joystick region changes.
    pub joystick_input_count: u32,
    /// C-stick region changes.
    pub cstick_input_count: u32,
    /// Sum of the four groups.
    pub input_count: u32,
}

/// Counts discrete inputs per player.
#[derive(Default)]
pub struct InputComputer {
    players: Vec<PlayerInput>,
}

impl InputComputer {
    /// Creates an unconfigured analyzer; call `setup` before feeding frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the running counts per player.
    #[must_use]
    pub fn fetch(&self) -> &[PlayerInput] {
        &self.players
    }
}

impl StatComputer for InputComputer {
    fn setup(&mut self, settings: &GameStart) {
        self.players = settings
            .players
            .iter()
            .map(|p| PlayerInput {
                player_index: p.player_index,
                button_input_count: 0,
                trigger_input_count: 0,
                joystick_input_count: 0,
                cstick_input_count: 0,
                input_count: 0,
            })
            .collect();
    }

    fn process_frame(&mut self, frame: &FrameEntry, all_frames: &BTreeMap<i32, FrameEntry>) {
        let prev_frame = all_frames.get(&(frame.frame - 1));
        for counts in &mut self.players {
            let index = usize::from(counts.player_index);
            let Some(pre) = frame.pre(index) else {
                continue;
            };
            let Some(prev_pre) = prev_frame.and_then(|f| f.pre(index)) else {
                continue;
            };

            let buttons = pre.physical_buttons.unwrap_or(0) & BUTTON_MASK;
            let prev_buttons = prev_pre.physical_buttons.unwrap_or(0) & BUTTON_MASK;
            counts.button_input_count += (buttons & !prev_buttons).count_ones();

            for (now, before) in [
                (pre.physical_l_trigger, prev_pre.physical_l_trigger),
                (pre.physical_r_trigger, prev_pre.physical_r_trigger),
            ] {
                let pressed = now.unwrap_or(0.0) > TRIGGER_THRESHOLD;
                let was_pressed = before.unwrap_or(0.0) > TRIGGER_THRESHOLD;
                if pressed && !was_pressed {
                    counts.trigger_input_count += 1;
                }
            }

            let joy = stick_region(pre.joystick_x.unwrap_or(0.0), pre.joystick_y.unwrap_or(0.0));
            let prev_joy = stick_region(
                prev_pre.joystick_x.unwrap_or(0.0),
                prev_pre.joystick_y.unwrap_or(0.0),
            );
            if joy != prev_joy && joy != StickRegion::DeadZone {
                counts.joystick_input_count += 1;
            }

            let cstick = stick_region(pre.c_stick_x.unwrap_or(0.0), pre.c_stick_y.unwrap_or(0.0));
            let prev_cstick = stick_region(
                prev_pre.c_stick_x.unwrap_or(0.0),
                prev_pre.c_stick_y.unwrap_or(0.0),
            );
            if cstick != prev_cstick && cstick != StickRegion::DeadZone {
                counts.cstick_input_count += 1;
            }

            counts.input_count = counts.button_input_count
                + counts.trigger_input_count
                + counts.joystick_input_count
                + counts.cstick_input_count;
        }
    }
}
