//! Shared action-state classification and stat record types.
//!
//! Action-state ids are engine animation ids. The ranges below partition the
//! id space coarsely enough for stat derivation; analyzers only ever ask
//! category questions ("is the victim in hitstun?"), never about specific
//! animations outside the handful of named constants in `actions.rs`.

use serde::Serialize;

use crate::events::PostFrameUpdate;

/// Frames a combo string survives without the victim in hitstun.
pub const COMBO_STRING_RESET_FRAMES: u32 = 45;

/// Frames a conversion survives with the victim back in grounded control.
pub const PUNISH_RESET_FRAMES: u32 = 45;

const GROUNDED_CONTROL_START: u16 = 0x0E;
const GROUNDED_CONTROL_END: u16 = 0x18;
const SQUAT_START: u16 = 0x27;
const SQUAT_END: u16 = 0x28;
const GROUND_ATTACK_START: u16 = 0x2C;
const GROUND_ATTACK_END: u16 = 0x40;
const AERIAL_ATTACK_START: u16 = 0x41;
const AERIAL_ATTACK_END: u16 = 0x4A;
const DAMAGE_START: u16 = 0x4B;
const DAMAGE_END: u16 = 0x5B;
const GUARD_START: u16 = 0xB2;
const GUARD_END: u16 = 0xB6;
const TECH_START: u16 = 0xC7;
const TECH_END: u16 = 0xCC;
const DYING_START: u16 = 0x00;
const DYING_END: u16 = 0x0A;
const GRABBED_START: u16 = 0xDF;
const GRABBED_END: u16 = 0xE8;
const COMMAND_GRAB_RANGE1_START: u16 = 0x10D;
const COMMAND_GRAB_RANGE1_END: u16 = 0x118;
const COMMAND_GRAB_RANGE2_START: u16 = 0x11A;
const COMMAND_GRAB_RANGE2_END: u16 = 0x125;

/// Whether the state is hitstun or tumble.
#[must_use]
pub fn is_damaged(action_state_id: u16) -> bool {
    (DAMAGE_START..=DAMAGE_END).contains(&action_state_id)
}

/// Whether the state is held in a standard grab.
#[must_use]
pub fn is_grabbed(action_state_id: u16) -> bool {
    (GRABBED_START..=GRABBED_END).contains(&action_state_id)
}

/// Whether the state is held in a character-specific command grab.
#[must_use]
pub fn is_command_grabbed(action_state_id: u16) -> bool {
    (COMMAND_GRAB_RANGE1_START..=COMMAND_GRAB_RANGE1_END).contains(&action_state_id)
        || (COMMAND_GRAB_RANGE2_START..=COMMAND_GRAB_RANGE2_END).contains(&action_state_id)
}

/// Whether the player is in a grounded actionable state (standing, walking,
/// dashing, squatting).
#[must_use]
pub fn is_in_control(action_state_id: u16) -> bool {
    (GROUNDED_CONTROL_START..=GROUNDED_CONTROL_END).contains(&action_state_id)
        || (SQUAT_START..=SQUAT_END).contains(&action_state_id)
}

/// Whether the state is any ground or aerial attack.
#[must_use]
pub fn is_attacking(action_state_id: u16) -> bool {
    // The ground and aerial ranges are adjacent
    (GROUND_ATTACK_START..=GROUND_ATTACK_END).contains(&action_state_id)
        || (AERIAL_ATTACK_START..=AERIAL_ATTACK_END).contains(&action_state_id)
}

/// Whether the state is shielding.
#[must_use]
pub fn is_guarding(action_state_id: u16) -> bool {
    (GUARD_START..=GUARD_END).contains(&action_state_id)
}

/// Whether the state is a tech (ground or wall).
#[must_use]
pub fn is_teching(action_state_id: u16) -> bool {
    (TECH_START..=TECH_END).contains(&action_state_id)
}

/// Whether the state is a death animation.
#[must_use]
pub fn is_dying(action_state_id: u16) -> bool {
    (DYING_START..=DYING_END).contains(&action_state_id)
}

/// Percent gained this frame, floored at zero (respawns drop percent).
#[must_use]
pub fn damage_taken(current: &PostFrameUpdate, previous: &PostFrameUpdate) -> f32 {
    let now = current.percent.unwrap_or(0.0);
    let before = previous.percent.unwrap_or(0.0);
    (now - before).max(0.0)
}

/// Whether a stock was lost between two consecutive frames.
#[must_use]
pub fn did_lose_stock(current: &PostFrameUpdate, previous: &PostFrameUpdate) -> bool {
    match (current.stocks_remaining, previous.stocks_remaining) {
        (Some(now), Some(before)) => now < before,
        _ => false,
    }
}

/// One move connecting within a combo or conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoveLanded {
    /// The attacker who landed the move.
    pub player_index: u8,
    /// Frame the move first connected on.
    pub frame: i32,
    /// Attack id as reported by the attacker's post-frame state.
    pub move_id: u8,
    /// Hits attributed to this move (multi-hit moves merge).
    pub hit_count: u32,
    /// Total percent dealt by this move.
    pub damage: f32,
}

/// A string of hits on one victim without an extended hitstun gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combo {
    /// The victim.
    pub player_index: u8,
    /// Frame of the first hit.
    pub start_frame: i32,
    /// Frame the combo ended on, `None` while still open.
    pub end_frame: Option<i32>,
    /// Victim percent before the first hit.
    pub start_percent: f32,
    /// Victim percent as of the last processed frame.
    pub current_percent: f32,
    /// Victim percent when the combo ended.
    pub end_percent: Option<f32>,
    /// Moves landed, in order.
    pub moves: Vec<MoveLanded>,
    /// Whether the combo ended in a stock loss.
    pub did_kill: bool,
    /// Attacker of the most recent hit.
    pub last_hit_by: Option<u8>,
}

/// How a conversion began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpeningType {
    /// The victim was in neutral when hit.
    NeutralWin,
    /// The attacker was being punished when the first hit landed.
    CounterAttack,
    /// Both players' attacks connected.
    Trade,
}

/// A punish sequence on one victim, open until the victim regains grounded
/// control for an extended window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// The victim.
    pub player_index: u8,
    /// Attacker of the most recent hit.
    pub last_hit_by: Option<u8>,
    /// Frame of the first hit.
    pub start_frame: i32,
    /// Frame the conversion ended on, `None` while still open.
    pub end_frame: Option<i32>,
    /// Victim percent before the first hit.
    pub start_percent: f32,
    /// Victim percent as of the last processed frame.
    pub current_percent: f32,
    /// Victim percent when the conversion ended.
    pub end_percent: Option<f32>,
    /// Moves landed, in order.
    pub moves: Vec<MoveLanded>,
    /// Whether the conversion ended in a stock loss.
    pub did_kill: bool,
    /// Classification of the first hit.
    pub opening_type: OpeningType,
}

/// The lifetime of one stock.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stock {
    /// The stock's owner.
    pub player_index: u8,
    /// Frame the stock came alive (spawn or game start).
    pub start_frame: i32,
    /// Frame the stock was lost, `None` while alive.
    pub end_frame: Option<i32>,
    /// Percent as of the last processed frame.
    pub current_percent: f32,
    /// Percent on the frame before the stock was lost.
    pub end_percent: Option<f32>,
    /// Stock count while this stock was alive.
    pub count: u8,
    /// Action state on the death frame.
    pub death_animation: Option<u16>,
}

/// A count over a denominator, with the quotient left undefined when the
/// denominator is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ratio {
    /// Numerator.
    pub count: f32,
    /// Denominator.
    pub total: f32,
    /// `count / total`, `None` when `total` is zero.
    pub ratio: Option<f32>,
}

impl Ratio {
    /// Builds a ratio, leaving the quotient undefined on a zero denominator.
    #[must_use]
    pub fn new(count: f32, total: f32) -> Self {
        let ratio = if total != 0.0 { Some(count / total) } else { None };
        Ratio { count, total, ratio }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_boundaries() {
        assert!(is_in_control(0x0E));
        assert!(is_in_control(0x18));
        assert!(is_in_control(0x27));
        assert!(!is_in_control(0x19));

        assert!(is_damaged(0x4B));
        assert!(is_damaged(0x5B));
        assert!(!is_damaged(0x5C));

        assert!(is_attacking(0x2C));
        assert!(is_attacking(0x4A));
        assert!(!is_attacking(0x4B));

        assert!(is_grabbed(0xDF));
        assert!(!is_grabbed(0xE9));

        assert!(is_command_grabbed(0x10D));
        assert!(!is_command_grabbed(0x119));
        assert!(is_command_grabbed(0x11A));

        assert!(is_dying(0x00));
        assert!(is_dying(0x0A));
        assert!(!is_dying(0x0B));

        assert!(is_guarding(0xB2));
        assert!(is_teching(0xCC));
    }

    #[test]
    fn test_damage_taken_floors_at_zero() {
        let before = PostFrameUpdate {
            percent: Some(80.0),
            ..Default::default()
        };
        let hit = PostFrameUpdate {
            percent: Some(95.5),
            ..Default::default()
        };
        let respawned = PostFrameUpdate {
            percent: Some(0.0),
            ..Default::default()
        };
        assert_eq!(damage_taken(&hit, &before), 15.5);
        assert_eq!(damage_taken(&respawned, &before), 0.0);
    }

    #[test]
    fn test_did_lose_stock() {
        let four = PostFrameUpdate {
            stocks_remaining: Some(4),
            ..Default::default()
        };
        let three = PostFrameUpdate {
            stocks_remaining: Some(3),
            ..Default::default()
        };
        assert!(did_lose_stock(&three, &four));
        assert!(!did_lose_stock(&four, &four));
        assert!(!did_lose_stock(&four, &three));
        assert!(!did_lose_stock(&three, &PostFrameUpdate::default()));
    }

    #[test]
    fn test_ratio_zero_denominator() {
        let r = Ratio::new(3.0, 0.0);
        assert_eq!(r.ratio, None);
        let r = Ratio::new(3.0, 2.0);
        assert_eq!(r.ratio, Some(1.5));
    }
}
