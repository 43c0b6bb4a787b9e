//! Combo detection.
//!
//! A combo is tracked per victim: it opens on the first damaged or grabbed
//! frame, accumulates hits attributed through the victim's `last_hit_by`
//! field, and ends once the victim spends more than
//! [`COMBO_STRING_RESET_FRAMES`](crate::stats::common::COMBO_STRING_RESET_FRAMES)
//! consecutive frames out of hitstun, or loses a stock.
//!
//! Consecutive hits merge into one [`MoveLanded`] while the attacker's
//! animation has not changed since the previous hit, so multi-hit moves
//! (drills, multihit aerials) count once with an incremented hit count.

use std::collections::{BTreeMap, HashMap};

use crate::events::GameStart;
use crate::frames::FrameEntry;
use crate::stats::common::{
    damage_taken, did_lose_stock, is_command_grabbed, is_damaged, is_grabbed, Combo, MoveLanded,
    COMBO_STRING_RESET_FRAMES,
};
use crate::stats::StatComputer;

struct VictimComboState {
    player_index: u8,
    open: Option<usize>,
    reset_counter: u32,
    // Attacker index to the animation they held on their last hit; an entry
    // survives only while that animation persists
    last_hit_animation: HashMap<u8, u16>,
}

/// Detects combo strings against each player.
#[derive(Default)]
pub struct ComboComputer {
    victims: Vec<VictimComboState>,
    combos: Vec<Combo>,
}

impl ComboComputer {
    /// Creates an unconfigured analyzer; call `setup` before feeding frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all combos observed so far, open ones included.
    #[must_use]
    pub fn fetch(&self) -> &[Combo] {
        &self.combos
    }
}

impl StatComputer for ComboComputer {
    fn setup(&mut self, settings: &GameStart) {
        self.victims = settings
            .players
            .iter()
            .map(|p| VictimComboState {
                player_index: p.player_index,
                open: None,
                reset_counter: 0,
                last_hit_animation: HashMap::new(),
            })
            .collect();
        self.combos.clear();
    }

    fn process_frame(&mut self, frame: &FrameEntry, all_frames: &BTreeMap<i32, FrameEntry>) {
        for state in &mut self.victims {
            let index = usize::from(state.player_index);
            let Some(post) = frame.post(index) else {
                continue;
            };
            let Some(prev_post) = all_frames.get(&(frame.frame - 1)).and_then(|f| f.post(index))
            else {
                continue;
            };

            let action_state = post.action_state_id.unwrap_or(0);
            let in_hitstun = is_damaged(action_state)
                || is_grabbed(action_state)
                || is_command_grabbed(action_state);
            let taken = damage_taken(post, prev_post);

            // Forget hit animations the attackers have since left
            state.last_hit_animation.retain(|&attacker, &mut animation| {
                frame
                    .post(usize::from(attacker))
                    .and_then(|p| p.action_state_id)
                    .is_some_and(|current| current == animation)
            });

            if in_hitstun {
                if state.open.is_none() {
                    self.combos.push(Combo {
                        player_index: state.player_index,
                        start_frame: frame.frame,
                        end_frame: None,
                        start_percent: prev_post.percent.unwrap_or(0.0),
                        current_percent: post.percent.unwrap_or(0.0),
                        end_percent: None,
                        moves: Vec::new(),
                        did_kill: false,
                        last_hit_by: None,
                    });
                    state.open = Some(self.combos.len() - 1);
                }

                if taken > 0.0 {
                    let slot = state.open.unwrap_or(usize::MAX);
                    if let Some(combo) = self.combos.get_mut(slot) {
                        record_hit(combo, state, frame, post.last_hit_by, taken);
                    }
                }
            }

            let Some(slot) = state.open else {
                continue;
            };
            let combo = &mut self.combos[slot];
            combo.current_percent = post.percent.unwrap_or(0.0);

            let lost_stock = did_lose_stock(post, prev_post);
            if lost_stock {
                combo.did_kill = true;
            }

            if in_hitstun {
                state.reset_counter = 0;
            } else {
                state.reset_counter += 1;
            }

            if lost_stock || state.reset_counter > COMBO_STRING_RESET_FRAMES {
                combo.end_frame = Some(frame.frame);
                combo.end_percent = Some(prev_post.percent.unwrap_or(0.0));
                state.open = None;
                state.reset_counter = 0;
                state.last_hit_animation.clear();
            }
        }
    }
}

/// Attributes one frame's damage to a move, merging into the previous move
/// while the attacker's animation is unchanged.
fn record_hit(
    combo: &mut Combo,
    state: &mut VictimComboState,
    frame: &FrameEntry,
    last_hit_by: Option<u8>,
    taken: f32,
) {
    let Some(attacker) = last_hit_by.filter(|&a| usize::from(a) < 4) else {
        return;
    };
    let Some(attacker_post) = frame.post(usize::from(attacker)) else {
        return;
    };

    let merging = state.last_hit_animation.contains_key(&attacker);
    if !merging {
        combo.moves.push(MoveLanded {
            player_index: attacker,
            frame: frame.frame,
            move_id: attacker_post.last_attack_landed.unwrap_or(0),
            hit_count: 0,
            damage: 0.0,
        });
    }
    if let Some(current_move) = combo.moves.last_mut() {
        current_move.hit_count += 1;
        current_move.damage += taken;
    }
    combo.last_hit_by = Some(attacker);
    if let Some(animation) = attacker_post.action_state_id {
        state.last_hit_animation.insert(attacker, animation);
    }
}
