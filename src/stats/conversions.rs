//! Conversion (punish) detection.
//!
//! Conversions use the same hit accounting as combos but a different
//! lifetime rule: the reset counter only advances while the victim is in a
//! grounded actionable state, so a juggle whose victim is airborne but out
//! of hitstun stays open. Each conversion also classifies how it began:
//! a neutral win, a counter-attack, or a trade.

use std::collections::{BTreeMap, HashMap};

use crate::events::GameStart;
use crate::frames::FrameEntry;
use crate::stats::common::{
    damage_taken, did_lose_stock, is_attacking, is_command_grabbed, is_damaged, is_grabbed,
    is_in_control, Conversion, MoveLanded, OpeningType, PUNISH_RESET_FRAMES,
};
use crate::stats::StatComputer;

struct VictimConversionState {
    player_index: u8,
    open: Option<usize>,
    reset_counter: u32,
    last_hit_animation: HashMap<u8, u16>,
}

/// Detects punish sequences against each player.
#[derive(Default)]
pub struct ConversionComputer {
    victims: Vec<VictimConversionState>,
    conversions: Vec<Conversion>,
}

impl ConversionComputer {
    /// Creates an unconfigured analyzer; call `setup` before feeding frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all conversions observed so far, open ones included.
    #[must_use]
    pub fn fetch(&self) -> &[Conversion] {
        &self.conversions
    }
}

impl StatComputer for ConversionComputer {
    fn setup(&mut self, settings: &GameStart) {
        self.victims = settings
            .players
            .iter()
            .map(|p| VictimConversionState {
                player_index: p.player_index,
                open: None,
                reset_counter: 0,
                last_hit_animation: HashMap::new(),
            })
            .collect();
        self.conversions.clear();
    }

    fn process_frame(&mut self, frame: &FrameEntry, all_frames: &BTreeMap<i32, FrameEntry>) {
        let prev_frame = all_frames.get(&(frame.frame - 1));
        for state in &mut self.victims {
            let index = usize::from(state.player_index);
            let Some(post) = frame.post(index) else {
                continue;
            };
            let Some(prev_post) = prev_frame.and_then(|f| f.post(index)) else {
                continue;
            };

            let action_state = post.action_state_id.unwrap_or(0);
            let in_hitstun = is_damaged(action_state)
                || is_grabbed(action_state)
                || is_command_grabbed(action_state);
            let taken = damage_taken(post, prev_post);

            state.last_hit_animation.retain(|&attacker, &mut animation| {
                frame
                    .post(usize::from(attacker))
                    .and_then(|p| p.action_state_id)
                    .is_some_and(|current| current == animation)
            });

            if in_hitstun {
                if state.open.is_none() {
                    self.conversions.push(Conversion {
                        player_index: state.player_index,
                        last_hit_by: None,
                        start_frame: frame.frame,
                        end_frame: None,
                        start_percent: prev_post.percent.unwrap_or(0.0),
                        current_percent: post.percent.unwrap_or(0.0),
                        end_percent: None,
                        moves: Vec::new(),
                        did_kill: false,
                        opening_type: OpeningType::NeutralWin,
                    });
                    state.open = Some(self.conversions.len() - 1);
                }

                if taken > 0.0 {
                    let slot = state.open.unwrap_or(usize::MAX);
                    if let Some(conversion) = self.conversions.get_mut(slot) {
                        record_hit(conversion, state, frame, prev_frame, post.last_hit_by, taken);
                    }
                }
            }

            let Some(slot) = state.open else {
                continue;
            };
            let conversion = &mut self.conversions[slot];
            conversion.current_percent = post.percent.unwrap_or(0.0);

            let lost_stock = did_lose_stock(post, prev_post);
            if lost_stock {
                conversion.did_kill = true;
            }

            // A victim thrown into the air without hitstun keeps the punish
            // open; only grounded control runs the clock
            if in_hitstun {
                state.reset_counter = 0;
            } else if is_in_control(action_state) {
                state.reset_counter += 1;
            }

            if lost_stock || state.reset_counter > PUNISH_RESET_FRAMES {
                conversion.end_frame = Some(frame.frame);
                conversion.end_percent = Some(prev_post.percent.unwrap_or(0.0));
                state.open = None;
                state.reset_counter = 0;
                state.last_hit_animation.clear();
            }
        }
    }
}

fn record_hit(
    conversion: &mut Conversion,
    state: &mut VictimConversionState,
    frame: &FrameEntry,
    prev_frame: Option<&FrameEntry>,
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
        conversion.moves.push(MoveLanded {
            player_index: attacker,
            frame: frame.frame,
            move_id: attacker_post.last_attack_landed.unwrap_or(0),
            hit_count: 0,
            damage: 0.0,
        });
        if conversion.moves.len() == 1 {
            conversion.opening_type = classify_opening(
                prev_frame,
                usize::from(attacker),
                usize::from(conversion.player_index),
            );
        }
    }
    if let Some(current_move) = conversion.moves.last_mut() {
        current_move.hit_count += 1;
        current_move.damage += taken;
    }
    conversion.last_hit_by = Some(attacker);
    if let Some(animation) = attacker_post.action_state_id {
        state.last_hit_animation.insert(attacker, animation);
    }
}

/// Classifies the first hit of a conversion from the frame before it.
fn classify_opening(
    prev_frame: Option<&FrameEntry>,
    attacker: usize,
    victim: usize,
) -> OpeningType {
    let attacker_state = prev_frame
        .and_then(|f| f.post(attacker))
        .and_then(|p| p.action_state_id)
        .unwrap_or(0);
    let victim_state = prev_frame
        .and_then(|f| f.post(victim))
        .and_then(|p| p.action_state_id)
        .unwrap_or(0);

    if is_damaged(attacker_state) || is_grabbed(attacker_state) {
        OpeningType::CounterAttack
    } else if is_attacking(victim_state) {
        OpeningType::Trade
    } else {
        OpeningType::NeutralWin
    }
}
