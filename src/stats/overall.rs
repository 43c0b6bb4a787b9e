//! Per-player overall metrics derived from the other analyzers' output.

use serde::Serialize;

use crate::events::GameStart;
use crate::stats::common::{Conversion, OpeningType, Ratio};
use crate::stats::inputs::PlayerInput;

/// Aggregate metrics for one player over the whole game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallStats {
    /// The player these metrics belong to.
    pub player_index: u8,
    /// Total percent dealt across all conversions.
    pub total_damage: f32,
    /// Conversions this player's hits ended in a kill.
    pub kill_count: u32,
    /// Openings (conversions on any opponent).
    pub conversion_count: u32,
    /// Inputs over game minutes.
    pub inputs_per_minute: Ratio,
    /// Openings over kills.
    pub openings_per_kill: Ratio,
    /// Damage over openings.
    pub damage_per_opening: Ratio,
    /// Own neutral wins over all neutral wins between this player and their
    /// opponents.
    pub neutral_win_ratio: Ratio,
}

/// Derives overall metrics from the conversion and input analyzers.
///
/// `playable_frame_count` excludes the pre-match countdown; one game minute
/// is 3600 frames.
#[must_use]
pub fn generate_overall_stats(
    settings: &GameStart,
    inputs: &[PlayerInput],
    conversions: &[Conversion],
    playable_frame_count: i32,
) -> Vec<OverallStats> {
    let game_minutes = playable_frame_count as f32 / 3600.0;

    settings
        .players
        .iter()
        .map(|player| {
            let player_index = player.player_index;
            let total_inputs = inputs
                .iter()
                .find(|i| i.player_index == player_index)
                .map_or(0, |i| i.input_count);

            // Opponents exclude teammates when team mode is on
            let opponents: Vec<u8> = settings
                .players
                .iter()
                .filter(|opp| {
                    opp.player_index != player_index
                        && (!settings.is_teams.unwrap_or(false) || opp.team_id != player.team_id)
                })
                .map(|opp| opp.player_index)
                .collect();

            let mut conversion_count = 0u32;
            let mut kill_count = 0u32;
            let mut total_damage = 0.0f32;
            for conversion in conversions.iter().filter(|c| c.player_index != player_index) {
                conversion_count += 1;
                if conversion.did_kill && conversion.last_hit_by == Some(player_index) {
                    kill_count += 1;
                }
                for landed in &conversion.moves {
                    if landed.player_index == player_index {
                        total_damage += landed.damage;
                    }
                }
            }

            let own_neutral_wins = neutral_wins_started_by(conversions, player_index);
            let opponent_neutral_wins: u32 = opponents
                .iter()
                .map(|&opp| neutral_wins_started_by(conversions, opp))
                .sum();

            OverallStats {
                player_index,
                total_damage,
                kill_count,
                conversion_count,
                inputs_per_minute: Ratio::new(total_inputs as f32, game_minutes),
                openings_per_kill: Ratio::new(conversion_count as f32, kill_count as f32),
                damage_per_opening: Ratio::new(total_damage, conversion_count as f32),
                neutral_win_ratio: Ratio::new(
                    own_neutral_wins as f32,
                    (own_neutral_wins + opponent_neutral_wins) as f32,
                ),
            }
        })
        .collect()
}

/// Counts neutral-win conversions whose first move was landed by `attacker`.
fn neutral_wins_started_by(conversions: &[Conversion], attacker: u8) -> u32 {
    conversions
        .iter()
        .filter(|c| {
            c.opening_type == OpeningType::NeutralWin
                && c.moves.first().map(|m| m.player_index) == Some(attacker)
        })
        .count() as u32
}
