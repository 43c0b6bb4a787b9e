//! Stock lifetime tracking.

use std::collections::BTreeMap;

use crate::events::GameStart;
use crate::frames::FrameEntry;
use crate::stats::common::{did_lose_stock, Stock};
use crate::stats::StatComputer;

struct PlayerStockState {
    player_index: u8,
    open: Option<usize>,
}

/// Tracks every stock each player has held: when it came alive, the percent
/// it accumulated, and how it was lost.
#[derive(Default)]
pub struct StockComputer {
    players: Vec<PlayerStockState>,
    stocks: Vec<Stock>,
}

impl StockComputer {
    /// Creates an unconfigured analyzer; call `setup` before feeding frames.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all stock records observed so far, open ones included.
    #[must_use]
    pub fn fetch(&self) -> &[Stock] {
        &self.stocks
    }
}

impl StatComputer for StockComputer {
    fn setup(&mut self, settings: &GameStart) {
        self.players = settings
            .players
            .iter()
            .map(|p| PlayerStockState {
                player_index: p.player_index,
                open: None,
            })
            .collect();
        self.stocks.clear();
    }

    fn process_frame(&mut self, frame: &FrameEntry, all_frames: &BTreeMap<i32, FrameEntry>) {
        for state in &mut self.players {
            let index = usize::from(state.player_index);
            let Some(post) = frame.post(index) else {
                continue;
            };
            let prev_post = all_frames.get(&(frame.frame - 1)).and_then(|f| f.post(index));

            match state.open {
                None => {
                    self.stocks.push(Stock {
                        player_index: state.player_index,
                        start_frame: frame.frame,
                        end_frame: None,
                        current_percent: 0.0,
                        end_percent: None,
                        count: post.stocks_remaining.unwrap_or(0),
                        death_animation: None,
                    });
                    state.open = Some(self.stocks.len() - 1);
                }
                Some(slot) => {
                    let lost = prev_post.is_some_and(|prev| did_lose_stock(post, prev));
                    let stock = &mut self.stocks[slot];
                    if lost {
                        stock.end_frame = Some(frame.frame);
                        stock.end_percent =
                            prev_post.and_then(|prev| prev.percent).or(Some(0.0));
                        stock.death_animation = post.action_state_id;
                        state.open = None;
                    } else {
                        stock.current_percent = post.percent.unwrap_or(0.0);
                    }
                }
            }
        }
    }
}
