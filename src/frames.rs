//! Per-frame game state assembled from the event stream.
//!
//! A [`FrameEntry`] merges the pre-frame, post-frame, and item events that
//! share a frame number. Entries are built incrementally: a frame may hold
//! only pre-frame data for a while, and under rollback netcode the same
//! frame number can be written more than once before it is finalized.

use serde::Serialize;

use crate::events::{ItemUpdate, PostFrameUpdate, PreFrameUpdate};

/// The first frame number of a game (pre-match countdown included).
pub const FIRST_FRAME: i32 = -123;

/// The first frame on which players have control.
pub const FIRST_PLAYABLE_FRAME: i32 = -39;

/// Pre- and post-frame state for one entity on one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerFrameData {
    /// Input-side state sampled before the simulation step.
    pub pre: Option<PreFrameUpdate>,
    /// Resolved state after the simulation step.
    pub post: Option<PostFrameUpdate>,
}

impl PlayerFrameData {
    /// Returns whether neither half has been populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre.is_none() && self.post.is_none()
    }
}

/// All state recorded for a single frame number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameEntry {
    /// The frame number.
    pub frame: i32,
    /// Primary entity per player slot.
    pub players: [Option<PlayerFrameData>; 4],
    /// Follower entity per player slot (Ice Climbers' partner).
    pub followers: [Option<PlayerFrameData>; 4],
    /// Items alive on this frame.
    pub items: Vec<ItemUpdate>,
}

impl FrameEntry {
    /// Creates an empty entry for a frame number.
    #[must_use]
    pub fn new(frame: i32) -> Self {
        FrameEntry {
            frame,
            players: Default::default(),
            followers: Default::default(),
            items: Vec::new(),
        }
    }

    /// Returns the post-frame data for a player slot, if present.
    #[must_use]
    pub fn post(&self, player_index: usize) -> Option<&PostFrameUpdate> {
        self.players.get(player_index)?.as_ref()?.post.as_ref()
    }

    /// Returns the pre-frame data for a player slot, if present.
    #[must_use]
    pub fn pre(&self, player_index: usize) -> Option<&PreFrameUpdate> {
        self.players.get(player_index)?.as_ref()?.pre.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_is_empty() {
        let entry = FrameEntry::new(-123);
        assert_eq!(entry.frame, -123);
        assert!(entry.players.iter().all(Option::is_none));
        assert!(entry.followers.iter().all(Option::is_none));
        assert!(entry.items.is_empty());
        assert!(entry.post(0).is_none());
        assert!(entry.pre(3).is_none());
    }

    #[test]
    fn test_accessors_out_of_range() {
        let entry = FrameEntry::new(0);
        assert!(entry.post(7).is_none());
        assert!(entry.pre(7).is_none());
    }
}
