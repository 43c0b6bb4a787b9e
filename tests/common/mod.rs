//! Shared synthetic-replay builders for integration tests.
//!
//! Real replays are large and game-version specific; these helpers build
//! minimal but structurally faithful replay buffers: wrapped UBJSON
//! container, self-describing message-size table, fixed-size messages,
//! optional trailing metadata block.

#![allow(dead_code)]

use slp_parser::events::command;
use slp_parser::header::CONTAINER_MARKER;

pub const GAME_START_PAYLOAD: u16 = 0x140;
pub const PRE_FRAME_PAYLOAD: u16 = 0x3A;
pub const POST_FRAME_PAYLOAD: u16 = 0x46;
pub const ITEM_PAYLOAD: u16 = 0x2A;
pub const BOOKEND_PAYLOAD: u16 = 0x8;
pub const GAME_END_PAYLOAD: u16 = 0x2;

/// The size table declared by every built replay.
fn size_table() -> Vec<u8> {
    let entries: &[(u8, u16)] = &[
        (command::GAME_START, GAME_START_PAYLOAD),
        (command::PRE_FRAME_UPDATE, PRE_FRAME_PAYLOAD),
        (command::POST_FRAME_UPDATE, POST_FRAME_PAYLOAD),
        (command::ITEM_UPDATE, ITEM_PAYLOAD),
        (command::FRAME_BOOKEND, BOOKEND_PAYLOAD),
        (command::GAME_END, GAME_END_PAYLOAD),
    ];
    let mut event = vec![command::MESSAGE_SIZES, (entries.len() * 3 + 1) as u8];
    for &(cmd, size) in entries {
        event.push(cmd);
        event.extend_from_slice(&size.to_be_bytes());
    }
    event
}

/// Wraps messages into a full container, optionally with a metadata block.
pub fn build_replay_with_metadata(messages: &[Vec<u8>], metadata: Option<&[u8]>) -> Vec<u8> {
    let mut raw = size_table();
    for msg in messages {
        raw.extend_from_slice(msg);
    }

    let mut bytes = Vec::new();
    bytes.push(CONTAINER_MARKER);
    bytes.extend_from_slice(b"U\x03raw[$U#l");
    bytes.extend_from_slice(&(raw.len() as i32).to_be_bytes());
    bytes.extend_from_slice(&raw);
    if let Some(metadata) = metadata {
        bytes.extend_from_slice(b"U\x08metadata");
        bytes.extend_from_slice(metadata);
        bytes.push(b'}');
    }
    bytes
}

/// Wraps messages into a full container without metadata.
pub fn build_replay(messages: &[Vec<u8>]) -> Vec<u8> {
    build_replay_with_metadata(messages, None)
}

/// A `GameStart` message with the given player types (3 = empty slot).
pub fn game_start(player_types: [u8; 4]) -> Vec<u8> {
    let mut msg = vec![0u8; usize::from(GAME_START_PAYLOAD) + 1];
    msg[0] = command::GAME_START;
    msg[1] = 3;
    msg[2] = 16;
    msg[3] = 0;
    msg[0x14] = 31; // stage: Battlefield
    for (i, &player_type) in player_types.iter().enumerate() {
        msg[0x65 + i * 0x24] = 2; // character
        msg[0x66 + i * 0x24] = player_type;
        msg[0x67 + i * 0x24] = 4; // start stocks
    }
    msg
}

/// A minimal `PreFrameUpdate` message.
pub fn pre_frame(frame: i32, player: u8, physical_buttons: u16, joystick: (f32, f32)) -> Vec<u8> {
    let mut msg = vec![0u8; usize::from(PRE_FRAME_PAYLOAD) + 1];
    msg[0] = command::PRE_FRAME_UPDATE;
    msg[1..5].copy_from_slice(&frame.to_be_bytes());
    msg[5] = player;
    msg[0x19..0x1D].copy_from_slice(&joystick.0.to_be_bytes());
    msg[0x1D..0x21].copy_from_slice(&joystick.1.to_be_bytes());
    msg[0x31..0x33].copy_from_slice(&physical_buttons.to_be_bytes());
    msg
}

/// A minimal `PostFrameUpdate` message.
pub fn post_frame(frame: i32, player: u8, action_state: u16, percent: f32, stocks: u8) -> Vec<u8> {
    post_frame_hit(frame, player, action_state, percent, stocks, 0, 0)
}

/// A `PostFrameUpdate` message carrying hit attribution fields.
pub fn post_frame_hit(
    frame: i32,
    player: u8,
    action_state: u16,
    percent: f32,
    stocks: u8,
    last_attack_landed: u8,
    last_hit_by: u8,
) -> Vec<u8> {
    let mut msg = vec![0u8; usize::from(POST_FRAME_PAYLOAD) + 1];
    msg[0] = command::POST_FRAME_UPDATE;
    msg[1..5].copy_from_slice(&frame.to_be_bytes());
    msg[5] = player;
    msg[8..10].copy_from_slice(&action_state.to_be_bytes());
    msg[0x16..0x1A].copy_from_slice(&percent.to_be_bytes());
    msg[0x1E] = last_attack_landed;
    msg[0x20] = last_hit_by;
    msg[0x21] = stocks;
    msg
}

/// An `ItemUpdate` message.
pub fn item(frame: i32, type_id: u16, spawn_id: u32) -> Vec<u8> {
    let mut msg = vec![0u8; usize::from(ITEM_PAYLOAD) + 1];
    msg[0] = command::ITEM_UPDATE;
    msg[1..5].copy_from_slice(&frame.to_be_bytes());
    msg[5..7].copy_from_slice(&type_id.to_be_bytes());
    msg[0x22..0x26].copy_from_slice(&spawn_id.to_be_bytes());
    msg
}

/// A `FrameBookend` message.
pub fn bookend(frame: i32, latest_finalized: i32) -> Vec<u8> {
    let mut msg = vec![command::FRAME_BOOKEND];
    msg.extend_from_slice(&frame.to_be_bytes());
    msg.extend_from_slice(&latest_finalized.to_be_bytes());
    msg
}

/// A `GameEnd` message.
pub fn game_end(method: u8) -> Vec<u8> {
    vec![command::GAME_END, method, 0xFF]
}

/// Both players' pre and post messages plus a bookend for one neutral frame.
pub fn neutral_frame(frame: i32) -> Vec<Vec<u8>> {
    vec![
        pre_frame(frame, 0, 0, (0.0, 0.0)),
        pre_frame(frame, 1, 0, (0.0, 0.0)),
        post_frame(frame, 0, 0x0E, 0.0, 4),
        post_frame(frame, 1, 0x0E, 0.0, 4),
        bookend(frame, frame),
    ]
}
