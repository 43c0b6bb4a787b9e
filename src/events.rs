//! Command bytes and typed event decoding for the SLP event stream.
//!
//! Every message in the raw region is one command byte followed by a
//! fixed-size payload (lengths come from the message-size table, see
//! [`crate::header`]). This module turns a raw message into a typed
//! [`Event`] record.
//!
//! # Forward compatibility
//!
//! The protocol evolves by appending fields to payloads and by adding new
//! command bytes. Two rules keep old and new readers interoperable:
//!
//! - an unrecognized command decodes to `None` and is skipped, and
//! - a field whose offset+width exceeds the payload decodes to an absent
//!   (`None`) field, never an error.
//!
//! # Offsets
//!
//! All offsets below are relative to the start of the *message*, i.e. the
//! command byte sits at offset 0 and the payload begins at offset 1. That
//! matches the published protocol documentation and the other ecosystem
//! readers bit for bit.

use serde::Serialize;

use crate::binary::{read_bool, read_f32, read_i32, read_i8, read_u16, read_u32, read_u8};
use crate::text::decode_name_window;

/// Raw command byte values of the SLP protocol.
pub mod command {
    /// Message-size table meta event.
    pub const MESSAGE_SIZES: u8 = 0x35;
    /// Game start (settings) event.
    pub const GAME_START: u8 = 0x36;
    /// Pre-frame update event.
    pub const PRE_FRAME_UPDATE: u8 = 0x37;
    /// Post-frame update event.
    pub const POST_FRAME_UPDATE: u8 = 0x38;
    /// Game end event.
    pub const GAME_END: u8 = 0x39;
    /// Frame start event (random seed; carried but unused by assembly).
    pub const FRAME_START: u8 = 0x3A;
    /// Item update event.
    pub const ITEM_UPDATE: u8 = 0x3B;
    /// Frame bookend (finalization) event.
    pub const FRAME_BOOKEND: u8 = 0x3C;
}

/// A command byte classified into the known protocol commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Message-size table (0x35).
    MessageSizes,
    /// Game start (0x36).
    GameStart,
    /// Pre-frame update (0x37).
    PreFrameUpdate,
    /// Post-frame update (0x38).
    PostFrameUpdate,
    /// Game end (0x39).
    GameEnd,
    /// Frame start (0x3A).
    FrameStart,
    /// Item update (0x3B).
    ItemUpdate,
    /// Frame bookend (0x3C).
    FrameBookend,
    /// Any command byte this reader does not know.
    Unknown(u8),
}

impl Command {
    /// Classifies a raw command byte.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            command::MESSAGE_SIZES => Command::MessageSizes,
            command::GAME_START => Command::GameStart,
            command::PRE_FRAME_UPDATE => Command::PreFrameUpdate,
            command::POST_FRAME_UPDATE => Command::PostFrameUpdate,
            command::GAME_END => Command::GameEnd,
            command::FRAME_START => Command::FrameStart,
            command::ITEM_UPDATE => Command::ItemUpdate,
            command::FRAME_BOOKEND => Command::FrameBookend,
            other => Command::Unknown(other),
        }
    }

    /// Returns the raw wire byte for this command.
    #[must_use]
    pub fn byte(self) -> u8 {
        match self {
            Command::MessageSizes => command::MESSAGE_SIZES,
            Command::GameStart => command::GAME_START,
            Command::PreFrameUpdate => command::PRE_FRAME_UPDATE,
            Command::PostFrameUpdate => command::POST_FRAME_UPDATE,
            Command::GameEnd => command::GAME_END,
            Command::FrameStart => command::FRAME_START,
            Command::ItemUpdate => command::ITEM_UPDATE,
            Command::FrameBookend => command::FRAME_BOOKEND,
            Command::Unknown(byte) => byte,
        }
    }
}

/// Controller-fix classification derived from two raw settings flags.
///
/// The two flags (dashback fix and shield-drop fix) are compared: unequal
/// values are a mixed configuration, equal values name a profile, and
/// equal-and-zero means no fix at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerFix {
    /// Both flags zero (or absent).
    None,
    /// Both flags set to the UCF profile.
    #[serde(rename = "UCF")]
    Ucf,
    /// Both flags set to the Dween profile.
    Dween,
    /// The two flags disagree.
    Mixed,
}

/// Per-player settings decoded from a `GameStart` payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSettings {
    /// Player slot index (0..=3).
    pub player_index: u8,
    /// One-based controller port.
    pub port: u8,
    /// External character id.
    pub character_id: Option<u8>,
    /// Player slot type (0 human, 1 cpu, 2 demo, 3 empty).
    pub player_type: Option<u8>,
    /// Stock count at game start.
    pub start_stocks: Option<u8>,
    /// Character costume index.
    pub character_color: Option<u8>,
    /// Team id when team mode is active.
    pub team_id: Option<u8>,
    /// Derived controller-fix classification.
    pub controller_fix: ControllerFix,
    /// In-game nametag, normalized to halfwidth.
    pub nametag: String,
    /// Online display name, normalized to halfwidth.
    pub display_name: String,
    /// Online connect code, normalized to halfwidth.
    pub connect_code: String,
}

/// Game settings decoded from a `GameStart` event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameStart {
    /// Protocol version as "major.minor.build".
    pub slp_version: Option<String>,
    /// Whether team mode is active.
    pub is_teams: Option<bool>,
    /// Whether the game runs the PAL release.
    pub is_pal: Option<bool>,
    /// Stage id.
    pub stage_id: Option<u16>,
    /// Minor scene number.
    pub scene: Option<u8>,
    /// Game mode (VS, online, ...).
    pub game_mode: Option<u8>,
    /// All four player slots, including empty ones.
    pub players: Vec<PlayerSettings>,
}

/// Controller and position state sampled before the frame's simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreFrameUpdate {
    /// Frame number (negative during the pre-match countdown).
    pub frame: Option<i32>,
    /// Player slot index.
    pub player_index: Option<u8>,
    /// Whether this entity is a follower (e.g. Nana).
    pub is_follower: Option<bool>,
    /// RNG seed at frame start.
    pub seed: Option<u32>,
    /// Action state id.
    pub action_state_id: Option<u16>,
    /// X position.
    pub position_x: Option<f32>,
    /// Y position.
    pub position_y: Option<f32>,
    /// Facing direction (-1 or 1).
    pub facing_direction: Option<f32>,
    /// Processed joystick X (-1..=1).
    pub joystick_x: Option<f32>,
    /// Processed joystick Y (-1..=1).
    pub joystick_y: Option<f32>,
    /// Processed c-stick X (-1..=1).
    pub c_stick_x: Option<f32>,
    /// Processed c-stick Y (-1..=1).
    pub c_stick_y: Option<f32>,
    /// Processed trigger value (0..=1).
    pub trigger: Option<f32>,
    /// Processed button bitmask.
    pub buttons: Option<u32>,
    /// Physical button bitmask.
    pub physical_buttons: Option<u16>,
    /// Physical L trigger value (0..=1).
    pub physical_l_trigger: Option<f32>,
    /// Physical R trigger value (0..=1).
    pub physical_r_trigger: Option<f32>,
    /// Damage percent.
    pub percent: Option<f32>,
}

/// Speeds the player imparted on themselves this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct SelfInducedSpeeds {
    /// Airborne horizontal speed.
    pub air_x: Option<f32>,
    /// Vertical speed.
    pub y: Option<f32>,
    /// Horizontal attack-induced speed.
    pub attack_x: Option<f32>,
    /// Vertical attack-induced speed.
    pub attack_y: Option<f32>,
    /// Grounded horizontal speed.
    pub ground_x: Option<f32>,
}

/// Resolved player state after the frame's simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PostFrameUpdate {
    /// Frame number (negative during the pre-match countdown).
    pub frame: Option<i32>,
    /// Player slot index.
    pub player_index: Option<u8>,
    /// Whether this entity is a follower (e.g. Nana).
    pub is_follower: Option<bool>,
    /// Internal character id (distinguishes Zelda/Sheik).
    pub internal_character_id: Option<u8>,
    /// Action state id.
    pub action_state_id: Option<u16>,
    /// X position.
    pub position_x: Option<f32>,
    /// Y position.
    pub position_y: Option<f32>,
    /// Facing direction (-1 or 1).
    pub facing_direction: Option<f32>,
    /// Damage percent.
    pub percent: Option<f32>,
    /// Shield health remaining.
    pub shield_size: Option<f32>,
    /// Id of the last attack this player landed.
    pub last_attack_landed: Option<u8>,
    /// Combo counter as tracked by the game.
    pub current_combo_count: Option<u8>,
    /// Index of the player who last hit this player.
    pub last_hit_by: Option<u8>,
    /// Stocks remaining.
    pub stocks_remaining: Option<u8>,
    /// Frames elapsed in the current action state.
    pub action_state_counter: Option<f32>,
    /// Various in-engine state (hitstun remaining, etc).
    pub misc_action_state: Option<f32>,
    /// Whether the player is airborne.
    pub is_airborne: Option<bool>,
    /// Id of the last ground the player stood on.
    pub last_ground_id: Option<u16>,
    /// Jumps remaining.
    pub jumps_remaining: Option<u8>,
    /// L-cancel status for this frame (0 none, 1 success, 2 miss).
    pub l_cancel_status: Option<u8>,
    /// Hurtbox collision state (0 vulnerable, 1 invulnerable, 2 intangible).
    pub hurtbox_collision_state: Option<u8>,
    /// Speeds the player imparted on themselves.
    pub self_induced_speeds: SelfInducedSpeeds,
}

/// State of a single item on a frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ItemUpdate {
    /// Frame number.
    pub frame: Option<i32>,
    /// Item type id.
    pub type_id: Option<u16>,
    /// Item state.
    pub state: Option<u8>,
    /// Facing direction.
    pub facing_direction: Option<f32>,
    /// X velocity.
    pub velocity_x: Option<f32>,
    /// Y velocity.
    pub velocity_y: Option<f32>,
    /// X position.
    pub position_x: Option<f32>,
    /// Y position.
    pub position_y: Option<f32>,
    /// Damage the item has taken.
    pub damage_taken: Option<u16>,
    /// Frames until the item expires.
    pub expiration_timer: Option<f32>,
    /// Unique spawn id for tracking an item across frames.
    pub spawn_id: Option<u32>,
    /// Samus missile type.
    pub missile_type: Option<u8>,
    /// Peach turnip face.
    pub turnip_face: Option<u8>,
    /// Whether a charge shot was launched.
    pub charge_shot_launched: Option<u8>,
    /// Charge shot power level.
    pub charge_power: Option<u8>,
    /// Owning player index, or -1 for none.
    pub owner: Option<i8>,
}

/// Frame bookend: all events for a frame have been emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameBookend {
    /// The frame this bookend closes.
    pub frame: Option<i32>,
    /// Highest frame number the netcode has confirmed will not roll back.
    pub latest_finalized_frame: Option<i32>,
}

/// Terminal game-end record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GameEnd {
    /// How the game ended (1 time, 2 game, 7 no-contest, ...).
    pub game_end_method: Option<u8>,
    /// Index of the player who quit early, or -1 for none.
    pub lras_initiator_index: Option<i8>,
}

/// A decoded SLP event.
///
/// Closed union over the commands frame assembly consumes; pattern match
/// exhaustively. Commands outside this set (including `MESSAGE_SIZES` and
/// `FRAME_START`, which carry nothing the assembler needs) decode to `None`
/// from [`Event::decode`] and are skipped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Event {
    /// Game settings.
    GameStart(GameStart),
    /// Pre-frame player state.
    PreFrameUpdate(PreFrameUpdate),
    /// Post-frame player state.
    PostFrameUpdate(PostFrameUpdate),
    /// Item state.
    ItemUpdate(ItemUpdate),
    /// Frame finalization marker.
    FrameBookend(FrameBookend),
    /// Terminal record.
    GameEnd(GameEnd),
}

impl Event {
    /// Decodes one message (command byte plus payload) into a typed event.
    ///
    /// Returns `None` for commands that carry no event. Fields past the end
    /// of the payload decode as absent.
    #[must_use]
    pub fn decode(command: Command, message: &[u8]) -> Option<Event> {
        match command {
            Command::GameStart => Some(Event::GameStart(decode_game_start(message))),
            Command::PreFrameUpdate => Some(Event::PreFrameUpdate(decode_pre_frame(message))),
            Command::PostFrameUpdate => Some(Event::PostFrameUpdate(decode_post_frame(message))),
            Command::ItemUpdate => Some(Event::ItemUpdate(decode_item(message))),
            Command::FrameBookend => Some(Event::FrameBookend(FrameBookend {
                frame: read_i32(message, 0x1),
                latest_finalized_frame: read_i32(message, 0x5),
            })),
            Command::GameEnd => Some(Event::GameEnd(GameEnd {
                game_end_method: read_u8(message, 0x1),
                lras_initiator_index: read_i8(message, 0x2),
            })),
            Command::MessageSizes | Command::FrameStart | Command::Unknown(_) => None,
        }
    }
}

fn decode_game_start(message: &[u8]) -> GameStart {
    let slp_version = match (
        read_u8(message, 0x1),
        read_u8(message, 0x2),
        read_u8(message, 0x3),
    ) {
        (Some(major), Some(minor), Some(build)) => Some(format!("{major}.{minor}.{build}")),
        _ => None,
    };

    let players = (0..4).map(|i| decode_player_settings(message, i)).collect();

    GameStart {
        slp_version,
        is_teams: read_bool(message, 0xd),
        is_pal: read_bool(message, 0x1a1),
        stage_id: read_u16(message, 0x13),
        scene: read_u8(message, 0x1a3),
        game_mode: read_u8(message, 0x1a4),
        players,
    }
}

fn decode_player_settings(message: &[u8], player_index: usize) -> PlayerSettings {
    let offset = player_index * 0x24;

    let cf_offset = player_index * 0x8;
    let dashback = read_u32(message, 0x141 + cf_offset);
    let shield_drop = read_u32(message, 0x145 + cf_offset);
    let controller_fix = if dashback != shield_drop {
        ControllerFix::Mixed
    } else if dashback == Some(1) {
        ControllerFix::Ucf
    } else if dashback == Some(2) {
        ControllerFix::Dween
    } else {
        ControllerFix::None
    };

    let nametag = decode_name_window(crate::binary::read_window(
        message,
        0x161 + player_index * 0x10,
        0x10,
    ));
    let display_name = decode_name_window(crate::binary::read_window(
        message,
        0x1a5 + player_index * 0x1f,
        0x1f,
    ));
    let connect_code = decode_name_window(crate::binary::read_window(
        message,
        0x221 + player_index * 0xa,
        0xa,
    ));

    PlayerSettings {
        player_index: player_index as u8,
        port: player_index as u8 + 1,
        character_id: read_u8(message, 0x65 + offset),
        player_type: read_u8(message, 0x66 + offset),
        start_stocks: read_u8(message, 0x67 + offset),
        character_color: read_u8(message, 0x68 + offset),
        team_id: read_u8(message, 0x6e + offset),
        controller_fix,
        nametag,
        display_name,
        connect_code,
    }
}

fn decode_pre_frame(message: &[u8]) -> PreFrameUpdate {
    PreFrameUpdate {
        frame: read_i32(message, 0x1),
        player_index: read_u8(message, 0x5),
        is_follower: read_bool(message, 0x6),
        seed: read_u32(message, 0x7),
        action_state_id: read_u16(message, 0xb),
        position_x: read_f32(message, 0xd),
        position_y: read_f32(message, 0x11),
        facing_direction: read_f32(message, 0x15),
        joystick_x: read_f32(message, 0x19),
        joystick_y: read_f32(message, 0x1d),
        c_stick_x: read_f32(message, 0x21),
        c_stick_y: read_f32(message, 0x25),
        trigger: read_f32(message, 0x29),
        buttons: read_u32(message, 0x2d),
        physical_buttons: read_u16(message, 0x31),
        physical_l_trigger: read_f32(message, 0x33),
        physical_r_trigger: read_f32(message, 0x37),
        percent: read_f32(message, 0x3c),
    }
}

fn decode_post_frame(message: &[u8]) -> PostFrameUpdate {
    PostFrameUpdate {
        frame: read_i32(message, 0x1),
        player_index: read_u8(message, 0x5),
        is_follower: read_bool(message, 0x6),
        internal_character_id: read_u8(message, 0x7),
        action_state_id: read_u16(message, 0x8),
        position_x: read_f32(message, 0xa),
        position_y: read_f32(message, 0xe),
        facing_direction: read_f32(message, 0x12),
        percent: read_f32(message, 0x16),
        shield_size: read_f32(message, 0x1a),
        last_attack_landed: read_u8(message, 0x1e),
        current_combo_count: read_u8(message, 0x1f),
        last_hit_by: read_u8(message, 0x20),
        stocks_remaining: read_u8(message, 0x21),
        action_state_counter: read_f32(message, 0x22),
        misc_action_state: read_f32(message, 0x2b),
        is_airborne: read_bool(message, 0x2f),
        last_ground_id: read_u16(message, 0x30),
        jumps_remaining: read_u8(message, 0x32),
        l_cancel_status: read_u8(message, 0x33),
        hurtbox_collision_state: read_u8(message, 0x34),
        self_induced_speeds: SelfInducedSpeeds {
            air_x: read_f32(message, 0x35),
            y: read_f32(message, 0x39),
            attack_x: read_f32(message, 0x3d),
            attack_y: read_f32(message, 0x41),
            ground_x: read_f32(message, 0x45),
        },
    }
}

fn decode_item(message: &[u8]) -> ItemUpdate {
    ItemUpdate {
        frame: read_i32(message, 0x1),
        type_id: read_u16(message, 0x5),
        state: read_u8(message, 0x7),
        facing_direction: read_f32(message, 0x8),
        velocity_x: read_f32(message, 0xc),
        velocity_y: read_f32(message, 0x10),
        position_x: read_f32(message, 0x14),
        position_y: read_f32(message, 0x18),
        damage_taken: read_u16(message, 0x1c),
        expiration_timer: read_f32(message, 0x1e),
        spawn_id: read_u32(message, 0x22),
        missile_type: read_u8(message, 0x26),
        turnip_face: read_u8(message, 0x27),
        charge_shot_launched: read_u8(message, 0x28),
        charge_power: read_u8(message, 0x29),
        owner: read_i8(message, 0x2a),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put_u32(buf: &mut [u8], offset: usize, value: u32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    fn put_i32(buf: &mut [u8], offset: usize, value: i32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    fn put_f32(buf: &mut [u8], offset: usize, value: f32) {
        buf[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
    }

    #[test]
    fn test_command_round_trip() {
        for byte in [0x35u8, 0x36, 0x37, 0x38, 0x39, 0x3A, 0x3B, 0x3C, 0xEE] {
            assert_eq!(Command::from_byte(byte).byte(), byte);
        }
        assert_eq!(Command::from_byte(0x3B), Command::ItemUpdate);
        assert_eq!(Command::from_byte(0x3C), Command::FrameBookend);
        assert!(matches!(Command::from_byte(0x99), Command::Unknown(0x99)));
    }

    #[test]
    fn test_unknown_command_decodes_to_none() {
        assert_eq!(Event::decode(Command::Unknown(0x99), &[0x99, 0, 0]), None);
        assert_eq!(Event::decode(Command::MessageSizes, &[0x35, 1]), None);
    }

    #[test]
    fn test_game_start_basic_fields() {
        let mut msg = vec![0u8; 0x250];
        msg[0] = command::GAME_START;
        msg[0x1] = 3;
        msg[0x2] = 16;
        msg[0x3] = 0;
        msg[0xd] = 1; // teams
        msg[0x13] = 0x00;
        msg[0x14] = 0x1F; // stage 31
        msg[0x1a1] = 0; // NTSC
        msg[0x1a3] = 2; // scene
        msg[0x1a4] = 8; // game mode

        let Some(Event::GameStart(start)) = Event::decode(Command::GameStart, &msg) else {
            panic!("expected GameStart");
        };
        assert_eq!(start.slp_version.as_deref(), Some("3.16.0"));
        assert_eq!(start.is_teams, Some(true));
        assert_eq!(start.is_pal, Some(false));
        assert_eq!(start.stage_id, Some(31));
        assert_eq!(start.scene, Some(2));
        assert_eq!(start.game_mode, Some(8));
        assert_eq!(start.players.len(), 4);
    }

    #[test]
    fn test_game_start_player_slots() {
        let mut msg = vec![0u8; 0x250];
        msg[0] = command::GAME_START;
        // Player 1 (index 1): Fox, human, 4 stocks, costume 2, team 1
        let o = 0x24;
        msg[0x65 + o] = 2;
        msg[0x66 + o] = 0;
        msg[0x67 + o] = 4;
        msg[0x68 + o] = 2;
        msg[0x6e + o] = 1;

        let Some(Event::GameStart(start)) = Event::decode(Command::GameStart, &msg) else {
            panic!("expected GameStart");
        };
        let p = &start.players[1];
        assert_eq!(p.player_index, 1);
        assert_eq!(p.port, 2);
        assert_eq!(p.character_id, Some(2));
        assert_eq!(p.player_type, Some(0));
        assert_eq!(p.start_stocks, Some(4));
        assert_eq!(p.character_color, Some(2));
        assert_eq!(p.team_id, Some(1));
    }

    #[test]
    fn test_controller_fix_classification() {
        let mut msg = vec![0u8; 0x250];
        msg[0] = command::GAME_START;
        // p0: both 1 -> UCF
        put_u32(&mut msg, 0x141, 1);
        put_u32(&mut msg, 0x145, 1);
        // p1: both 2 -> Dween
        put_u32(&mut msg, 0x149, 2);
        put_u32(&mut msg, 0x14d, 2);
        // p2: unequal -> Mixed
        put_u32(&mut msg, 0x151, 1);
        put_u32(&mut msg, 0x155, 2);
        // p3: both 0 -> None

        let Some(Event::GameStart(start)) = Event::decode(Command::GameStart, &msg) else {
            panic!("expected GameStart");
        };
        assert_eq!(start.players[0].controller_fix, ControllerFix::Ucf);
        assert_eq!(start.players[1].controller_fix, ControllerFix::Dween);
        assert_eq!(start.players[2].controller_fix, ControllerFix::Mixed);
        assert_eq!(start.players[3].controller_fix, ControllerFix::None);
    }

    #[test]
    fn test_game_start_name_fields() {
        let mut msg = vec![0u8; 0x250];
        msg[0] = command::GAME_START;
        // Player 0 nametag, display name, connect code (ASCII Shift-JIS)
        msg[0x161..0x161 + 4].copy_from_slice(b"TAG\x00");
        msg[0x1a5..0x1a5 + 6].copy_from_slice(b"Mango\x00");
        msg[0x221..0x221 + 7].copy_from_slice(b"MANG#0\x00");

        let Some(Event::GameStart(start)) = Event::decode(Command::GameStart, &msg) else {
            panic!("expected GameStart");
        };
        assert_eq!(start.players[0].nametag, "TAG");
        assert_eq!(start.players[0].display_name, "Mango");
        assert_eq!(start.players[0].connect_code, "MANG#0");
        // Untouched windows decode to empty strings
        assert_eq!(start.players[2].nametag, "");
    }

    #[test]
    fn test_legacy_game_start_truncated_fields_absent() {
        // Legacy payload size: fields past 0x141 do not exist
        let mut msg = vec![0u8; 0x141];
        msg[0] = command::GAME_START;

        let Some(Event::GameStart(start)) = Event::decode(Command::GameStart, &msg) else {
            panic!("expected GameStart");
        };
        assert_eq!(start.is_pal, None);
        assert_eq!(start.scene, None);
        assert_eq!(start.players[0].controller_fix, ControllerFix::None);
        assert_eq!(start.players[0].display_name, "");
    }

    #[test]
    fn test_pre_frame_fields() {
        let mut msg = vec![0u8; 0x41];
        msg[0] = command::PRE_FRAME_UPDATE;
        put_i32(&mut msg, 0x1, -123);
        msg[0x5] = 2;
        msg[0x6] = 0;
        put_u32(&mut msg, 0x7, 0xDEADBEEF);
        msg[0xb] = 0x00;
        msg[0xc] = 0x14; // action state 0x14
        put_f32(&mut msg, 0x19, 0.5);
        put_u32(&mut msg, 0x2d, 0x0200);
        msg[0x31] = 0x01;
        msg[0x32] = 0x00; // physical buttons 0x0100
        put_f32(&mut msg, 0x33, 0.71);
        put_f32(&mut msg, 0x3c, 42.5);

        let Some(Event::PreFrameUpdate(pre)) = Event::decode(Command::PreFrameUpdate, &msg) else {
            panic!("expected PreFrameUpdate");
        };
        assert_eq!(pre.frame, Some(-123));
        assert_eq!(pre.player_index, Some(2));
        assert_eq!(pre.is_follower, Some(false));
        assert_eq!(pre.seed, Some(0xDEADBEEF));
        assert_eq!(pre.action_state_id, Some(0x14));
        assert_eq!(pre.joystick_x, Some(0.5));
        assert_eq!(pre.buttons, Some(0x0200));
        assert_eq!(pre.physical_buttons, Some(0x0100));
        assert_eq!(pre.physical_l_trigger, Some(0.71));
        assert_eq!(pre.percent, Some(42.5));
    }

    #[test]
    fn test_legacy_pre_frame_short_payload() {
        // Legacy pre-frame payloads are 6 bytes: frame + player index only
        let mut msg = vec![0u8; 0x7];
        msg[0] = command::PRE_FRAME_UPDATE;
        put_i32(&mut msg, 0x1, 10);
        msg[0x5] = 1;
        msg[0x6] = 0;

        let Some(Event::PreFrameUpdate(pre)) = Event::decode(Command::PreFrameUpdate, &msg) else {
            panic!("expected PreFrameUpdate");
        };
        assert_eq!(pre.frame, Some(10));
        assert_eq!(pre.player_index, Some(1));
        assert_eq!(pre.seed, None);
        assert_eq!(pre.action_state_id, None);
        assert_eq!(pre.percent, None);
    }

    #[test]
    fn test_post_frame_fields() {
        let mut msg = vec![0u8; 0x49];
        msg[0] = command::POST_FRAME_UPDATE;
        put_i32(&mut msg, 0x1, 200);
        msg[0x5] = 0;
        msg[0x7] = 1; // internal character
        msg[0x8] = 0x00;
        msg[0x9] = 0x4C; // action state: damage
        put_f32(&mut msg, 0x16, 61.8);
        msg[0x1e] = 17; // last attack landed
        msg[0x20] = 1; // last hit by
        msg[0x21] = 3; // stocks
        msg[0x2f] = 1; // airborne
        msg[0x33] = 1; // l-cancel success
        put_f32(&mut msg, 0x45, -0.2);

        let Some(Event::PostFrameUpdate(post)) = Event::decode(Command::PostFrameUpdate, &msg)
        else {
            panic!("expected PostFrameUpdate");
        };
        assert_eq!(post.frame, Some(200));
        assert_eq!(post.player_index, Some(0));
        assert_eq!(post.internal_character_id, Some(1));
        assert_eq!(post.action_state_id, Some(0x4C));
        assert_eq!(post.percent, Some(61.8));
        assert_eq!(post.last_attack_landed, Some(17));
        assert_eq!(post.last_hit_by, Some(1));
        assert_eq!(post.stocks_remaining, Some(3));
        assert_eq!(post.is_airborne, Some(true));
        assert_eq!(post.l_cancel_status, Some(1));
        assert_eq!(post.self_induced_speeds.ground_x, Some(-0.2));
    }

    #[test]
    fn test_legacy_post_frame_short_payload() {
        // Legacy post-frame payload is 0x46 bytes; self-induced speeds absent
        let mut msg = vec![0u8; 0x47];
        msg[0] = command::POST_FRAME_UPDATE;
        put_i32(&mut msg, 0x1, 5);
        msg[0x21] = 4;

        let Some(Event::PostFrameUpdate(post)) = Event::decode(Command::PostFrameUpdate, &msg)
        else {
            panic!("expected PostFrameUpdate");
        };
        assert_eq!(post.frame, Some(5));
        assert_eq!(post.stocks_remaining, Some(4));
        assert_eq!(post.hurtbox_collision_state, Some(0));
        // ground_x sits at 0x45..0x49, past the 0x47-byte legacy message
        assert_eq!(post.self_induced_speeds.ground_x, None);
    }

    #[test]
    fn test_item_update_fields() {
        let mut msg = vec![0u8; 0x2c];
        msg[0] = command::ITEM_UPDATE;
        put_i32(&mut msg, 0x1, 300);
        msg[0x5] = 0x00;
        msg[0x6] = 0x63; // type id 99
        put_u32(&mut msg, 0x22, 7);
        msg[0x2a] = 0xFF; // owner -1

        let Some(Event::ItemUpdate(item)) = Event::decode(Command::ItemUpdate, &msg) else {
            panic!("expected ItemUpdate");
        };
        assert_eq!(item.frame, Some(300));
        assert_eq!(item.type_id, Some(99));
        assert_eq!(item.spawn_id, Some(7));
        assert_eq!(item.owner, Some(-1));
    }

    #[test]
    fn test_frame_bookend() {
        let mut msg = vec![0u8; 0x9];
        msg[0] = command::FRAME_BOOKEND;
        put_i32(&mut msg, 0x1, 12);
        put_i32(&mut msg, 0x5, 10);

        let Some(Event::FrameBookend(bookend)) = Event::decode(Command::FrameBookend, &msg) else {
            panic!("expected FrameBookend");
        };
        assert_eq!(bookend.frame, Some(12));
        assert_eq!(bookend.latest_finalized_frame, Some(10));
    }

    #[test]
    fn test_frame_bookend_without_finalized_field() {
        // Protocol versions before the field existed: 5-byte message
        let mut msg = vec![0u8; 0x5];
        msg[0] = command::FRAME_BOOKEND;
        put_i32(&mut msg, 0x1, 12);

        let Some(Event::FrameBookend(bookend)) = Event::decode(Command::FrameBookend, &msg) else {
            panic!("expected FrameBookend");
        };
        assert_eq!(bookend.frame, Some(12));
        assert_eq!(bookend.latest_finalized_frame, None);
    }

    #[test]
    fn test_game_end() {
        let msg = [command::GAME_END, 0x07, 0x01];
        let Some(Event::GameEnd(end)) = Event::decode(Command::GameEnd, &msg) else {
            panic!("expected GameEnd");
        };
        assert_eq!(end.game_end_method, Some(7));
        assert_eq!(end.lras_initiator_index, Some(1));

        // Legacy single-byte payload
        let msg = [command::GAME_END, 0x03];
        let Some(Event::GameEnd(end)) = Event::decode(Command::GameEnd, &msg) else {
            panic!("expected GameEnd");
        };
        assert_eq!(end.game_end_method, Some(3));
        assert_eq!(end.lras_initiator_index, None);
    }
}
