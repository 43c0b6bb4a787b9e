//! Container header and message-size table decoding.
//!
//! An `.slp` file wraps its event stream in a UBJSON container:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | `{` container marker |
//! | 1 | 10 | `U\x03raw[$U#l` raw-element preamble |
//! | 11 | 4 | u32 BE raw-region length |
//! | 15 | var | raw event region |
//! | ... | 10 | metadata separator |
//! | ... | var | UBJSON metadata, to end-of-file minus 1 |
//!
//! The very first bytes of the raw region are a `MESSAGE_SIZES` meta-event
//! describing the fixed payload length of every command the writer will
//! emit. Files that predate the container have no marker and no size event;
//! those decode against a hardcoded legacy table.
//!
//! Nothing in this module errors. A header that cannot be understood
//! degrades to an empty table, which the stream iterator treats as "stop
//! before the first message" and the rest of the crate surfaces as a game
//! with no settings and no frames.

use std::collections::BTreeMap;

use tracing::debug;

use crate::events::command;

/// The container's opening marker (`{`).
pub const CONTAINER_MARKER: u8 = 0x7B;

/// Offset of the raw event region inside a wrapped container.
pub const RAW_DATA_OFFSET: usize = 15;

/// Mapping from command byte to fixed payload length in bytes.
///
/// Payload lengths exclude the command byte itself. The table is immutable
/// once built; it either comes from the file's `MESSAGE_SIZES` event or is
/// the hardcoded legacy table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSizeTable {
    sizes: BTreeMap<u8, u16>,
}

impl MessageSizeTable {
    /// Returns the hardcoded table used by files that predate versioning.
    #[must_use]
    pub fn legacy() -> Self {
        let mut sizes = BTreeMap::new();
        sizes.insert(command::GAME_START, 0x140);
        sizes.insert(command::PRE_FRAME_UPDATE, 0x6);
        sizes.insert(command::POST_FRAME_UPDATE, 0x46);
        sizes.insert(command::GAME_END, 0x1);
        MessageSizeTable { sizes }
    }

    /// Returns the payload length for a command byte, if known.
    #[must_use]
    pub fn get(&self, command_byte: u8) -> Option<u16> {
        self.sizes.get(&command_byte).copied()
    }

    /// Returns whether the table has no entries.
    ///
    /// An empty table stops the stream iterator at the first message,
    /// which is how an unrecognized format fails soft.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Returns the number of known commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sizes.len()
    }
}

/// Locates the raw event region and decodes the message-size table.
#[derive(Debug, Clone)]
pub struct FileInfo {
    /// Byte offset where the raw event region starts.
    pub raw_data_position: usize,

    /// Length of the raw event region in bytes.
    pub raw_data_length: usize,

    /// Command-byte to payload-length table for this file.
    pub message_sizes: MessageSizeTable,
}

impl FileInfo {
    /// Scans a replay buffer for its raw region and size table.
    ///
    /// Never fails; malformed headers degrade per the module docs.
    #[must_use]
    pub fn scan(bytes: &[u8]) -> Self {
        let raw_data_position = raw_data_position(bytes);
        let raw_data_length = raw_data_length(bytes, raw_data_position);
        let message_sizes = message_sizes(bytes, raw_data_position);
        FileInfo {
            raw_data_position,
            raw_data_length,
            message_sizes,
        }
    }

    /// Returns the exclusive end offset of the raw region.
    #[must_use]
    pub fn raw_data_end(&self) -> usize {
        self.raw_data_position + self.raw_data_length
    }
}

/// Returns the position where the raw event region starts.
///
/// Files without the container marker are treated as bare raw regions
/// starting at offset 0 (legacy format support).
#[must_use]
pub fn raw_data_position(bytes: &[u8]) -> usize {
    if bytes.first() != Some(&CONTAINER_MARKER) {
        return 0;
    }
    RAW_DATA_OFFSET
}

/// Returns the length of the raw event region.
///
/// For wrapped containers the length is the big-endian 4-byte integer
/// immediately preceding the raw region. A non-positive value means the
/// file was severed before the writer could backfill the field; the
/// remainder of the file is used instead.
#[must_use]
pub fn raw_data_length(bytes: &[u8], position: usize) -> usize {
    if position == 0 {
        return bytes.len();
    }

    let declared = position
        .checked_sub(4)
        .and_then(|at| crate::binary::read_i32(bytes, at))
        .unwrap_or(0);
    if declared > 0 {
        // If this method manages to read a number, it's probably trustworthy
        return declared as usize;
    }

    debug!(declared, "raw-region length field unusable, assuming severed file");
    bytes.len().saturating_sub(position)
}

/// Builds the message-size table for a replay buffer.
///
/// Position 0 means the legacy headerless format and yields the hardcoded
/// table. Otherwise the bytes at `position` must be a `MESSAGE_SIZES` event
/// (`0x35`, payload length, then repeating `(command, hi, lo)` groups); any
/// other command byte yields an empty table. An incomplete trailing group
/// is ignored.
#[must_use]
pub fn message_sizes(bytes: &[u8], position: usize) -> MessageSizeTable {
    if position == 0 {
        return MessageSizeTable::legacy();
    }

    let (Some(event_command), Some(payload_length)) = (
        crate::binary::read_u8(bytes, position),
        crate::binary::read_u8(bytes, position + 1),
    ) else {
        return MessageSizeTable::default();
    };
    if event_command != command::MESSAGE_SIZES {
        debug!(
            command = format_args!("0x{event_command:02X}"),
            "raw region does not begin with a message-size event"
        );
        return MessageSizeTable::default();
    }

    let mut sizes = BTreeMap::new();
    sizes.insert(command::MESSAGE_SIZES, u16::from(payload_length));

    // The payload after the length byte holds 3-byte groups.
    let groups_start = position + 2;
    let groups_len = usize::from(payload_length).saturating_sub(1);
    let groups_end = std::cmp::min(groups_start.saturating_add(groups_len), bytes.len());
    let groups = &bytes[std::cmp::min(groups_start, groups_end)..groups_end];

    let mut i = 0;
    while i + 3 <= groups.len() {
        let cmd = groups[i];
        let size = (u16::from(groups[i + 1]) << 8) | u16::from(groups[i + 2]);
        sizes.insert(cmd, size);
        i += 3;
    }

    MessageSizeTable { sizes }
}
