//! Resumable iteration over the raw event region.
//!
//! The raw region is a dense sequence of messages: one command byte, then a
//! fixed-size payload whose length comes from the file's message-size table.
//! [`iterate_events`] walks that sequence, decoding each message and handing
//! it to a caller-supplied callback, and returns the position it stopped at.
//!
//! # Soft stops
//!
//! Replays are written while the game runs, so the file on disk routinely
//! ends mid-message or introduces a command this reader has no size for.
//! Neither is an error: iteration simply stops *at the start of* the message
//! it could not consume and returns that position. Calling again later with
//! the returned position resumes exactly there, which is how a growing file
//! is decoded incrementally without re-decoding old events.
//!
//! # Example
//!
//! ```
//! use slp_parser::header::FileInfo;
//! use slp_parser::stream::iterate_events;
//!
//! let bytes = [0x39u8, 0x02]; // bare legacy file: one GameEnd message
//! let info = FileInfo::scan(&bytes);
//!
//! let mut seen = 0;
//! let next = iterate_events(&bytes, &info, None, |_, _| {
//!     seen += 1;
//!     false
//! });
//! assert_eq!(seen, 1);
//! assert_eq!(next, 2);
//! ```

use tracing::debug;

use crate::events::{Command, Event};
use crate::header::FileInfo;

/// Walks the raw event region, invoking `on_event` per decoded message.
///
/// Iteration starts at `start_pos` when it is `Some(p)` with `p > 0`,
/// otherwise at the raw region's start. Each message is decoded with
/// [`Event::decode`]; the callback receives the command and the decoded
/// event (`None` for commands that carry no event; callers should keep
/// iterating past those).
///
/// The callback's return value is a stop signal: returning `true` halts
/// iteration *without* consuming the triggering message, so it will be
/// presented again on resume. Consumers must therefore handle a repeated
/// message idempotently.
///
/// Returns the next resume position.
pub fn iterate_events<F>(bytes: &[u8], info: &FileInfo, start_pos: Option<usize>, mut on_event: F) -> usize
where
    F: FnMut(Command, Option<&Event>) -> bool,
{
    let mut position = match start_pos {
        Some(p) if p > 0 => p,
        _ => info.raw_data_position,
    };
    let stop_reading_at = std::cmp::min(info.raw_data_end(), bytes.len());

    while position < stop_reading_at {
        let command_byte = bytes[position];
        let Some(payload_size) = info.message_sizes.get(command_byte) else {
            // No size entry: either an unknown format or bytes written by a
            // newer writer mid-append. Wait for more data.
            debug!(
                command = format_args!("0x{command_byte:02X}"),
                position, "no size entry for command, stopping"
            );
            return position;
        };
        let message_size = usize::from(payload_size) + 1;
        if message_size > stop_reading_at - position {
            // Partial trailing message
            debug!(position, message_size, "truncated trailing message, stopping");
            return position;
        }

        let message = &bytes[position..position + message_size];
        let command = Command::from_byte(command_byte);
        let event = Event::decode(command, message);
        if on_event(command, event.as_ref()) {
            break;
        }

        position += message_size;
    }

    position
}
