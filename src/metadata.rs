//! Trailing UBJSON metadata block decoding.
//!
//! After the raw event region, a wrapped replay carries a UBJSON `metadata`
//! element holding what the writer knew out-of-band: recording timestamp,
//! last frame, per-player display names and character usage, platform.
//!
//! The block is decoded into a [`serde_json::Value`] so callers get the
//! whole tree without this crate committing to a schema; writers have
//! extended the metadata freely over the years. Severed files have no
//! metadata and yield `None`, as does any malformed block.

use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::header::FileInfo;

/// Decodes the metadata block of a replay buffer.
///
/// The block sits ten bytes past the raw region's end (skipping the UBJSON
/// `metadata` key) and runs to the file's final byte, which is the
/// container's closing `}`. Returns `None` when the file is severed before
/// the metadata or the block does not decode.
#[must_use]
pub fn read_metadata(bytes: &[u8], info: &FileInfo) -> Option<Value> {
    let position = info.raw_data_end().checked_add(10)?;
    let end = bytes.len().checked_sub(1)?;
    if position >= end {
        // Severed incomplete file
        return None;
    }

    let mut reader = UbjsonReader::new(&bytes[position..end]);
    match reader.read_value() {
        Some(value) => Some(value),
        None => {
            debug!("metadata block failed to decode");
            None
        }
    }
}

/// Minimal big-endian UBJSON reader covering the markers replay writers
/// emit: objects, arrays, strings, all integer widths, floats, bools, null.
struct UbjsonReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> UbjsonReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        UbjsonReader { bytes, position: 0 }
    }

    fn next_byte(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.position)?;
        self.position += 1;
        Some(byte)
    }

    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let end = self.position.checked_add(len)?;
        let slice = self.bytes.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    fn read_value(&mut self) -> Option<Value> {
        let marker = self.next_byte()?;
        self.read_value_with_marker(marker)
    }

    fn read_value_with_marker(&mut self, marker: u8) -> Option<Value> {
        match marker {
            b'{' => self.read_object(),
            b'[' => self.read_array(),
            b'S' => {
                let marker = self.next_byte()?;
                self.read_string(marker).map(Value::String)
            }
            b'i' => Some(Value::from(self.take(1)?[0] as i8)),
            b'U' => Some(Value::from(self.take(1)?[0])),
            b'I' => {
                let raw = self.take(2)?;
                Some(Value::from(i16::from_be_bytes([raw[0], raw[1]])))
            }
            b'l' => {
                let raw = self.take(4)?;
                Some(Value::from(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])))
            }
            b'L' => {
                let raw = self.take(8)?;
                let mut fixed = [0u8; 8];
                fixed.copy_from_slice(raw);
                Some(Value::from(i64::from_be_bytes(fixed)))
            }
            b'd' => {
                let raw = self.take(4)?;
                let value = f32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]);
                Some(Value::Number(Number::from_f64(f64::from(value))?))
            }
            b'D' => {
                let raw = self.take(8)?;
                let mut fixed = [0u8; 8];
                fixed.copy_from_slice(raw);
                Some(Value::Number(Number::from_f64(f64::from_be_bytes(fixed))?))
            }
            b'T' => Some(Value::Bool(true)),
            b'F' => Some(Value::Bool(false)),
            b'Z' => Some(Value::Null),
            _ => None,
        }
    }

    /// Reads a length-prefixed string given its length-type marker.
    ///
    /// Object keys use this directly; standalone strings arrive here after
    /// their `S` marker has been consumed.
    fn read_string(&mut self, length_marker: u8) -> Option<String> {
        let len = match length_marker {
            b'i' => {
                let v = self.take(1)?[0] as i8;
                usize::try_from(v).ok()?
            }
            b'U' => usize::from(self.take(1)?[0]),
            b'I' => {
                let raw = self.take(2)?;
                usize::try_from(i16::from_be_bytes([raw[0], raw[1]])).ok()?
            }
            b'l' => {
                let raw = self.take(4)?;
                usize::try_from(i32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]])).ok()?
            }
            _ => return None,
        };
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).ok()
    }

    fn read_object(&mut self) -> Option<Value> {
        let mut map = Map::new();
        loop {
            let marker = self.next_byte()?;
            if marker == b'}' {
                return Some(Value::Object(map));
            }
            // Keys are strings without the S marker
            let key = self.read_string(marker)?;
            let value = self.read_value()?;
            map.insert(key, value);
        }
    }

    fn read_array(&mut self) -> Option<Value> {
        let mut items = Vec::new();
        loop {
            if self.peek_byte()? == b']' {
                self.position += 1;
                return Some(Value::Array(items));
            }
            items.push(self.read_value()?);
        }
    }
}
