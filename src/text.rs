//! Text transforms for in-game name fields.
//!
//! Nametags, display names, and connect codes are stored as fixed-width
//! Shift-JIS byte windows inside the `GameStart` payload. This module
//! converts those windows to `String`s and normalizes the fullwidth
//! characters the game's text entry produces into their halfwidth
//! equivalents, so `ＦＡＬＣＯ＃１` compares equal to `FALCO#1`.

use encoding_rs::SHIFT_JIS;

/// Decodes a Shift-JIS byte window into a `String`.
///
/// Decoding is best-effort: invalid sequences are replaced rather than
/// rejected, and everything from the first NUL onward is discarded (the
/// windows are NUL-padded to their fixed width).
///
/// # Example
///
/// ```
/// use slp_parser::text::decode_shift_jis;
///
/// let buf = b"ABC\x00\x00\x00";
/// assert_eq!(decode_shift_jis(buf), "ABC");
/// ```
#[must_use]
pub fn decode_shift_jis(bytes: &[u8]) -> String {
    let (decoded, _, _) = SHIFT_JIS.decode(bytes);
    match decoded.split('\0').next() {
        Some(s) => s.to_string(),
        None => String::new(),
    }
}

/// Converts fullwidth characters in a string to their halfwidth forms.
///
/// Covers the fullwidth ASCII block (U+FF01..=U+FF5E) and the ideographic
/// space (U+3000). Characters outside those ranges pass through unchanged.
///
/// # Example
///
/// ```
/// use slp_parser::text::to_halfwidth;
///
/// assert_eq!(to_halfwidth("ＡＢＣ＃１"), "ABC#1");
/// assert_eq!(to_halfwidth("mango"), "mango");
/// ```
#[must_use]
pub fn to_halfwidth(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            }
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}

/// Decodes a name window: Shift-JIS decode followed by fullwidth
/// normalization. Undecodable input yields an empty string.
#[must_use]
pub fn decode_name_window(bytes: &[u8]) -> String {
    to_halfwidth(&decode_shift_jis(bytes))
}
