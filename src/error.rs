//! Error types for the SLP replay parser.
//!
//! The error surface here is deliberately small: malformed *replay* data is
//! never an error in this crate. Truncated headers, unknown commands, and
//! severed files all degrade to partial or empty results so that consumers
//! can handle in-progress or corrupted recordings. The only fatal condition
//! is a byte source that cannot be used at all.

use thiserror::Error;

/// The main error type for SLP parsing operations.
///
/// This only covers failures to *obtain* replay bytes. Failures to make
/// sense of the bytes surface as absent fields and empty frame maps, not as
/// errors.
///
/// # Example
///
/// ```
/// use slp_parser::error::{Result, SlpError};
///
/// fn example_operation() -> Result<()> {
///     Err(SlpError::UnsupportedSource {
///         reason: "directory paths cannot be read".to_string(),
///     })
/// }
/// ```
#[derive(Error, Debug)]
pub enum SlpError {
    /// An I/O error occurred while opening or reading the replay file.
    ///
    /// This wraps standard library I/O errors for seamless error propagation
    /// using the `?` operator.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested byte-source kind cannot be serviced.
    #[error("Unsupported byte source: {reason}")]
    UnsupportedSource {
        /// A description of why the source cannot be used.
        reason: String,
    },
}

/// A specialized Result type for SLP parsing operations.
///
/// This is a convenience alias that uses `SlpError` as the error type.
pub type Result<T> = std::result::Result<T, SlpError>;
