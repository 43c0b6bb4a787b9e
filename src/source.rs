//! Byte-source abstraction over replay inputs.
//!
//! A replay can arrive as a file on disk or as an in-memory buffer. The
//! parser only ever needs random-access reads and a total length, so both
//! kinds hide behind [`ByteSource`].
//!
//! A file source re-reads from disk on every access. That is deliberate:
//! the facade re-runs the decode chain on demand, and a file that is still
//! being written by the game grows between calls. Re-reading picks up the
//! new bytes and the resumable iterator avoids re-decoding the old ones.
//!
//! The only fatal error in the crate lives here: a file that cannot be
//! opened at construction time. Read failures *after* construction degrade
//! to empty reads (with a warning) so the facade getters stay infallible.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Result, SlpError};

/// A read-only source of replay bytes.
#[derive(Debug, Clone)]
pub enum ByteSource {
    /// A replay file on disk, re-read on every access.
    File(PathBuf),

    /// An in-memory replay buffer.
    Buffer(Vec<u8>),
}

impl ByteSource {
    /// Creates a file-backed source, validating that the file can be opened.
    ///
    /// # Errors
    ///
    /// Returns `SlpError::Io` if the file cannot be opened for reading, or
    /// `SlpError::UnsupportedSource` for paths that are not regular files.
    /// This is the crate's single fatal error path; every later read
    /// degrades softly instead.
    pub fn file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        if file.metadata()?.is_dir() {
            return Err(SlpError::UnsupportedSource {
                reason: format!("{} is a directory, not a replay file", path.display()),
            });
        }
        Ok(ByteSource::File(path))
    }

    /// Creates an in-memory source.
    #[must_use]
    pub fn buffer(data: Vec<u8>) -> Self {
        ByteSource::Buffer(data)
    }

    /// Returns the total number of bytes currently available.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            ByteSource::File(path) => match std::fs::metadata(path) {
                Ok(meta) => meta.len(),
                Err(err) => {
                    warn!(path = %path.display(), %err, "failed to stat replay file");
                    0
                }
            },
            ByteSource::Buffer(data) => data.len() as u64,
        }
    }

    /// Returns whether the source currently holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads up to `len` bytes starting at `offset`.
    ///
    /// Short reads at end-of-source return a shorter (possibly empty)
    /// vector rather than an error.
    #[must_use]
    pub fn read(&self, offset: u64, len: usize) -> Vec<u8> {
        match self {
            ByteSource::File(path) => {
                let mut buf = vec![0u8; len];
                let read = File::open(path)
                    .and_then(|mut f| {
                        f.seek(SeekFrom::Start(offset))?;
                        read_up_to(&mut f, &mut buf)
                    })
                    .unwrap_or_else(|err| {
                        warn!(path = %path.display(), offset, len, %err, "replay file read failed");
                        0
                    });
                buf.truncate(read);
                buf
            }
            ByteSource::Buffer(data) => {
                let start = std::cmp::min(offset as usize, data.len());
                let end = std::cmp::min(start.saturating_add(len), data.len());
                data[start..end].to_vec()
            }
        }
    }

    /// Reads the entire source into memory.
    #[must_use]
    pub fn read_all(&self) -> Vec<u8> {
        match self {
            ByteSource::File(path) => std::fs::read(path).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "replay file read failed");
                Vec::new()
            }),
            ByteSource::Buffer(data) => data.clone(),
        }
    }

    /// Returns the file path backing this source, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ByteSource::File(path) => Some(path),
            ByteSource::Buffer(_) => None,
        }
    }
}

/// Reads until the buffer is full or the reader is exhausted.
fn read_up_to(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
