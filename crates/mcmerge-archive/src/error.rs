//! Error types for archive operations.
//!
//! [`ArchiveError`] is the single error type returned by all
//! [`ArchiveCodec`](crate::ArchiveCodec) methods. Variants separate a broken
//! container from a single unreadable entry so callers can report which file
//! inside the upload was at fault.

use thiserror::Error;

/// Errors returned by [`ArchiveCodec`](crate::ArchiveCodec) operations.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The byte stream is not a readable archive (bad signature, truncated
    /// central directory, unsupported compression).
    #[error("malformed archive: {message}")]
    Malformed {
        /// Human-readable description from the decoder.
        message: String,
    },

    /// A single entry could not be read or written.
    #[error("archive entry `{path}`: {message}")]
    Entry {
        /// Entry path inside the archive.
        path: String,
        /// What went wrong with this entry.
        message: String,
    },

    /// An I/O error occurred while streaming entry data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::Malformed {
                message: other.to_string(),
            },
        }
    }
}
