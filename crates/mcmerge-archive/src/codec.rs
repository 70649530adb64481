//! The [`ArchiveCodec`] trait and the flat entry type it trades in.

use crate::error::ArchiveError;

/// One file inside an archive: a forward-slash relative path and its raw bytes.
///
/// Directory entries never appear as `ArchiveEntry` values; readers skip them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path relative to the archive root, `/`-separated.
    pub path: String,
    /// Uncompressed file bytes.
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// Create an entry from any path-like string and byte payload.
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

/// Encode and decode whole archives held in memory.
///
/// Implementations must be deterministic: writing the same entries in the
/// same order yields an archive that reads back to the same entries in the
/// same order.
pub trait ArchiveCodec {
    /// Decode every file entry of `bytes`, in archive order.
    ///
    /// # Errors
    /// Returns [`ArchiveError`] when the container or an entry is unreadable.
    fn read(&self, bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError>;

    /// Encode `entries` into a new archive, preserving their order.
    ///
    /// # Errors
    /// Returns [`ArchiveError`] when an entry cannot be written.
    fn write(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError>;
}
