//! Filesystem error type for mcmerge.
//!
//! [`MergerError`] is returned by the library helpers that touch the disk:
//! [`ArchiveInput::read`](crate::loader::ArchiveInput::read) and
//! [`write_artifact`](crate::export::write_artifact). Every other stage has
//! its own error next to the code that raises it (`LoadError`,
//! `SessionError`, `ExportError`, `ConfigError`). Messages say what went
//! wrong and how to fix it.
//!
//! The merge engine itself has no error type. Merge-time problems degrade
//! locally and are recorded in the merge log.

use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// MergerError
// ---------------------------------------------------------------------------

/// Error from a library helper that reads or writes files.
#[derive(Debug)]
pub enum MergerError {
    /// A file could not be read or written.
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for MergerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(
                f,
                "I/O error on '{}': {source}\n  To fix: check that the path exists and is accessible.",
                path.display()
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// std::error::Error
// ---------------------------------------------------------------------------

impl std::error::Error for MergerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
