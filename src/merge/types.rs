//! Core types produced by the merge engine.

use crate::model::addon::AddonFile;
use crate::model::conflict::FileConflict;
use crate::model::manifest::AddonManifest;

/// Path of the manifest inside every pack.
pub const MANIFEST_PATH: &str = "manifest.json";

// ---------------------------------------------------------------------------
// MergeResult
// ---------------------------------------------------------------------------

/// The output of one merge invocation.
///
/// Produced fresh by [`crate::merge::merge_addons`] and never mutated
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeResult {
    /// Output files, unique by path, `manifest.json` last.
    pub files: Vec<AddonFile>,
    /// The reconciled manifest (also serialized into `files`).
    pub manifest: AddonManifest,
    /// One human-readable line per decision, in the order they were taken.
    pub logs: Vec<String>,
    /// The conflict set the merge was run with.
    pub conflicts: Vec<FileConflict>,
}

impl MergeResult {
    /// Look up an output file by path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&AddonFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Text of an output file, if present and textual.
    #[must_use]
    pub fn text(&self, path: &str) -> Option<&str> {
        self.file(path)?.content.as_text()
    }

    /// Number of output files, manifest included.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
