//! Exporter: turns a [`MergeResult`] into a downloadable artifact.
//!
//! The three archive formats share one encoding and differ only in the
//! suggested extension. `folder` is a pretty-printed JSON dump of the
//! manifest and file list, for inspection rather than installation.

use std::fmt;
use std::path::{Path, PathBuf};

use mcmerge_archive::{ArchiveCodec, ArchiveEntry, ArchiveError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MergerError;
use crate::merge::MergeResult;
use crate::model::addon::FileContent;
use crate::model::manifest::AddonManifest;

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

/// Output container.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Complete addon bundle (`.mcaddon`).
    #[default]
    #[value(name = "mcaddon")]
    McAddon,
    /// Single pack bundle (`.mcpack`).
    #[value(name = "mcpack")]
    McPack,
    /// Generic archive (`.zip`).
    Zip,
    /// JSON dump of the manifest and file list (`_structure.json`).
    Folder,
}

impl ExportFormat {
    /// File name suffix for this format, including the dot or underscore.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::McAddon => ".mcaddon",
            Self::McPack => ".mcpack",
            Self::Zip => ".zip",
            Self::Folder => "_structure.json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::McAddon => write!(f, "mcaddon"),
            Self::McPack => write!(f, "mcpack"),
            Self::Zip => write!(f, "zip"),
            Self::Folder => write!(f, "folder"),
        }
    }
}

// ---------------------------------------------------------------------------
// ExportError
// ---------------------------------------------------------------------------

/// Failure to encode an artifact.
#[derive(Debug)]
pub enum ExportError {
    /// The archive codec could not write the files.
    Archive(ArchiveError),
    /// The folder dump could not be serialized.
    Json(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive(e) => write!(
                f,
                "failed to build archive: {e}\n  To fix: retry, or export with --format folder to inspect the merged files."
            ),
            Self::Json(e) => write!(f, "failed to serialize folder export: {e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Archive(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<ArchiveError> for ExportError {
    fn from(err: ArchiveError) -> Self {
        Self::Archive(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// Encoded output plus the file name to save it under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name: sanitized manifest name plus format suffix.
    pub file_name: String,
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Format the bytes are in.
    pub format: ExportFormat,
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

#[derive(Serialize)]
struct FolderDump<'a> {
    manifest: &'a AddonManifest,
    files: Vec<FolderEntry<'a>>,
}

#[derive(Serialize)]
struct FolderEntry<'a> {
    path: &'a str,
    content: String,
}

/// Encode `result` in `format`.
///
/// # Errors
/// Returns [`ExportError`] when the codec or JSON serializer fails.
pub fn export(
    result: &MergeResult,
    format: ExportFormat,
    codec: &dyn ArchiveCodec,
) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Folder => {
            let dump = FolderDump {
                manifest: &result.manifest,
                files: result
                    .files
                    .iter()
                    .map(|f| FolderEntry {
                        path: &f.path,
                        content: match &f.content {
                            FileContent::Text(text) => text.clone(),
                            FileContent::Binary(_) => format!("[Binary file: {}]", f.path),
                        },
                    })
                    .collect(),
            };
            serde_json::to_vec_pretty(&dump)?
        }
        ExportFormat::McAddon | ExportFormat::McPack | ExportFormat::Zip => {
            let entries: Vec<ArchiveEntry> = result
                .files
                .iter()
                .map(|f| ArchiveEntry::new(f.path.clone(), f.content.as_bytes().to_vec()))
                .collect();
            codec.write(&entries)?
        }
    };

    let file_name = format!(
        "{}{}",
        sanitize_name(&result.manifest.header.name),
        format.suffix()
    );
    info!(file = %file_name, %format, bytes = bytes.len(), "exported");
    Ok(ExportArtifact {
        file_name,
        bytes,
        format,
    })
}

/// Write an artifact into `dir` under its suggested name.
///
/// # Errors
/// Returns [`MergerError::Io`] when the directory or file cannot be written.
pub fn write_artifact(artifact: &ExportArtifact, dir: &Path) -> Result<PathBuf, MergerError> {
    let io_err = |path: &Path| {
        let path = path.to_owned();
        move |source| MergerError::Io { path, source }
    };
    std::fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(&artifact.file_name);
    std::fs::write(&path, &artifact.bytes).map_err(io_err(&path))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::model::addon::AddonFile;
    use crate::model::manifest::Version;

    /// Codec that writes entry paths, one per line.
    struct ListingCodec;

    impl ArchiveCodec for ListingCodec {
        fn read(&self, _bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
            Ok(Vec::new())
        }

        fn write(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ArchiveError> {
            let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
            Ok(paths.join("\n").into_bytes())
        }
    }

    fn result() -> MergeResult {
        let manifest =
            AddonManifest::generate("My Cool Pack!", "d", Version::new(1, 0, 0), &[]);
        MergeResult {
            files: vec![
                AddonFile::new("texts/en_US.lang", "a=b"),
                AddonFile::new("textures/a.png", vec![1u8, 2]),
            ],
            manifest,
            logs: vec![],
            conflicts: vec![],
        }
    }

    #[test]
    fn sanitize_replaces_everything_but_ascii_alphanumerics() {
        assert_eq!(sanitize_name("My Cool Pack!"), "My_Cool_Pack_");
        assert_eq!(sanitize_name("Café-2"), "Caf__2");
        assert_eq!(sanitize_name(""), "");
    }

    #[test]
    fn archive_formats_differ_only_in_extension() {
        let names: Vec<_> = [ExportFormat::McAddon, ExportFormat::McPack, ExportFormat::Zip]
            .into_iter()
            .map(|format| {
                let artifact = export(&result(), format, &ListingCodec).unwrap();
                assert_eq!(artifact.bytes, b"texts/en_US.lang\ntextures/a.png");
                artifact.file_name
            })
            .collect();
        assert_eq!(names, ["My_Cool_Pack_.mcaddon", "My_Cool_Pack_.mcpack", "My_Cool_Pack_.zip"]);
    }

    #[test]
    fn folder_dump_uses_binary_placeholder() {
        let artifact = export(&result(), ExportFormat::Folder, &ListingCodec).unwrap();
        assert_eq!(artifact.file_name, "My_Cool_Pack__structure.json");
        let dump: Value = serde_json::from_slice(&artifact.bytes).unwrap();
        assert_eq!(dump["manifest"]["header"]["name"], "My Cool Pack!");
        assert_eq!(dump["files"][0]["content"], "a=b");
        assert_eq!(dump["files"][1]["content"], "[Binary file: textures/a.png]");
    }

    #[test]
    fn write_artifact_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/out");
        let artifact = export(&result(), ExportFormat::Zip, &ListingCodec).unwrap();
        let path = write_artifact(&artifact, &out).unwrap();
        assert_eq!(path, out.join("My_Cool_Pack_.zip"));
        assert_eq!(std::fs::read(path).unwrap(), artifact.bytes);
    }

    #[test]
    fn format_names_round_trip_through_config_syntax() {
        let parsed: ExportFormat = serde_json::from_str("\"mcaddon\"").unwrap();
        assert_eq!(parsed, ExportFormat::McAddon);
    }
}
