//! Archive loader: raw archive bytes in, [`LoadedAddon`] out.
//!
//! Entry paths come out of the codec already `/`-separated. The loader then
//! strips a single wrapping folder when every entry shares it, decodes text
//! files, and parses `manifest.json` (the last readable one wins).
//!
//! A batch load never stops at a bad file: [`load_all`] reports each failure
//! and keeps going.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use mcmerge_archive::{ArchiveCodec, ArchiveError, strip_common_root};
use tracing::{debug, info, instrument, warn};

use crate::error::MergerError;
use crate::merge::MANIFEST_PATH;
use crate::model::addon::{AddonFile, AddonId, FileContent, LoadedAddon};
use crate::model::manifest::AddonManifest;

/// Extensions (without the dot) whose files are decoded as text.
pub const TEXT_EXTENSIONS: &[&str] = &["json", "js", "mcfunction", "lang", "txt", "md", "mcmeta"];

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Returns `true` if files at `path` are treated as text.
///
/// The extension is whatever follows the last `.`, so dot-files such as
/// `texts/.lang` count as text too.
#[must_use]
pub fn is_text_path(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| TEXT_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(ext)))
}

// ---------------------------------------------------------------------------
// Inputs and errors
// ---------------------------------------------------------------------------

/// One uploaded archive: its file name and raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveInput {
    /// File name as uploaded, e.g. `Furniture.mcaddon`.
    pub file_name: String,
    /// Raw archive bytes.
    pub bytes: Vec<u8>,
}

impl ArchiveInput {
    /// Create an input from a name and bytes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read an archive from disk, naming it after the path's file name.
    ///
    /// # Errors
    /// Returns [`MergerError::Io`] when the file cannot be read.
    pub fn read(path: &Path) -> Result<Self, MergerError> {
        let bytes = std::fs::read(path).map_err(|source| MergerError::Io {
            path: path.to_owned(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { file_name, bytes })
    }
}

/// Why one archive could not be loaded.
#[derive(Debug)]
pub enum LoadError {
    /// The archive container could not be decoded.
    Archive {
        /// Uploaded file name.
        file: String,
        /// Decoder error.
        source: ArchiveError,
    },
    /// The archive decoded but holds no files.
    Empty {
        /// Uploaded file name.
        file: String,
    },
}

impl LoadError {
    /// The uploaded file name this error is about.
    #[must_use]
    pub fn file(&self) -> &str {
        match self {
            Self::Archive { file, .. } | Self::Empty { file } => file,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive { file, source } => write!(
                f,
                "failed to read '{file}': {source}\n  To fix: check that the file is a valid .mcaddon, .mcpack or .zip archive."
            ),
            Self::Empty { file } => write!(
                f,
                "'{file}' contains no files.\n  To fix: re-export the addon and try again."
            ),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Archive { source, .. } => Some(source),
            Self::Empty { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Decode text, dropping a leading byte-order mark. Invalid UTF-8 sequences
/// become U+FFFD.
fn decode_text(data: &[u8]) -> String {
    let text = String::from_utf8_lossy(data).into_owned();
    match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => rest.to_owned(),
        None => text,
    }
}

/// Load one archive into a [`LoadedAddon`] with a fresh id.
///
/// # Errors
/// [`LoadError::Archive`] when the codec rejects the bytes,
/// [`LoadError::Empty`] when there are no file entries.
#[instrument(skip(bytes, codec), fields(bytes = bytes.len()))]
pub fn load_addon(
    file_name: &str,
    bytes: &[u8],
    codec: &dyn ArchiveCodec,
) -> Result<LoadedAddon, LoadError> {
    let entries = codec.read(bytes).map_err(|source| LoadError::Archive {
        file: file_name.to_owned(),
        source,
    })?;
    if entries.is_empty() {
        return Err(LoadError::Empty {
            file: file_name.to_owned(),
        });
    }

    let root = strip_common_root(&entries.iter().map(|e| e.path.as_str()).collect::<Vec<_>>());
    if let Some(root) = &root {
        debug!(root = %root, "stripping common root folder");
    }

    let mut files: Vec<AddonFile> = Vec::with_capacity(entries.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut manifest = None;

    for entry in entries {
        let relative = entry.path.trim_start_matches('/');
        let path = root
            .as_deref()
            .and_then(|root| relative.strip_prefix(root))
            .unwrap_or(relative)
            .to_owned();
        if path.is_empty() {
            continue;
        }

        let content = if is_text_path(&path) {
            FileContent::Text(decode_text(&entry.data))
        } else {
            FileContent::Binary(entry.data)
        };

        if path.ends_with(MANIFEST_PATH)
            && let Some(text) = content.as_text()
        {
            match AddonManifest::from_json(text) {
                Ok(parsed) => manifest = Some(parsed),
                Err(e) => warn!(file = file_name, path = %path, error = %e, "unreadable manifest"),
            }
        }

        // Duplicate entries: the later one wins, in the earlier position.
        if let Some(&at) = index.get(&path) {
            files[at].content = content;
        } else {
            index.insert(path.clone(), files.len());
            files.push(AddonFile { path, content });
        }
    }

    let addon = LoadedAddon::new(AddonId::generate(), file_name, files, manifest);
    info!(
        name = %addon.name,
        pack_type = %addon.pack_type,
        files = addon.files.len(),
        has_manifest = addon.manifest.is_some(),
        "loaded addon"
    );
    Ok(addon)
}

/// A batch load: every addon that loaded, every file that did not.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Successfully loaded addons, in input order.
    pub addons: Vec<LoadedAddon>,
    /// One entry per input that failed.
    pub failures: Vec<LoadError>,
}

/// Load every input, in order. Failures are collected, never fatal.
pub fn load_all<'a>(
    inputs: impl IntoIterator<Item = &'a ArchiveInput>,
    codec: &dyn ArchiveCodec,
) -> LoadReport {
    let mut report = LoadReport::default();
    for input in inputs {
        match load_addon(&input.file_name, &input.bytes, codec) {
            Ok(addon) => report.addons.push(addon),
            Err(e) => {
                warn!(file = %input.file_name, error = %e, "failed to load archive");
                report.failures.push(e);
            }
        }
    }
    report
}
