//! Loaded addon types: identity, pack type, files and their payloads.
//!
//! A [`LoadedAddon`] is what the loader hands the merge engine: a flat,
//! ordered list of [`AddonFile`]s with normalized paths, plus the parsed
//! manifest when one was readable. The merge engine only ever reads these.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::manifest::AddonManifest;

// ---------------------------------------------------------------------------
// AddonId
// ---------------------------------------------------------------------------

/// Opaque unique identifier for a loaded addon.
///
/// Generated as a UUID v4 when an archive is loaded. Tests and callers that
/// need stable identities can build one from any non-empty string.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddonId(String);

impl AddonId {
    /// Wrap an existing identifier string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Return the identifier as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PackType
// ---------------------------------------------------------------------------

/// Which half of the Bedrock add-on system a package belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackType {
    /// Behavior pack: entities, functions, loot tables, scripts.
    Behavior,
    /// Resource pack: textures, models, sounds, animations.
    Resource,
    /// Both kinds of content, or neither could be recognized.
    #[default]
    Mixed,
}

impl PackType {
    /// Subpaths whose presence marks behavior content.
    pub const BEHAVIOR_MARKERS: &'static [&'static str] =
        &["functions/", "scripts/", "entities/", "loot_tables/"];

    /// Subpaths whose presence marks resource content.
    pub const RESOURCE_MARKERS: &'static [&'static str] =
        &["textures/", "models/", "sounds/", "animations/"];

    /// Infer the pack type from a set of file paths.
    ///
    /// Behavior-only markers give [`PackType::Behavior`], resource-only give
    /// [`PackType::Resource`]; both or neither give [`PackType::Mixed`].
    pub fn infer<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut behavior = false;
        let mut resource = false;
        for path in paths {
            behavior |= Self::BEHAVIOR_MARKERS.iter().any(|m| path.contains(m));
            resource |= Self::RESOURCE_MARKERS.iter().any(|m| path.contains(m));
        }
        match (behavior, resource) {
            (true, false) => Self::Behavior,
            (false, true) => Self::Resource,
            _ => Self::Mixed,
        }
    }

    /// Returns `true` if this pack carries behavior content.
    #[must_use]
    pub const fn has_behavior(self) -> bool {
        matches!(self, Self::Behavior | Self::Mixed)
    }

    /// Returns `true` if this pack carries resource content.
    #[must_use]
    pub const fn has_resources(self) -> bool {
        matches!(self, Self::Resource | Self::Mixed)
    }
}

impl fmt::Display for PackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Behavior => write!(f, "behavior"),
            Self::Resource => write!(f, "resource"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

// ---------------------------------------------------------------------------
// FileContent
// ---------------------------------------------------------------------------

/// File payload: decoded text or raw bytes.
///
/// Which variant a file gets is decided by its extension alone (see
/// [`crate::loader::is_text_path`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileContent {
    /// A text file decoded as UTF-8.
    Text(String),
    /// Any other file, kept byte for byte.
    Binary(Vec<u8>),
}

impl FileContent {
    /// Returns `true` for [`FileContent::Text`].
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Borrow the text, if this is a text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Binary(_) => None,
        }
    }

    /// The payload as bytes, suitable for writing into an archive.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::Binary(b) => b,
        }
    }

    /// Payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}

// ---------------------------------------------------------------------------
// AddonFile
// ---------------------------------------------------------------------------

/// A single file inside an addon, keyed by its normalized relative path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddonFile {
    /// Forward-slash relative path, unique within its addon.
    pub path: String,
    /// Text or binary payload.
    pub content: FileContent,
}

impl AddonFile {
    /// Create a file from a path and any payload convertible to [`FileContent`].
    pub fn new(path: impl Into<String>, content: impl Into<FileContent>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Returns `true` if the payload is text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        self.content.is_text()
    }
}

// ---------------------------------------------------------------------------
// LoadedAddon
// ---------------------------------------------------------------------------

/// One successfully parsed input archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedAddon {
    /// Unique identifier for this load.
    pub id: AddonId,
    /// Display name: the manifest header name, else derived from the file name.
    pub name: String,
    /// Inferred pack type.
    pub pack_type: PackType,
    /// Files in archive order.
    pub files: Vec<AddonFile>,
    /// Parsed manifest, if one was present and readable.
    pub manifest: Option<AddonManifest>,
    /// Name of the archive the addon was loaded from.
    pub original_file_name: String,
}

impl LoadedAddon {
    /// Build an addon from its parts, inferring the pack type from `files`.
    ///
    /// The display name comes from the manifest header when present.
    pub fn new(
        id: AddonId,
        original_file_name: impl Into<String>,
        files: Vec<AddonFile>,
        manifest: Option<AddonManifest>,
    ) -> Self {
        let original_file_name = original_file_name.into();
        let pack_type = PackType::infer(files.iter().map(|f| f.path.as_str()));
        let name = manifest
            .as_ref()
            .map(|m| m.header.name.trim())
            .filter(|n| !n.is_empty())
            .map_or_else(|| display_name_from_file(&original_file_name), str::to_owned);
        Self {
            id,
            name,
            pack_type,
            files,
            manifest,
            original_file_name,
        }
    }

    /// Look up a file by exact path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&AddonFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Derive a display name from an archive file name by removing a trailing
/// `.mcaddon`, `.mcpack` or `.zip` extension.
#[must_use]
pub fn display_name_from_file(file_name: &str) -> String {
    for ext in [".mcaddon", ".mcpack", ".zip"] {
        if let Some(stem) = file_name.strip_suffix(ext) {
            return stem.to_owned();
        }
    }
    file_name.to_owned()
}
