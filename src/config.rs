//! Merger configuration (`mcmerge.toml`).
//!
//! Defines the typed configuration for the optional `mcmerge.toml`: the
//! default manifest header, export settings, and path-keyed conflict
//! resolution rules. Command-line flags override every value here.
//!
//! ```toml
//! [manifest]
//! name = "Survival Plus"
//! description = "Furniture and mobs"
//! version = "1.2.0"
//!
//! [export]
//! format = "mcpack"
//! output_dir = "dist"
//!
//! [[resolve]]
//! path = "textures/blocks/stone.png"
//! strategy = "manual"
//! addon = "Better Stone"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::export::ExportFormat;
use crate::model::addon::LoadedAddon;
use crate::model::conflict::{FileConflict, Resolution};
use crate::model::manifest::{AddonManifest, Version};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "mcmerge.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level merger configuration.
///
/// Missing fields use defaults. Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergerConfig {
    /// Header of the generated manifest.
    #[serde(default)]
    pub manifest: ManifestConfig,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,

    /// Conflict resolution rules, applied in order.
    #[serde(default)]
    pub resolve: Vec<ResolveRule>,
}

// ---------------------------------------------------------------------------
// ManifestConfig
// ---------------------------------------------------------------------------

/// Defaults for the generated manifest header.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    /// Pack name (default: `"Merged Addon"`).
    #[serde(default = "default_name")]
    pub name: String,

    /// Pack description.
    #[serde(default = "default_description")]
    pub description: String,

    /// Pack version, as `"1.0.0"` or `[1, 0, 0]` (default: `1.0.0`).
    #[serde(default = "default_version")]
    pub version: Version,

    /// Minimum engine version (default: `1.20.0`).
    #[serde(default = "default_min_engine_version")]
    pub min_engine_version: Version,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: default_description(),
            version: default_version(),
            min_engine_version: default_min_engine_version(),
        }
    }
}

impl ManifestConfig {
    /// Generate a fresh manifest for `addons` with these header defaults.
    #[must_use]
    pub fn generate(&self, addons: &[LoadedAddon]) -> AddonManifest {
        let mut manifest =
            AddonManifest::generate(&self.name, &self.description, self.version, addons);
        manifest.header.min_engine_version = Some(self.min_engine_version);
        manifest
    }
}

fn default_name() -> String {
    "Merged Addon".to_owned()
}

fn default_description() -> String {
    "Combined addon created with Minecraft Addon Merger".to_owned()
}

const fn default_version() -> Version {
    Version::new(1, 0, 0)
}

const fn default_min_engine_version() -> Version {
    AddonManifest::MIN_ENGINE_VERSION
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

/// Export settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Output container (default: `mcaddon`).
    #[serde(default)]
    pub format: ExportFormat,

    /// Directory the artifact is written to (default: `.`).
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: ExportFormat::default(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

// ---------------------------------------------------------------------------
// ResolveRule
// ---------------------------------------------------------------------------

/// Which side a rule keeps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleStrategy {
    /// Keep the first addon's version.
    KeepFirst,
    /// Keep the last addon's version.
    KeepLast,
    /// Keep the version of the addon named by [`ResolveRule::addon`].
    Manual,
}

impl fmt::Display for RuleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepFirst => write!(f, "keep-first"),
            Self::KeepLast => write!(f, "keep-last"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// A resolution for one conflicted path.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolveRule {
    /// Conflicted path, exactly as listed by `mcmerge conflicts`.
    pub path: String,

    /// Which side to keep.
    pub strategy: RuleStrategy,

    /// Addon display name or archive file name, for `manual`.
    #[serde(default)]
    pub addon: Option<String>,
}

impl ResolveRule {
    /// Translate the rule into a [`Resolution`] for `conflict`.
    ///
    /// Returns `None` when a `manual` rule names an addon that has no side
    /// in the conflict. A `manual` rule without an addon yields
    /// `Manual(None)` (first side kept).
    #[must_use]
    pub fn resolution_for(
        &self,
        conflict: &FileConflict,
        addons: &[LoadedAddon],
    ) -> Option<Resolution> {
        match (self.strategy, &self.addon) {
            (RuleStrategy::KeepFirst, _) => Some(Resolution::KeepFirst),
            (RuleStrategy::KeepLast, _) => Some(Resolution::KeepLast),
            (RuleStrategy::Manual, None) => Some(Resolution::Manual(None)),
            (RuleStrategy::Manual, Some(wanted)) => conflict
                .sides
                .iter()
                .find(|side| {
                    side.addon_name == *wanted
                        || addons
                            .iter()
                            .any(|a| a.id == side.addon_id && a.original_file_name == *wanted)
                })
                .map(|side| Resolution::Manual(Some(side.addon_id.clone()))),
        }
    }
}

impl fmt::Display for ResolveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.addon {
            Some(addon) => write!(f, "{}={} ({addon})", self.path, self.strategy),
            None => write!(f, "{}={}", self.path, self.strategy),
        }
    }
}

impl FromStr for ResolveRule {
    type Err = ConfigError;

    /// Parse `PATH=keep-first`, `PATH=keep-last`, `PATH=manual`, or
    /// `PATH=ADDON` (manual, keeping that addon's version).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((path, rule)) = s.rsplit_once('=') else {
            return Err(ConfigError {
                path: None,
                message: format!("invalid rule '{s}': expected PATH=RULE"),
            });
        };
        let (path, rule) = (path.trim(), rule.trim());
        if path.is_empty() || rule.is_empty() {
            return Err(ConfigError {
                path: None,
                message: format!("invalid rule '{s}': path and rule must be non-empty"),
            });
        }

        let (strategy, addon) = match Resolution::from_str(rule) {
            Ok(Resolution::KeepFirst) => (RuleStrategy::KeepFirst, None),
            Ok(Resolution::KeepLast) => (RuleStrategy::KeepLast, None),
            Ok(Resolution::Manual(_)) => (RuleStrategy::Manual, None),
            Err(_) => (RuleStrategy::Manual, Some(rule.to_owned())),
        };
        Ok(Self {
            path: path.to_owned(),
            strategy,
            addon,
        })
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a merger configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl MergerConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML or unknown fields,
    ///   returns a [`ConfigError`] with line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
