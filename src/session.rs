//! Session state: the loaded addons, their conflicts, the editable base
//! manifest and the latest merge.
//!
//! Every change to the addon set recomputes the conflicts and regenerates
//! the base manifest. Resolutions do not survive that: each recomputed
//! conflict starts at `keep-last` again. Callers holding path-keyed rules
//! re-apply them with [`Session::apply_resolutions`].

use std::fmt;

use mcmerge_archive::ArchiveCodec;
use tracing::{debug, info, warn};

use crate::config::{ManifestConfig, ResolveRule};
use crate::loader::{ArchiveInput, LoadError, load_all};
use crate::merge::{MergeResult, detect_conflicts, merge_addons};
use crate::model::addon::{AddonId, LoadedAddon};
use crate::model::conflict::{FileConflict, Resolution};
use crate::model::manifest::{AddonManifest, Version};

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors from session operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A merge or manifest edit was requested with no addons loaded.
    NoAddons,
    /// A conflict index past the end of the conflict list.
    ConflictOutOfRange {
        /// The index requested.
        index: usize,
        /// Number of conflicts.
        count: usize,
    },
    /// A manual resolution named an addon with no side in the conflict.
    AddonNotInConflict {
        /// The conflicted path.
        path: String,
        /// The addon requested.
        addon: AddonId,
    },
    /// A version string that is not `major.minor.patch`.
    InvalidVersion {
        /// The rejected string.
        value: String,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAddons => write!(
                f,
                "no addons loaded.\n  To fix: add at least one .mcaddon, .mcpack or .zip archive."
            ),
            Self::ConflictOutOfRange { index, count } => write!(
                f,
                "conflict #{index} does not exist ({count} conflict(s) detected).\n  To fix: list conflicts first:\n    mcmerge conflicts <archives>..."
            ),
            Self::AddonNotInConflict { path, addon } => write!(
                f,
                "addon '{addon}' has no version of '{path}'.\n  To fix: pick one of the addons listed for this conflict."
            ),
            Self::InvalidVersion { value } => write!(
                f,
                "invalid version '{value}'.\n  To fix: use three dot-separated numbers, e.g. 1.0.0"
            ),
        }
    }
}

impl std::error::Error for SessionError {}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Transient state for one merge session.
#[derive(Debug, Default)]
pub struct Session {
    defaults: ManifestConfig,
    addons: Vec<LoadedAddon>,
    conflicts: Vec<FileConflict>,
    manifest: Option<AddonManifest>,
    result: Option<MergeResult>,
}

impl Session {
    /// Create an empty session whose generated manifests use `defaults`.
    #[must_use]
    pub fn new(defaults: ManifestConfig) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Loaded addons, in load order.
    #[must_use]
    pub fn addons(&self) -> &[LoadedAddon] {
        &self.addons
    }

    /// Current conflicts, in first-seen path order.
    #[must_use]
    pub fn conflicts(&self) -> &[FileConflict] {
        &self.conflicts
    }

    /// The editable base manifest; `None` while no addons are loaded.
    #[must_use]
    pub const fn manifest(&self) -> Option<&AddonManifest> {
        self.manifest.as_ref()
    }

    /// The latest merge, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&MergeResult> {
        self.result.as_ref()
    }

    /// Load archives and append the ones that load, in input order.
    ///
    /// Returns one error per archive that failed; the rest are still added.
    pub fn add_archives<'a>(
        &mut self,
        inputs: impl IntoIterator<Item = &'a ArchiveInput>,
        codec: &dyn ArchiveCodec,
    ) -> Vec<LoadError> {
        let report = load_all(inputs, codec);
        if !report.addons.is_empty() {
            self.addons.extend(report.addons);
            self.refresh();
        }
        report.failures
    }

    /// Append an already loaded addon.
    pub fn add_addon(&mut self, addon: LoadedAddon) {
        self.addons.push(addon);
        self.refresh();
    }

    /// Remove an addon by id. Returns `false` if no addon has that id.
    ///
    /// Discards the latest merge result.
    pub fn remove_addon(&mut self, id: &AddonId) -> bool {
        let before = self.addons.len();
        self.addons.retain(|a| &a.id != id);
        if self.addons.len() == before {
            return false;
        }
        self.result = None;
        self.refresh();
        true
    }

    /// Recompute conflicts and regenerate the base manifest.
    ///
    /// All resolutions reset to `keep-last`. With no addons, conflicts and
    /// manifest are cleared.
    pub fn refresh(&mut self) {
        if self.addons.is_empty() {
            self.conflicts.clear();
            self.manifest = None;
            return;
        }
        self.conflicts = detect_conflicts(&self.addons);
        self.manifest = Some(self.defaults.generate(&self.addons));
        debug!(
            addons = self.addons.len(),
            conflicts = self.conflicts.len(),
            "session refreshed"
        );
    }

    /// Set the resolution of the conflict at `index`.
    ///
    /// # Errors
    /// [`SessionError::ConflictOutOfRange`] for a bad index,
    /// [`SessionError::AddonNotInConflict`] for a manual choice naming an
    /// addon that has no side in this conflict.
    pub fn resolve_conflict(
        &mut self,
        index: usize,
        resolution: Resolution,
    ) -> Result<(), SessionError> {
        let count = self.conflicts.len();
        let conflict = self
            .conflicts
            .get_mut(index)
            .ok_or(SessionError::ConflictOutOfRange { index, count })?;
        if let Resolution::Manual(Some(id)) = &resolution
            && !conflict.sides.iter().any(|s| &s.addon_id == id)
        {
            return Err(SessionError::AddonNotInConflict {
                path: conflict.path.clone(),
                addon: id.clone(),
            });
        }
        debug!(path = %conflict.path, %resolution, "conflict resolved");
        conflict.resolution = Some(resolution);
        Ok(())
    }

    /// Apply path-keyed rules to the current conflicts, in order.
    ///
    /// Returns the rules that matched nothing: their path is not in
    /// conflict, the conflict is merged by content (every side is text),
    /// or a manual rule names an addon with no side there.
    pub fn apply_resolutions<'r>(&mut self, rules: &'r [ResolveRule]) -> Vec<&'r ResolveRule> {
        let mut unmatched = Vec::new();
        for rule in rules {
            let resolution = self
                .conflicts
                .iter()
                .position(|c| c.path == rule.path && !c.is_content_merged())
                .and_then(|at| Some((at, rule.resolution_for(&self.conflicts[at], &self.addons)?)));
            match resolution {
                Some((at, resolution)) => self.conflicts[at].resolution = Some(resolution),
                None => {
                    warn!(%rule, "resolution rule not applied");
                    unmatched.push(rule);
                }
            }
        }
        unmatched
    }

    /// Edit the base manifest header. `None` leaves a field unchanged.
    ///
    /// The version is validated before anything is applied.
    ///
    /// # Errors
    /// [`SessionError::NoAddons`] when there is no manifest to edit,
    /// [`SessionError::InvalidVersion`] when `version` does not parse.
    pub fn edit_manifest(
        &mut self,
        name: Option<&str>,
        description: Option<&str>,
        version: Option<&str>,
    ) -> Result<(), SessionError> {
        let version = version
            .map(|v| {
                Version::parse(v).ok_or_else(|| SessionError::InvalidVersion {
                    value: v.to_owned(),
                })
            })
            .transpose()?;
        let manifest = self.manifest.as_mut().ok_or(SessionError::NoAddons)?;
        if let Some(name) = name {
            manifest.header.name = name.to_owned();
        }
        if let Some(description) = description {
            manifest.header.description = description.to_owned();
        }
        if let Some(version) = version {
            manifest.header.version = version;
        }
        Ok(())
    }

    /// Merge the loaded addons with the current resolutions and manifest.
    ///
    /// # Errors
    /// [`SessionError::NoAddons`] when nothing is loaded.
    pub fn merge(&mut self) -> Result<&MergeResult, SessionError> {
        let manifest = self.manifest.as_ref().ok_or(SessionError::NoAddons)?;
        if self.addons.is_empty() {
            return Err(SessionError::NoAddons);
        }
        let result = merge_addons(&self.addons, &self.conflicts, manifest);
        info!(files = result.file_count(), "merge complete");
        Ok(self.result.insert(result))
    }
}
