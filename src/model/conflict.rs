//! Path conflicts between addons and the user's resolution choices.
//!
//! A [`FileConflict`] is produced by the conflict detector for every path
//! present in two or more addons. Its [`Resolution`] only matters when no
//! content-merge strategy claims the path (binary assets, in practice).

use std::fmt;
use std::str::FromStr;

use super::addon::{AddonId, FileContent};

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// How to pick one side of a conflict that cannot be content-merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Keep the version from the first addon that has the path.
    KeepFirst,
    /// Keep the version from the last addon that has the path.
    #[default]
    KeepLast,
    /// Keep the version from a user-selected addon. `None` means the user
    /// chose manual resolution but never picked an addon; the first side is
    /// used in that case.
    Manual(Option<AddonId>),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepFirst => write!(f, "keep-first"),
            Self::KeepLast => write!(f, "keep-last"),
            Self::Manual(Some(id)) => write!(f, "manual({id})"),
            Self::Manual(None) => write!(f, "manual"),
        }
    }
}

/// Error parsing a [`Resolution`] keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResolutionError(String);

impl fmt::Display for ParseResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid resolution '{}'. Use: keep-first, keep-last, or manual",
            self.0
        )
    }
}

impl std::error::Error for ParseResolutionError {}

impl FromStr for Resolution {
    type Err = ParseResolutionError;

    /// Parse `keep-first`, `keep-last` or `manual` (no addon selected).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep-first" | "first" => Ok(Self::KeepFirst),
            "keep-last" | "last" => Ok(Self::KeepLast),
            "manual" => Ok(Self::Manual(None)),
            _ => Err(ParseResolutionError(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// ConflictSide
// ---------------------------------------------------------------------------

/// One addon's version of a conflicted path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConflictSide {
    /// Addon that contributed this side.
    pub addon_id: AddonId,
    /// Display name of that addon.
    pub addon_name: String,
    /// That addon's content for the path.
    pub content: FileContent,
}

// ---------------------------------------------------------------------------
// FileConflict
// ---------------------------------------------------------------------------

/// A path present in two or more addons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileConflict {
    /// Normalized path shared by every side.
    pub path: String,
    /// One side per contributing addon, in addon-load order.
    pub sides: Vec<ConflictSide>,
    /// Caller-supplied choice. `None` means unset: the side of the first
    /// addon to reach the path is kept.
    pub resolution: Option<Resolution>,
}

impl FileConflict {
    /// Create a conflict with the default `keep-last` resolution.
    pub fn new(path: impl Into<String>, sides: Vec<ConflictSide>) -> Self {
        Self {
            path: path.into(),
            sides,
            resolution: Some(Resolution::default()),
        }
    }

    /// Names of the contributing addons, in load order.
    #[must_use]
    pub fn addon_names(&self) -> Vec<&str> {
        self.sides.iter().map(|s| s.addon_name.as_str()).collect()
    }

    /// Returns `true` when every side is text, so the merge combines the
    /// sides by content and never consults the resolution.
    #[must_use]
    pub fn is_content_merged(&self) -> bool {
        !self.sides.is_empty() && self.sides.iter().all(|s| s.content.is_text())
    }

    /// The side selected by the current resolution.
    ///
    /// A manual selection naming an addon that has no side here falls back
    /// to the first side, same as a manual choice with no addon at all.
    /// Returns `None` only when the conflict has no sides.
    #[must_use]
    pub fn selected_side(&self) -> Option<&ConflictSide> {
        match &self.resolution {
            Some(Resolution::KeepLast) => self.sides.last(),
            Some(Resolution::Manual(Some(id))) => self
                .sides
                .iter()
                .find(|s| &s.addon_id == id)
                .or_else(|| self.sides.first()),
            Some(Resolution::KeepFirst | Resolution::Manual(None)) | None => self.sides.first(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side(id: &str, content: &str) -> ConflictSide {
        ConflictSide {
            addon_id: AddonId::new(id),
            addon_name: format!("Addon {id}"),
            content: FileContent::from(content),
        }
    }

    fn conflict(resolution: Option<Resolution>) -> FileConflict {
        FileConflict {
            path: "textures/a.png".to_owned(),
            sides: vec![side("a", "first"), side("b", "middle"), side("c", "last")],
            resolution,
        }
    }

    fn selected(c: &FileConflict) -> &str {
        c.selected_side().unwrap().content.as_text().unwrap()
    }

    #[test]
    fn default_resolution_is_keep_last() {
        let c = FileConflict::new("x", vec![]);
        assert_eq!(c.resolution, Some(Resolution::KeepLast));
    }

    #[test]
    fn keep_first_and_keep_last() {
        assert_eq!(selected(&conflict(Some(Resolution::KeepFirst))), "first");
        assert_eq!(selected(&conflict(Some(Resolution::KeepLast))), "last");
    }

    #[test]
    fn manual_picks_selected_addon() {
        let c = conflict(Some(Resolution::Manual(Some(AddonId::new("b")))));
        assert_eq!(selected(&c), "middle");
    }

    #[test]
    fn manual_without_selection_falls_back_to_first() {
        assert_eq!(selected(&conflict(Some(Resolution::Manual(None)))), "first");
        let unknown = conflict(Some(Resolution::Manual(Some(AddonId::new("zzz")))));
        assert_eq!(selected(&unknown), "first");
    }

    #[test]
    fn unset_keeps_first() {
        assert_eq!(selected(&conflict(None)), "first");
    }

    #[test]
    fn parse_resolution_keywords() {
        assert_eq!("keep-first".parse(), Ok(Resolution::KeepFirst));
        assert_eq!("KEEP-LAST".parse(), Ok(Resolution::KeepLast));
        assert_eq!("manual".parse(), Ok(Resolution::Manual(None)));
        assert!("newest".parse::<Resolution>().is_err());
    }

    #[test]
    fn resolution_display() {
        assert_eq!(Resolution::KeepFirst.to_string(), "keep-first");
        assert_eq!(Resolution::Manual(None).to_string(), "manual");
        assert_eq!(
            Resolution::Manual(Some(AddonId::new("b"))).to_string(),
            "manual(b)"
        );
    }

    #[test]
    fn addon_names_in_order() {
        assert_eq!(conflict(None).addon_names(), ["Addon a", "Addon b", "Addon c"]);
    }
}
