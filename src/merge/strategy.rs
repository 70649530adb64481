//! Content merge strategies and the path-pattern dispatch table.
//!
//! Every contested text path is matched against [`DISPATCH`] in order; the
//! first matching [`PathPattern`] selects the [`MergeStrategy`]. Binary
//! files never reach the table: they are resolved by picking one side (see
//! [`crate::model::conflict::Resolution`]).
//!
//! | Pattern                                       | Strategy             |
//! |-----------------------------------------------|----------------------|
//! | `*main.js`, `*_import.js`                     | [`ScriptUnion`]      |
//! | `*_ui_defs.json`                              | [`UiDefsUnion`]      |
//! | `ui/*.json`                                   | [`UiArrayUnion`]     |
//! | `*blocks.json`                                | [`Blocks`]           |
//! | `textures/item_texture.json`, `textures/terrain_texture.json` | [`TextureAtlas`] |
//! | `*.json`                                      | [`DeepJson`]         |
//! | `*.lang`, `*.txt`                             | [`LineUnionTrimmed`] |
//! | `*.js`                                        | [`LineUnion`]        |
//! | any other text                                | [`Concatenate`]      |
//!
//! The script pattern is a plain suffix match, so any file whose name ends
//! in `main.js` (`scripts/domain.js` included) joins the script union and
//! only reaches the output through the two canonical script paths.
//!
//! JSON strategies never fail: when any input does not parse, the outcome
//! falls back to the last input's raw content and says why.
//!
//! [`ScriptUnion`]: MergeStrategy::ScriptUnion
//! [`UiDefsUnion`]: MergeStrategy::UiDefsUnion
//! [`UiArrayUnion`]: MergeStrategy::UiArrayUnion
//! [`Blocks`]: MergeStrategy::Blocks
//! [`TextureAtlas`]: MergeStrategy::TextureAtlas
//! [`DeepJson`]: MergeStrategy::DeepJson
//! [`LineUnionTrimmed`]: MergeStrategy::LineUnionTrimmed
//! [`LineUnion`]: MergeStrategy::LineUnion
//! [`Concatenate`]: MergeStrategy::Concatenate

use std::fmt;

use serde_json::Value;

use super::json::{self, ArrayPolicy};
use super::text::{self, LineMode};

// ---------------------------------------------------------------------------
// Canonical output paths
// ---------------------------------------------------------------------------

/// Output path of the merged script entry point.
pub const SCRIPT_MAIN_PATH: &str = "scripts/main.js";
/// Output path of the merged script import list.
pub const SCRIPT_IMPORT_PATH: &str = "scripts/_import.js";
/// Output path of the merged UI definition list.
pub const UI_DEFS_PATH: &str = "ui/_ui_defs.json";

// ---------------------------------------------------------------------------
// PathPattern
// ---------------------------------------------------------------------------

/// A path predicate in the dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathPattern {
    /// Path ends with any of the suffixes.
    AnySuffix(&'static [&'static str]),
    /// Path equals any of the given paths.
    Exact(&'static [&'static str]),
    /// Path starts with `prefix` and ends with `suffix`.
    PrefixSuffix {
        /// Required leading segment(s).
        prefix: &'static str,
        /// Required extension or tail.
        suffix: &'static str,
    },
    /// Matches every path.
    Any,
}

impl PathPattern {
    /// Returns `true` if `path` satisfies this pattern.
    #[must_use]
    pub fn matches(self, path: &str) -> bool {
        match self {
            Self::AnySuffix(suffixes) => suffixes.iter().any(|s| path.ends_with(s)),
            Self::Exact(paths) => paths.contains(&path),
            Self::PrefixSuffix { prefix, suffix } => {
                path.starts_with(prefix) && path.ends_with(suffix)
            }
            Self::Any => true,
        }
    }
}

// ---------------------------------------------------------------------------
// MergeStrategy
// ---------------------------------------------------------------------------

/// A content merge algorithm for one family of files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MergeStrategy {
    /// Union of script lines across all addons, written to both script
    /// entry paths.
    ScriptUnion,
    /// Union of `ui_defs` entries across all addons.
    UiDefsUnion,
    /// Deep JSON merge with array union, for UI screens.
    UiArrayUnion,
    /// Block definitions: first geometry wins, legacy keys dropped.
    Blocks,
    /// Texture atlases: shallow union of `texture_data`.
    TextureAtlas,
    /// Deep JSON merge, later leaves win, arrays replaced.
    DeepJson,
    /// Trimmed line union without blank lines.
    LineUnionTrimmed,
    /// Verbatim line union.
    LineUnion,
    /// Newline-joined concatenation.
    Concatenate,
}

/// The dispatch table, in precedence order. First match wins.
pub const DISPATCH: &[(PathPattern, MergeStrategy)] = &[
    (
        PathPattern::AnySuffix(&["main.js", "_import.js"]),
        MergeStrategy::ScriptUnion,
    ),
    (
        PathPattern::AnySuffix(&["_ui_defs.json"]),
        MergeStrategy::UiDefsUnion,
    ),
    (
        PathPattern::PrefixSuffix {
            prefix: "ui/",
            suffix: ".json",
        },
        MergeStrategy::UiArrayUnion,
    ),
    (
        PathPattern::AnySuffix(&["blocks.json"]),
        MergeStrategy::Blocks,
    ),
    (
        PathPattern::Exact(&["textures/item_texture.json", "textures/terrain_texture.json"]),
        MergeStrategy::TextureAtlas,
    ),
    (PathPattern::AnySuffix(&[".json"]), MergeStrategy::DeepJson),
    (
        PathPattern::AnySuffix(&[".lang", ".txt"]),
        MergeStrategy::LineUnionTrimmed,
    ),
    (PathPattern::AnySuffix(&[".js"]), MergeStrategy::LineUnion),
    (PathPattern::Any, MergeStrategy::Concatenate),
];

impl MergeStrategy {
    /// Select the strategy for a text path.
    ///
    /// Always returns a strategy: the table ends with a catch-all.
    #[must_use]
    pub fn for_path(path: &str) -> Self {
        DISPATCH
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map_or(Self::Concatenate, |(_, strategy)| *strategy)
    }

    /// Returns `true` for strategies that gather their inputs from every
    /// addon up front rather than only when a path is contested.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self, Self::ScriptUnion | Self::UiDefsUnion)
    }

    /// The global strategies, in dispatch-table order.
    pub fn globals() -> impl Iterator<Item = Self> {
        DISPATCH
            .iter()
            .map(|(_, strategy)| *strategy)
            .filter(|strategy| strategy.is_global())
    }

    /// Fixed output paths for global strategies; empty for strategies whose
    /// output keeps the input path.
    #[must_use]
    pub const fn canonical_paths(self) -> &'static [&'static str] {
        match self {
            Self::ScriptUnion => &[SCRIPT_MAIN_PATH, SCRIPT_IMPORT_PATH],
            Self::UiDefsUnion => &[UI_DEFS_PATH],
            _ => &[],
        }
    }

    /// Merge the contributions, in the order given.
    ///
    /// Never fails. For JSON strategies, a parse failure in any input
    /// yields the last input's content verbatim together with a
    /// [`MergeOutcome::fallback`] reason.
    #[must_use]
    pub fn apply(self, contributions: &[Contribution<'_>]) -> MergeOutcome {
        let texts = || contributions.iter().map(|c| c.content);
        match self {
            Self::ScriptUnion | Self::LineUnion => {
                MergeOutcome::merged(text::line_union(texts(), LineMode::Verbatim))
            }
            Self::LineUnionTrimmed => {
                MergeOutcome::merged(text::line_union(texts(), LineMode::Trimmed))
            }
            Self::Concatenate => MergeOutcome::merged(text::concatenate(texts())),
            Self::UiDefsUnion => merge_json(contributions, json::merge_ui_defs),
            Self::UiArrayUnion => merge_json(contributions, |docs| {
                json::merge_documents(docs, ArrayPolicy::Union)
            }),
            Self::Blocks => merge_json(contributions, json::merge_blocks),
            Self::TextureAtlas => merge_json(contributions, json::merge_texture_atlases),
            Self::DeepJson => merge_json(contributions, |docs| {
                json::merge_documents(docs, ArrayPolicy::Replace)
            }),
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScriptUnion => write!(f, "script union"),
            Self::UiDefsUnion => write!(f, "ui_defs union"),
            Self::UiArrayUnion => write!(f, "UI array-union merge"),
            Self::Blocks => write!(f, "blocks merge"),
            Self::TextureAtlas => write!(f, "texture merge"),
            Self::DeepJson => write!(f, "deep JSON merge"),
            Self::LineUnionTrimmed => write!(f, "line union"),
            Self::LineUnion => write!(f, "script line union"),
            Self::Concatenate => write!(f, "concatenation"),
        }
    }
}

// ---------------------------------------------------------------------------
// Contribution / MergeOutcome
// ---------------------------------------------------------------------------

/// One addon's text for a path being merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contribution<'a> {
    /// Display name of the contributing addon.
    pub addon_name: &'a str,
    /// Path inside that addon.
    pub path: &'a str,
    /// The file's text.
    pub content: &'a str,
}

/// Result of applying a [`MergeStrategy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Merged (or fallback) content.
    pub content: String,
    /// Why the strategy degraded to the last input verbatim, if it did.
    pub fallback: Option<String>,
}

impl MergeOutcome {
    const fn merged(content: String) -> Self {
        Self {
            content,
            fallback: None,
        }
    }

    /// Returns `true` if the strategy had to fall back.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Parse every contribution, merge, and pretty-print; or fall back.
fn merge_json(
    contributions: &[Contribution<'_>],
    merge: impl FnOnce(Vec<Value>) -> Value,
) -> MergeOutcome {
    let fallback = |reason: String| MergeOutcome {
        content: contributions
            .last()
            .map(|c| c.content.to_owned())
            .unwrap_or_default(),
        fallback: Some(reason),
    };

    let mut docs = Vec::with_capacity(contributions.len());
    for c in contributions {
        match serde_json::from_str::<Value>(c.content) {
            Ok(doc) => docs.push(doc),
            Err(e) => {
                return fallback(format!(
                    "failed to parse {} from {}: {e}",
                    c.path, c.addon_name
                ));
            }
        }
    }

    match serde_json::to_string_pretty(&merge(docs)) {
        Ok(content) => MergeOutcome::merged(content),
        Err(e) => fallback(format!("failed to serialize merged JSON: {e}")),
    }
}
