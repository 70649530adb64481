//! DETECT step: find paths shared by two or more addons.
//!
//! Builds an inverted index from path → contributing addons, then keeps the
//! paths with more than one contributor as [`FileConflict`]s.
//!
//! # Example
//!
//! ```text
//! Addon A: manifest.json, textures/a.png
//! Addon B: manifest.json, texts/en_US.lang
//!
//! Inverted index:
//!   manifest.json    → [A, B]
//!   textures/a.png   → [A]
//!   texts/en_US.lang → [B]
//!
//! Conflicts:
//!   manifest.json → [A, B]  (resolution: keep-last)
//! ```
//!
//! # Determinism
//!
//! Conflicts are emitted in first-seen path order (addons in load order,
//! then each addon's files in archive order), and sides within a conflict
//! are in addon-load order. Running detection twice on the same addon list
//! yields identical output.

use std::collections::HashMap;

use crate::model::addon::LoadedAddon;
use crate::model::conflict::{ConflictSide, FileConflict};

/// Detect every path present in two or more addons.
///
/// Directory markers (paths ending in `/`) are never conflicts. Every
/// returned conflict carries the default `keep-last` resolution; resolution
/// state is the caller's to apply afterwards.
#[must_use]
pub fn detect_conflicts(addons: &[LoadedAddon]) -> Vec<FileConflict> {
    let mut order: Vec<&str> = Vec::new();
    let mut index: HashMap<&str, Vec<ConflictSide>> = HashMap::new();

    for addon in addons {
        for file in &addon.files {
            let sides = index.entry(file.path.as_str()).or_insert_with(|| {
                order.push(file.path.as_str());
                Vec::new()
            });
            sides.push(ConflictSide {
                addon_id: addon.id.clone(),
                addon_name: addon.name.clone(),
                content: file.content.clone(),
            });
        }
    }

    order
        .into_iter()
        .filter(|path| !path.ends_with('/'))
        .filter_map(|path| {
            let sides = index.remove(path)?;
            (sides.len() > 1).then(|| FileConflict::new(path, sides))
        })
        .collect()
}
