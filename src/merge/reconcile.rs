//! Manifest reconciliation.
//!
//! Combines every addon's manifest modules and dependencies with a
//! caller-supplied base manifest into the single manifest written as the
//! merged pack's `manifest.json`.
//!
//! # Algorithm
//!
//! 1. Header, format version: taken from the base manifest unchanged.
//! 2. Modules: addons in load order, first module per distinct `type` wins;
//!    a kept `script` module gets its `entry` forced to `scripts/main.js`.
//! 3. Base manifest modules fill in any type still missing.
//! 4. Dependencies: addons in load order, de-duplicated by (uuid, version),
//!    first occurrence kept; base dependencies appended when not present.
//! 5. Dependencies whose `uuid` matches no final module `uuid` are dropped.
//!    An empty list is omitted entirely.

use std::collections::HashSet;

use tracing::debug;

use crate::model::addon::LoadedAddon;
use crate::model::manifest::{AddonManifest, ManifestDependency, ManifestModule};

use super::strategy::SCRIPT_MAIN_PATH;

/// Build the final manifest for a merge.
#[must_use]
pub fn reconcile_manifest(base: &AddonManifest, addons: &[LoadedAddon]) -> AddonManifest {
    let manifests = || addons.iter().filter_map(|a| a.manifest.as_ref());

    // Modules: first per type, addons before base.
    let mut seen_types: HashSet<&str> = HashSet::new();
    let mut modules: Vec<ManifestModule> = Vec::new();
    let addon_modules = manifests().flat_map(|m| m.modules.iter());
    for module in addon_modules.chain(base.modules.iter()) {
        if !seen_types.insert(module.module_type.as_str()) {
            continue;
        }
        let mut module = module.clone();
        if module.module_type == ManifestModule::SCRIPT {
            module.entry = Some(SCRIPT_MAIN_PATH.to_owned());
        }
        modules.push(module);
    }

    // Dependencies: first per (uuid, version), addons before base.
    let mut seen_deps = HashSet::new();
    let mut dependencies: Vec<ManifestDependency> = Vec::new();
    let addon_deps = manifests().flat_map(|m| m.dependencies.iter().flatten());
    let base_deps = base.dependencies.iter().flatten();
    for dep in addon_deps.chain(base_deps) {
        if seen_deps.insert(dep.key()) {
            dependencies.push(dep.clone());
        }
    }

    let module_uuids: HashSet<&str> = modules.iter().map(|m| m.uuid.as_str()).collect();
    let before = dependencies.len();
    dependencies.retain(|d| d.uuid.as_deref().is_some_and(|u| module_uuids.contains(u)));
    debug!(
        modules = modules.len(),
        dependencies = dependencies.len(),
        pruned = before - dependencies.len(),
        "reconciled manifest"
    );

    AddonManifest {
        format_version: base.format_version,
        header: base.header.clone(),
        modules,
        dependencies: (!dependencies.is_empty()).then_some(dependencies),
    }
}
