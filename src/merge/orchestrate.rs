//! The merge orchestrator.
//!
//! One call, one pass, eight phases in a fixed order. Each phase reads the
//! addons and updates a single [`OutputBuilder`] owned by the call; nothing
//! outlives it.
//!
//! 1. Global script union (`*main.js`, `*_import.js`).
//! 2. Global `_ui_defs.json` union.
//! 3. UI array-union for `ui/*.json` paths shared by two or more addons.
//! 4. Per-path pass: contested paths are content-merged or resolved, the
//!    rest are copied verbatim.
//! 5. Asset sweep (`textures/`, `sounds/`, `scripts/`).
//! 6. Material/model sweep (`materials/`, `models/`).
//! 7. Manifest reconciliation, written last as `manifest.json`.
//! 8. Summary log line.
//!
//! The sweeps only pick up paths phase 4 did not visit. With the current
//! phase order that never happens, so they are a safety net against future
//! phases that skip files.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info_span, warn};

use crate::model::addon::{AddonFile, FileContent, LoadedAddon};
use crate::model::conflict::FileConflict;
use crate::model::manifest::AddonManifest;

use super::reconcile::reconcile_manifest;
use super::strategy::{Contribution, MergeOutcome, MergeStrategy};
use super::types::{MANIFEST_PATH, MergeResult};

const ASSET_DIRS: &[&str] = &["textures", "sounds", "scripts"];
const MODEL_DIRS: &[&str] = &["materials", "models"];

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Merge `addons` (in load order) into one pack.
///
/// `conflicts` drives phase 4: a path listed there is content-merged when a
/// text strategy applies, otherwise the side picked by its resolution is
/// kept. `base_manifest` supplies the header of the output manifest.
///
/// Never fails. Every degradation is recorded in [`MergeResult::logs`].
#[must_use]
pub fn merge_addons(
    addons: &[LoadedAddon],
    conflicts: &[FileConflict],
    base_manifest: &AddonManifest,
) -> MergeResult {
    let span = info_span!("merge", addons = addons.len(), conflicts = conflicts.len());
    let _guard = span.enter();

    let mut out = OutputBuilder::default();

    for strategy in MergeStrategy::globals() {
        union_global(&mut out, addons, strategy);
    }
    merge_ui_screens(&mut out, addons);
    merge_paths(&mut out, addons, conflicts);
    sweep(&mut out, addons, ASSET_DIRS, "asset");
    sweep(&mut out, addons, MODEL_DIRS, "material/model");

    let manifest = reconcile_manifest(base_manifest, addons);
    write_manifest(&mut out, &manifest);

    let total = out.files.len();
    out.log(format!("Merge completed: {total} files total"));
    debug!(files = total, "merge finished");

    MergeResult {
        files: out.files,
        manifest,
        logs: out.logs,
        conflicts: conflicts.to_vec(),
    }
}

// ---------------------------------------------------------------------------
// OutputBuilder
// ---------------------------------------------------------------------------

/// Accumulator threaded through the phases.
#[derive(Default)]
struct OutputBuilder {
    files: Vec<AddonFile>,
    /// Path -> position in `files`.
    index: HashMap<String, usize>,
    processed: HashSet<String>,
    logs: Vec<String>,
}

impl OutputBuilder {
    /// Insert or replace a file. A replaced file keeps its position.
    fn push_file(&mut self, path: &str, content: FileContent) {
        if let Some(&at) = self.index.get(path) {
            self.files[at].content = content;
        } else {
            self.index.insert(path.to_owned(), self.files.len());
            self.files.push(AddonFile::new(path, content));
        }
    }

    /// Insert a file at the end, removing any earlier file at `path`.
    fn append_file(&mut self, path: &str, content: FileContent) {
        if self.index.remove(path).is_some() {
            self.files.retain(|f| f.path != path);
            self.index = self
                .files
                .iter()
                .enumerate()
                .map(|(at, f)| (f.path.clone(), at))
                .collect();
        }
        self.push_file(path, content);
    }

    fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    fn is_processed(&self, path: &str) -> bool {
        self.processed.contains(path)
    }

    fn mark_processed(&mut self, path: &str) {
        self.processed.insert(path.to_owned());
    }

    fn log(&mut self, line: String) {
        self.logs.push(line);
    }

    /// Record the outcome's fallback, if any, and return its content.
    fn take_outcome(&mut self, path: &str, outcome: MergeOutcome) -> String {
        if let Some(reason) = outcome.fallback {
            warn!(path, %reason, "merge fell back to the last version");
            self.log(format!(
                "Could not merge {path} ({reason}); kept the last version as is"
            ));
        }
        outcome.content
    }
}

// ---------------------------------------------------------------------------
// Phases 1-3: global unions
// ---------------------------------------------------------------------------

/// Phases 1 and 2: union every file claimed by a global strategy and write
/// the result to the strategy's canonical paths.
fn union_global(out: &mut OutputBuilder, addons: &[LoadedAddon], strategy: MergeStrategy) {
    let contributions: Vec<Contribution<'_>> = addons
        .iter()
        .flat_map(|addon| {
            addon.files.iter().filter_map(move |file| {
                let content = file.content.as_text()?;
                (MergeStrategy::for_path(&file.path) == strategy).then_some(Contribution {
                    addon_name: &addon.name,
                    path: &file.path,
                    content,
                })
            })
        })
        .collect();
    if contributions.is_empty() {
        return;
    }

    let targets = strategy.canonical_paths();
    let content = out.take_outcome(&targets.join(", "), strategy.apply(&contributions));
    for target in targets {
        out.push_file(target, FileContent::Text(content.clone()));
        out.mark_processed(target);
    }
    for c in &contributions {
        out.mark_processed(c.path);
    }

    debug!(%strategy, sources = contributions.len(), "global union");
    out.log(format!(
        "Merged {} file(s) into {} ({strategy}) from {}",
        contributions.len(),
        targets.join(" and "),
        addon_list(contributions.iter().map(|c| c.addon_name)),
    ));
}

/// Phase 3: UI screens present in two or more addons.
fn merge_ui_screens(out: &mut OutputBuilder, addons: &[LoadedAddon]) {
    let mut groups: Vec<(&str, Vec<Contribution<'_>>)> = Vec::new();
    let mut by_path: HashMap<&str, usize> = HashMap::new();

    for addon in addons {
        for file in &addon.files {
            if out.is_processed(&file.path)
                || MergeStrategy::for_path(&file.path) != MergeStrategy::UiArrayUnion
            {
                continue;
            }
            let Some(content) = file.content.as_text() else {
                continue;
            };
            let contribution = Contribution {
                addon_name: &addon.name,
                path: &file.path,
                content,
            };
            let at = *by_path.entry(file.path.as_str()).or_insert_with(|| {
                groups.push((file.path.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[at].1.push(contribution);
        }
    }

    for (path, contributions) in groups {
        if contributions.len() < 2 {
            continue;
        }
        let strategy = MergeStrategy::UiArrayUnion;
        let content = out.take_outcome(path, strategy.apply(&contributions));
        out.push_file(path, FileContent::Text(content));
        out.mark_processed(path);
        out.log(format!(
            "Merged {path} ({strategy}) from {}",
            addon_list(contributions.iter().map(|c| c.addon_name)),
        ));
    }
}

// ---------------------------------------------------------------------------
// Phase 4: per-path pass
// ---------------------------------------------------------------------------

fn merge_paths(out: &mut OutputBuilder, addons: &[LoadedAddon], conflicts: &[FileConflict]) {
    let conflicts: HashMap<&str, &FileConflict> =
        conflicts.iter().map(|c| (c.path.as_str(), c)).collect();

    for addon in addons {
        for file in &addon.files {
            if out.is_processed(&file.path) {
                continue;
            }
            out.mark_processed(&file.path);

            match conflicts.get(file.path.as_str()) {
                Some(conflict) => merge_conflict(out, conflict),
                None => {
                    out.push_file(&file.path, file.content.clone());
                    out.log(format!("Added {} from {}", file.path, addon.name));
                }
            }
        }
    }
}

/// Content-merge a contested path when every side is text; otherwise keep
/// the side chosen by the conflict's resolution.
fn merge_conflict(out: &mut OutputBuilder, conflict: &FileConflict) {
    let path = conflict.path.as_str();
    let texts: Option<Vec<Contribution<'_>>> = conflict
        .sides
        .iter()
        .map(|side| {
            side.content.as_text().map(|content| Contribution {
                addon_name: &side.addon_name,
                path,
                content,
            })
        })
        .collect();

    if let Some(contributions) = texts.filter(|c| !c.is_empty()) {
        let strategy = MergeStrategy::for_path(path);
        let content = out.take_outcome(path, strategy.apply(&contributions));
        out.push_file(path, FileContent::Text(content));
        out.log(format!(
            "Conflict merged for {path} ({strategy}) from {}",
            addon_list(contributions.iter().map(|c| c.addon_name)),
        ));
        return;
    }

    match conflict.selected_side() {
        Some(side) => {
            out.push_file(path, side.content.clone());
            out.log(format!(
                "Conflict resolved for {path}: kept version from {}",
                side.addon_name
            ));
        }
        None => {
            warn!(path, "conflict has no sides");
            out.log(format!("Conflict for {path} has no versions; skipped"));
        }
    }
}

// ---------------------------------------------------------------------------
// Phases 5-6: sweeps
// ---------------------------------------------------------------------------

/// Returns `true` if `path` sits under one of the top-level `dirs`, with
/// either separator.
fn is_under(path: &str, dirs: &[&str]) -> bool {
    dirs.iter().any(|dir| {
        path.strip_prefix(dir)
            .is_some_and(|rest| rest.starts_with(['/', '\\']))
    })
}

fn sweep(out: &mut OutputBuilder, addons: &[LoadedAddon], dirs: &[&str], kind: &str) {
    for addon in addons {
        for file in &addon.files {
            if !is_under(&file.path, dirs)
                || out.contains(&file.path)
                || out.is_processed(&file.path)
            {
                continue;
            }
            out.push_file(&file.path, file.content.clone());
            out.mark_processed(&file.path);
            out.log(format!("Included {kind} {} from {}", file.path, addon.name));
        }
    }
}

// ---------------------------------------------------------------------------
// Phase 7: manifest
// ---------------------------------------------------------------------------

fn write_manifest(out: &mut OutputBuilder, manifest: &AddonManifest) {
    match manifest.to_json_pretty() {
        Ok(json) => {
            out.append_file(MANIFEST_PATH, FileContent::Text(json));
            out.log(format!(
                "Generated new {MANIFEST_PATH} with UUID: {}",
                manifest.header.uuid
            ));
        }
        Err(e) => {
            warn!(error = %e, "failed to serialize manifest");
            out.log(format!("Failed to write {MANIFEST_PATH}: {e}"));
        }
    }
}

/// Distinct addon names in first-seen order, comma separated.
fn addon_list<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut seen = HashSet::new();
    names
        .filter(|n| seen.insert(*n))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::merge::detect::detect_conflicts;
    use crate::model::addon::AddonId;
    use crate::model::conflict::Resolution;
    use crate::model::manifest::{ManifestModule, Version};

    fn addon(name: &str, files: Vec<AddonFile>) -> LoadedAddon {
        LoadedAddon::new(AddonId::new(name), format!("{name}.mcpack"), files, None)
    }

    fn text(path: &str, content: &str) -> AddonFile {
        AddonFile::new(path, content)
    }

    fn base() -> AddonManifest {
        AddonManifest::generate("Merged", "test", Version::new(1, 0, 0), &[])
    }

    fn run(addons: &[LoadedAddon]) -> MergeResult {
        merge_addons(addons, &detect_conflicts(addons), &base())
    }

    fn json_at(result: &MergeResult, path: &str) -> Value {
        serde_json::from_str(result.text(path).unwrap()).unwrap()
    }

    #[test]
    fn disjoint_addons_keep_every_file_plus_manifest() {
        let addons = vec![
            addon("a", vec![text("functions/a.mcfunction", "say a"), text("a.txt", "a")]),
            addon("b", vec![AddonFile::new("textures/b.png", vec![1u8, 2, 3])]),
        ];
        let result = run(&addons);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.file_count(), 3 + 1);
        assert_eq!(result.files.last().unwrap().path, MANIFEST_PATH);
    }

    #[test]
    fn texture_atlases_union_texture_data() {
        let addons = vec![
            addon(
                "a",
                vec![text(
                    "textures/item_texture.json",
                    r#"{"texture_data": {"apple": {"textures": "textures/items/apple"}}}"#,
                )],
            ),
            addon(
                "b",
                vec![text(
                    "textures/item_texture.json",
                    r#"{"texture_data": {"banana": {"textures": "textures/items/banana"}}}"#,
                )],
            ),
        ];
        let result = run(&addons);
        let merged = json_at(&result, "textures/item_texture.json");
        let data = merged["texture_data"].as_object().unwrap();
        assert!(data.contains_key("apple"));
        assert!(data.contains_key("banana"));
    }

    #[test]
    fn scripts_union_into_both_entry_points() {
        let addons = vec![
            addon("a", vec![text("scripts/main.js", "foo();")]),
            addon("b", vec![text("scripts/_import.js", "foo();\nbar();")]),
        ];
        let result = run(&addons);
        assert_eq!(result.text("scripts/main.js"), Some("foo();\nbar();"));
        assert_eq!(result.text("scripts/_import.js"), Some("foo();\nbar();"));
    }

    #[test]
    fn script_named_like_main_js_is_folded_into_entry_points() {
        let addons = vec![addon("a", vec![text("scripts/domain.js", "dom();")])];
        let result = run(&addons);
        let paths: Vec<&str> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["scripts/main.js", "scripts/_import.js", MANIFEST_PATH]);
        assert_eq!(result.text("scripts/main.js"), Some("dom();"));
    }

    #[test]
    fn first_block_geometry_is_kept() {
        let a = r#"{"stone:custom": {"components": {"minecraft:geometry": "geometry.a"}, "minecraft:block_shape": "full"}}"#;
        let b = r#"{"stone:custom": {"components": {"minecraft:geometry": "geometry.b"}}}"#;
        let addons = vec![
            addon("a", vec![text("blocks.json", a)]),
            addon("b", vec![text("blocks.json", b)]),
        ];
        let merged = json_at(&run(&addons), "blocks.json");
        let entry = &merged["stone:custom"];
        assert_eq!(entry["components"]["minecraft:geometry"], json!("geometry.a"));
        assert!(entry.get("minecraft:block_shape").is_none());
    }

    #[test]
    fn lang_files_union_lines() {
        let addons = vec![
            addon("a", vec![text("texts/en_US.lang", "a\nb\n")]),
            addon("b", vec![text("texts/en_US.lang", "b\nc\n")]),
        ];
        assert_eq!(run(&addons).text("texts/en_US.lang"), Some("a\nb\nc"));
    }

    #[test]
    fn binary_conflict_follows_resolution() {
        let addons = vec![
            addon("a", vec![AddonFile::new("textures/x.png", vec![1u8])]),
            addon("b", vec![AddonFile::new("textures/x.png", vec![2u8])]),
        ];
        let mut conflicts = detect_conflicts(&addons);

        let result = merge_addons(&addons, &conflicts, &base());
        assert_eq!(result.file("textures/x.png").unwrap().content.as_bytes(), [2]);

        conflicts[0].resolution = Some(Resolution::KeepFirst);
        let result = merge_addons(&addons, &conflicts, &base());
        assert_eq!(result.file("textures/x.png").unwrap().content.as_bytes(), [1]);
        assert!(
            result
                .logs
                .iter()
                .any(|l| l == "Conflict resolved for textures/x.png: kept version from a")
        );

        conflicts[0].resolution = Some(Resolution::Manual(Some(AddonId::new("b"))));
        let result = merge_addons(&addons, &conflicts, &base());
        assert_eq!(result.file("textures/x.png").unwrap().content.as_bytes(), [2]);
    }

    #[test]
    fn unset_and_empty_manual_resolution_keep_first() {
        let addons = vec![
            addon("a", vec![AddonFile::new("sounds/x.ogg", vec![1u8])]),
            addon("b", vec![AddonFile::new("sounds/x.ogg", vec![2u8])]),
        ];
        for resolution in [None, Some(Resolution::Manual(None))] {
            let mut conflicts = detect_conflicts(&addons);
            conflicts[0].resolution = resolution;
            let result = merge_addons(&addons, &conflicts, &base());
            assert_eq!(result.file("sounds/x.ogg").unwrap().content.as_bytes(), [1]);
        }
    }

    #[test]
    fn broken_json_falls_back_to_last_version() {
        let addons = vec![
            addon("a", vec![text("entities/pig.json", "{ broken")]),
            addon("b", vec![text("entities/pig.json", r#"{"b": 1}"#)]),
        ];
        let result = run(&addons);
        assert_eq!(result.text("entities/pig.json"), Some(r#"{"b": 1}"#));
        assert!(result.logs.iter().any(|l| l.starts_with("Could not merge entities/pig.json")));
    }

    #[test]
    fn ui_screens_merge_only_when_shared() {
        let addons = vec![
            addon(
                "a",
                vec![
                    text("ui/hud_screen.json", r#"{"root": {"controls": [{"a@x": {}}]}}"#),
                    text("ui/solo.json", r#"{"solo": true}"#),
                ],
            ),
            addon(
                "b",
                vec![text("ui/hud_screen.json", r#"{"root": {"controls": [{"b@y": {}}]}}"#)],
            ),
        ];
        let result = run(&addons);
        let hud = json_at(&result, "ui/hud_screen.json");
        assert_eq!(hud["root"]["controls"].as_array().unwrap().len(), 2);
        assert_eq!(result.text("ui/solo.json"), Some(r#"{"solo": true}"#));
        assert!(result.logs.iter().any(|l| l == "Added ui/solo.json from a"));
    }

    #[test]
    fn ui_defs_union_across_addons() {
        let addons = vec![
            addon("a", vec![text("ui/_ui_defs.json", r#"{"ui_defs": ["ui/a.json"]}"#)]),
            addon("b", vec![text("ui/_ui_defs.json", r#"{"ui_defs": ["ui/a.json", "ui/b.json"]}"#)]),
        ];
        let defs = json_at(&run(&addons), "ui/_ui_defs.json");
        assert_eq!(defs, json!({"ui_defs": ["ui/a.json", "ui/b.json"]}));
    }

    #[test]
    fn manifest_is_written_last_and_overrides_addon_manifests() {
        let addons = vec![
            addon("a", vec![text(MANIFEST_PATH, r#"{"format_version": 2}"#), text("a.txt", "a")]),
            addon("b", vec![text(MANIFEST_PATH, r#"{"format_version": 2}"#)]),
        ];
        let base = base();
        let result = merge_addons(&addons, &detect_conflicts(&addons), &base);
        let paths: Vec<_> = result.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.txt", MANIFEST_PATH]);
        let written = AddonManifest::from_json(result.text(MANIFEST_PATH).unwrap()).unwrap();
        assert_eq!(written.header.uuid, base.header.uuid);
        assert_eq!(written, result.manifest);
    }

    #[test]
    fn output_paths_are_unique() {
        let addons = vec![
            addon("a", vec![text("scripts/main.js", "a();"), text("x.mcfunction", "say a")]),
            addon("b", vec![text("scripts/main.js", "b();"), text("x.mcfunction", "say b")]),
        ];
        let result = run(&addons);
        let mut seen = HashSet::new();
        assert!(result.files.iter().all(|f| seen.insert(f.path.clone())));
        assert_eq!(result.text("x.mcfunction"), Some("say a\nsay b"));
    }

    #[test]
    fn summary_lines_close_the_log() {
        let mut base = base();
        base.modules = vec![ManifestModule::new("data", "d", Version::new(1, 0, 0))];
        let addons = vec![addon("a", vec![text("a.txt", "a")])];
        let result = merge_addons(&addons, &[], &base);
        let n = result.logs.len();
        assert_eq!(
            result.logs[n - 2],
            format!("Generated new manifest.json with UUID: {}", base.header.uuid)
        );
        assert_eq!(result.logs[n - 1], "Merge completed: 2 files total");
    }

    #[test]
    fn sweep_matches_either_separator() {
        assert!(is_under("textures/a.png", ASSET_DIRS));
        assert!(is_under("sounds\\a.ogg", ASSET_DIRS));
        assert!(!is_under("texturesx/a.png", ASSET_DIRS));
        assert!(!is_under("rp/textures/a.png", ASSET_DIRS));
        assert!(is_under("models/entity/x.json", MODEL_DIRS));
    }
}
