//! Black-box tests for the `mcmerge` binary.
//!
//! Each test writes archives into a temp dir and runs the binary there.

mod common;

use common::{manifest_json, mcmerge_in, unzip, write_archive};
use serde_json::Value;
use tempfile::TempDir;

fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Two addons sharing one binary texture and one language file.
fn two_addons(dir: &TempDir) {
    let manifest = manifest_json("Better Stone", "stone-header", &[("resources", "stone-res")]);
    write_archive(
        dir.path(),
        "stone.mcpack",
        &[
            ("manifest.json", manifest.as_bytes()),
            ("textures/x.png", &[1]),
            ("texts/en_US.lang", b"a=1\n"),
        ],
    );
    write_archive(
        dir.path(),
        "other.mcpack",
        &[
            ("textures/x.png", &[2]),
            ("texts/en_US.lang", b"b=2\n"),
        ],
    );
}

#[test]
fn inspect_json_lists_manifest_and_files() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(dir.path(), &["inspect", "stone.mcpack", "--format", "json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let view: Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(view["name"], "Better Stone");
    assert_eq!(view["file_name"], "stone.mcpack");
    assert_eq!(view["manifest"]["header"]["uuid"], "stone-header");
    let paths: Vec<&str> = view["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["manifest.json", "textures/x.png", "texts/en_US.lang"]);
    assert_eq!(view["files"][1]["text"], false);
}

#[test]
fn inspect_text_reports_missing_manifest() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(dir.path(), &["inspect", "other.mcpack"]);
    assert!(out.status.success());
    let text = stdout(&out);
    assert!(text.starts_with("other (other.mcpack)"), "got: {text}");
    assert!(text.contains("manifest: missing or unreadable"));
    assert!(text.contains("textures/x.png (binary, 1 bytes)"));
}

#[test]
fn conflicts_json_shows_strategy_or_resolution() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &["conflicts", "stone.mcpack", "other.mcpack", "--format", "json"],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let views: Value = serde_json::from_str(&stdout(&out)).unwrap();
    let views = views.as_array().unwrap();
    assert_eq!(views.len(), 2);

    assert_eq!(views[0]["path"], "textures/x.png");
    assert_eq!(views[0]["addons"], serde_json::json!(["Better Stone", "other"]));
    assert!(views[0]["strategy"].is_null());
    assert_eq!(views[0]["resolution"], "keep-last");

    assert_eq!(views[1]["path"], "texts/en_US.lang");
    assert_eq!(views[1]["strategy"], "line union");
}

#[test]
fn conflicts_text_with_no_overlap() {
    let dir = TempDir::new().unwrap();
    write_archive(dir.path(), "a.zip", &[("a.txt", b"a")]);
    write_archive(dir.path(), "b.zip", &[("b.txt", b"b")]);

    let out = mcmerge_in(dir.path(), &["conflicts", "a.zip", "b.zip"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "No conflicts across 2 addon(s).");
}

#[test]
fn merge_writes_archive_with_resolution_and_name() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &[
            "merge",
            "stone.mcpack",
            "other.mcpack",
            "-o",
            "dist",
            "--name",
            "Survival Plus",
            "--pack-version",
            "2.0.1",
            "--resolve",
            "textures/x.png=Better Stone",
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Survival_Plus.mcaddon"));

    let bytes = std::fs::read(dir.path().join("dist/Survival_Plus.mcaddon")).unwrap();
    let files = unzip(&bytes);
    let get = |path: &str| {
        files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| data.clone())
            .unwrap()
    };
    assert_eq!(get("textures/x.png"), [1]);
    assert_eq!(get("texts/en_US.lang"), b"a=1\nb=2");

    let manifest: Value = serde_json::from_slice(&get("manifest.json")).unwrap();
    assert_eq!(manifest["header"]["name"], "Survival Plus");
    assert_eq!(manifest["header"]["version"], serde_json::json!([2, 0, 1]));
    assert_eq!(files.last().unwrap().0, "manifest.json");
}

#[test]
fn merge_reads_config_from_working_directory() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);
    std::fs::write(
        dir.path().join("mcmerge.toml"),
        r#"
[manifest]
name = "From Config"

[export]
format = "folder"
output_dir = "out"

[[resolve]]
path = "textures/x.png"
strategy = "keep-first"
"#,
    )
    .unwrap();

    let out = mcmerge_in(dir.path(), &["merge", "stone.mcpack", "other.mcpack"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let dump = std::fs::read(dir.path().join("out/From_Config_structure.json")).unwrap();
    let dump: Value = serde_json::from_slice(&dump).unwrap();
    assert_eq!(dump["manifest"]["header"]["name"], "From Config");
    assert_eq!(dump["files"][0]["path"], "textures/x.png");
    assert_eq!(dump["files"][0]["content"], "[Binary file: textures/x.png]");
}

#[test]
fn merge_log_flag_prints_merge_log() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &["merge", "stone.mcpack", "other.mcpack", "--log", "-o", "."],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("Conflict resolved for textures/x.png: kept version from other"));
    assert!(text.contains("Merge completed: 3 files total"));
}

#[test]
fn unmatched_rule_is_a_warning() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &[
            "merge",
            "stone.mcpack",
            "other.mcpack",
            "--resolve",
            "nowhere.png=keep-first",
        ],
    );
    assert!(out.status.success());
    assert!(stderr(&out).contains("warning: resolution rule"));
}

#[test]
fn rule_on_content_merged_path_is_a_warning() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &[
            "merge",
            "stone.mcpack",
            "other.mcpack",
            "--resolve",
            "texts/en_US.lang=other",
        ],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let err = stderr(&out);
    assert!(
        err.contains("warning: resolution rule texts/en_US.lang"),
        "got: {err}"
    );
}

#[test]
fn invalid_pack_version_fails() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &["merge", "stone.mcpack", "--pack-version", "1.2"],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("invalid version '1.2'"));
}

#[test]
fn broken_archives_are_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken.mcpack"), b"not a zip").unwrap();

    let out = mcmerge_in(dir.path(), &["merge", "broken.mcpack"]);
    assert!(!out.status.success());
    let err = stderr(&out);
    assert!(err.contains("broken.mcpack"), "got: {err}");
    assert!(err.contains("no addons could be loaded"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = TempDir::new().unwrap();
    two_addons(&dir);

    let out = mcmerge_in(
        dir.path(),
        &["merge", "stone.mcpack", "--config", "absent.toml"],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("config file 'absent.toml' not found"));
}
