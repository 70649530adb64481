//! Shared test helpers for mcmerge integration tests.
//!
//! All tests use temp directories and in-memory ZIP archives built with the
//! real codec; nothing touches the working tree.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mcmerge_archive::{ArchiveCodec, ArchiveEntry, ZipCodec};

/// Encode `(path, bytes)` pairs as a ZIP archive.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let entries: Vec<ArchiveEntry> = entries
        .iter()
        .map(|(path, data)| ArchiveEntry::new(*path, data.to_vec()))
        .collect();
    ZipCodec::new().write(&entries).expect("zip encode failed")
}

/// Decode a ZIP archive back into `(path, bytes)` pairs.
pub fn unzip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    ZipCodec::new()
        .read(bytes)
        .expect("zip decode failed")
        .into_iter()
        .map(|e| (e.path, e.data))
        .collect()
}

/// Write an archive file into `dir` and return its path.
pub fn write_archive(dir: &Path, file_name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, zip_bytes(entries)).expect("failed to write archive");
    path
}

/// A minimal manifest with one module of each given `(type, uuid)`.
pub fn manifest_json(name: &str, header_uuid: &str, modules: &[(&str, &str)]) -> String {
    let modules: Vec<serde_json::Value> = modules
        .iter()
        .map(|(ty, uuid)| serde_json::json!({"type": ty, "uuid": uuid, "version": [1, 0, 0]}))
        .collect();
    serde_json::json!({
        "format_version": 2,
        "header": {
            "name": name,
            "description": "",
            "uuid": header_uuid,
            "version": [1, 0, 0],
            "min_engine_version": [1, 20, 0]
        },
        "modules": modules
    })
    .to_string()
}

/// Run the `mcmerge` binary in `dir` with logging left at its default.
pub fn mcmerge_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mcmerge"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("MCMERGE_LOG_FORMAT")
        .output()
        .expect("failed to run mcmerge")
}
