//! Shared archive loading for the subcommands.

use std::path::PathBuf;

use anyhow::{Result, bail};
use mcmerge::config::ManifestConfig;
use mcmerge::loader::ArchiveInput;
use mcmerge::session::Session;
use mcmerge_archive::ZipCodec;

/// Read and load every archive into a fresh session.
///
/// Files that cannot be read or loaded are reported on stderr, one line
/// each, and skipped. Fails only when nothing loads.
pub fn open_session(paths: &[PathBuf], defaults: ManifestConfig) -> Result<Session> {
    let mut inputs = Vec::with_capacity(paths.len());
    for path in paths {
        match ArchiveInput::read(path) {
            Ok(input) => inputs.push(input),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    let mut session = Session::new(defaults);
    for failure in session.add_archives(&inputs, &ZipCodec::new()) {
        eprintln!("error: {failure}");
    }

    if session.addons().is_empty() {
        bail!(
            "no addons could be loaded from {} file(s)\n  To fix: pass valid .mcaddon, .mcpack or .zip files.",
            paths.len()
        );
    }
    Ok(session)
}
