//! `mcmerge merge`: merge archives into one addon and write it out.
//!
//! Settings come from `mcmerge.toml` (see [`mcmerge::config`]) and are
//! overridden by flags. Resolution rules from both sources are applied in
//! order, config first, so a flag for the same path wins.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use clap::Args;
use mcmerge::config::{CONFIG_FILE, MergerConfig, ResolveRule};
use mcmerge::export::{ExportFormat, export, write_artifact};
use mcmerge_archive::ZipCodec;

use crate::input::open_session;

#[derive(Args)]
pub struct MergeArgs {
    /// Archives, in merge order (later addons win deep-JSON collisions)
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,

    /// Directory to write the merged addon to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output container
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Manifest name
    #[arg(long)]
    pub name: Option<String>,

    /// Manifest description
    #[arg(long)]
    pub description: Option<String>,

    /// Manifest version, e.g. 1.2.0
    #[arg(id = "pack_version", long = "pack-version", value_name = "VERSION")]
    pub version: Option<String>,

    /// Resolve a binary conflict: PATH=keep-first, PATH=keep-last or
    /// PATH=ADDON (repeatable)
    #[arg(long = "resolve", value_name = "PATH=RULE")]
    pub resolve: Vec<ResolveRule>,

    /// Config file (default: ./mcmerge.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the merge log to stdout
    #[arg(long)]
    pub log: bool,
}

fn load_config(explicit: Option<&Path>) -> Result<MergerConfig> {
    match explicit {
        Some(path) if !path.exists() => {
            bail!(
                "config file '{}' not found\n  To fix: check the path, or omit --config to use ./{CONFIG_FILE}",
                path.display()
            )
        }
        Some(path) => Ok(MergerConfig::load(path)?),
        None => Ok(MergerConfig::load(Path::new(CONFIG_FILE))?),
    }
}

pub fn run(args: &MergeArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let mut session = open_session(&args.archives, config.manifest.clone())?;

    session.edit_manifest(
        args.name.as_deref(),
        args.description.as_deref(),
        args.version.as_deref(),
    )?;

    let rules: Vec<ResolveRule> = config
        .resolve
        .iter()
        .chain(&args.resolve)
        .cloned()
        .collect();
    for rule in session.apply_resolutions(&rules) {
        eprintln!("warning: resolution rule {rule} not applied: no binary conflict it can resolve");
    }

    let format = args.format.unwrap_or(config.export.format);
    let dir = args.output.as_deref().unwrap_or(&config.export.output_dir);

    let result = session.merge()?;
    if args.log {
        for line in &result.logs {
            println!("{line}");
        }
    }

    let artifact = export(result, format, &ZipCodec::new())?;
    let path = write_artifact(&artifact, dir)?;
    println!(
        "Wrote {} ({} files, {} conflict(s))",
        path.display(),
        result.file_count(),
        result.conflicts.len()
    );
    Ok(())
}
