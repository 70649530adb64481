//! `mcmerge inspect`: show what a single archive contains.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use mcmerge::loader::{ArchiveInput, load_addon};
use mcmerge::model::addon::LoadedAddon;
use mcmerge::model::manifest::AddonManifest;
use mcmerge_archive::ZipCodec;
use serde::Serialize;

use crate::format::OutputFormat;

#[derive(Args)]
pub struct InspectArgs {
    /// Archive to inspect (.mcaddon, .mcpack or .zip)
    pub archive: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct InspectView<'a> {
    name: &'a str,
    file_name: &'a str,
    pack_type: String,
    manifest: Option<&'a AddonManifest>,
    files: Vec<FileView<'a>>,
}

#[derive(Serialize)]
struct FileView<'a> {
    path: &'a str,
    text: bool,
    bytes: usize,
}

impl<'a> InspectView<'a> {
    fn new(addon: &'a LoadedAddon) -> Self {
        Self {
            name: &addon.name,
            file_name: &addon.original_file_name,
            pack_type: addon.pack_type.to_string(),
            manifest: addon.manifest.as_ref(),
            files: addon
                .files
                .iter()
                .map(|f| FileView {
                    path: &f.path,
                    text: f.is_text(),
                    bytes: f.content.len(),
                })
                .collect(),
        }
    }
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let input = ArchiveInput::read(&args.archive)?;
    let addon = load_addon(&input.file_name, &input.bytes, &ZipCodec::new())
        .with_context(|| format!("inspecting {}", args.archive.display()))?;
    let view = InspectView::new(&addon);

    match args.format {
        OutputFormat::Json => println!("{}", args.format.serialize(&view)?),
        OutputFormat::Text => print!("{}", render_text(&view)),
    }
    Ok(())
}

fn render_text(view: &InspectView<'_>) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", view.name, view.file_name);
    let _ = writeln!(out, "  type: {}", view.pack_type);
    match view.manifest {
        Some(m) => {
            let _ = writeln!(out, "  uuid: {}", m.header.uuid);
            let _ = writeln!(out, "  version: {}", m.header.version);
            for module in &m.modules {
                let _ = writeln!(out, "  module: {} {}", module.module_type, module.uuid);
            }
            for dep in m.dependencies.iter().flatten() {
                let target = dep
                    .uuid
                    .as_deref()
                    .or(dep.module_name.as_deref())
                    .unwrap_or("?");
                let _ = writeln!(out, "  depends on: {target} {}", dep.version);
            }
        }
        None => {
            let _ = writeln!(out, "  manifest: missing or unreadable");
        }
    }
    let _ = writeln!(out, "  files: {}", view.files.len());
    for f in &view.files {
        let kind = if f.text { "text" } else { "binary" };
        let _ = writeln!(out, "    {} ({kind}, {} bytes)", f.path, f.bytes);
    }
    out
}
