//! `mcmerge conflicts`: list paths shared by two or more addons and how
//! each will be merged.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mcmerge::config::ManifestConfig;
use mcmerge::merge::MergeStrategy;
use mcmerge::model::conflict::FileConflict;
use serde::Serialize;

use crate::format::OutputFormat;
use crate::input::open_session;

#[derive(Args)]
pub struct ConflictsArgs {
    /// Archives, in merge order
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct ConflictView<'a> {
    index: usize,
    path: &'a str,
    addons: Vec<&'a str>,
    /// Content merge applied, or `None` when one side is picked.
    strategy: Option<String>,
    resolution: Option<String>,
}

impl<'a> ConflictView<'a> {
    fn new(index: usize, conflict: &'a FileConflict) -> Self {
        let mergeable = conflict.is_content_merged();
        Self {
            index,
            path: &conflict.path,
            addons: conflict.addon_names(),
            strategy: mergeable.then(|| MergeStrategy::for_path(&conflict.path).to_string()),
            resolution: (!mergeable)
                .then(|| conflict.resolution.as_ref().map(ToString::to_string))
                .flatten(),
        }
    }

    fn action(&self) -> String {
        match (&self.strategy, &self.resolution) {
            (Some(strategy), _) => strategy.clone(),
            (None, Some(resolution)) => resolution.clone(),
            (None, None) => "keep-first".to_owned(),
        }
    }
}

pub fn run(args: &ConflictsArgs) -> Result<()> {
    let session = open_session(&args.archives, ManifestConfig::default())?;
    let views: Vec<ConflictView<'_>> = session
        .conflicts()
        .iter()
        .enumerate()
        .map(|(i, c)| ConflictView::new(i, c))
        .collect();

    match args.format {
        OutputFormat::Json => println!("{}", args.format.serialize(&views)?),
        OutputFormat::Text => {
            if views.is_empty() {
                println!("No conflicts across {} addon(s).", session.addons().len());
            }
            for v in &views {
                println!(
                    "#{} {} [{}] <- {}",
                    v.index,
                    v.path,
                    v.action(),
                    v.addons.join(", ")
                );
            }
        }
    }
    Ok(())
}
