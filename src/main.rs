use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

mod conflicts;
mod format;
mod input;
mod inspect;
mod merge_cmd;

/// Merge Minecraft Bedrock addons into one
///
/// Combines several .mcaddon / .mcpack / .zip archives into a single
/// addon. Files shared by several addons are merged by content where the
/// format allows it (JSON, language files, scripts); binary assets keep one
/// version, chosen per path with --resolve or mcmerge.toml.
///
/// QUICK START:
///
///   mcmerge inspect Furniture.mcaddon
///   mcmerge conflicts Furniture.mcaddon Mobs.mcaddon
///   mcmerge merge Furniture.mcaddon Mobs.mcaddon -o dist --name "Survival Plus"
///
/// LOGGING:
///
///   -v / -vv raise the log level (default: warnings only). RUST_LOG
///   overrides it. MCMERGE_LOG_FORMAT=json switches to JSON lines.
#[derive(Parser)]
#[command(name = "mcmerge")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'mcmerge <command> --help' for more information on a specific command.")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the manifest and files of one archive
    Inspect(inspect::InspectArgs),

    /// List paths shared by two or more addons
    ///
    /// Text conflicts are merged by content; the strategy is shown.
    /// Binary conflicts keep one side; the current resolution is shown.
    Conflicts(conflicts::ConflictsArgs),

    /// Merge archives and write the result
    Merge(merge_cmd::MergeArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    mcmerge::telemetry::init(cli.verbose);

    match cli.command {
        Commands::Inspect(ref args) => inspect::run(args),
        Commands::Conflicts(ref args) => conflicts::run(args),
        Commands::Merge(ref args) => merge_cmd::run(args),
    }
}
