use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Decadal hindcast lead-year reindexer.
#[derive(Parser)]
#[command(
    name = "decadal",
    version,
    about = "Reindex decadal hindcast runs into a lead-year archive"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Merge runs into an archive keyed by initialization and lead year.
    Merge(MergeArgs),
    /// Summarise runs without merging them.
    Inspect(InspectArgs),
}

/// Arguments for the `merge` subcommand.
#[derive(clap::Args)]
pub struct MergeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "decadal.toml")]
    pub config: PathBuf,

    /// Override output NetCDF path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run files; replace `[input].files` when given.
    pub files: Vec<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Field variable to read from each run.
    #[arg(short, long, default_value = "tas")]
    pub field: String,

    /// Write the JSON summary here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run files to inspect.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
