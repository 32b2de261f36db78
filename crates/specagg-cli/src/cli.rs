//! CLI argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "specagg",
    about = "Aggregate per-service OpenAPI specs into audience-specific documents",
    version
)]
pub struct Cli {
    /// Branch or ref the specs are read from
    #[arg(short, long, env = "SPECAGG_BRANCH", default_value = "main")]
    pub branch: String,

    /// Configuration file (YAML or JSON); built-in configuration when omitted
    #[arg(long, env = "SPECAGG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the configured output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Only generate these audiences (repeatable)
    #[arg(long = "audience")]
    pub audiences: Vec<String>,

    /// Read repositories from `{local_root}/{repo}` instead of GitHub
    #[arg(long)]
    pub local_root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, help = "Disable colored output")]
    pub no_color: bool,
}
