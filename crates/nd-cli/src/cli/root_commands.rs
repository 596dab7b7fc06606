use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a complete backup: export, archive, upload, notify, clean up
    Run(RunArgs),
    /// Find a secondary replica set member and print its host
    Probe,
    /// Validate configuration and print a redacted summary
    CheckConfig,
}

#[derive(Debug, Default, Args)]
pub struct RunArgs {
    /// Working directory for dumps and archives (overrides `output_dir`)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Log notification mail instead of sending it
    #[arg(long)]
    pub no_email: bool,
}
