use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::GlobalFlags;
pub use root_commands::{Commands, RunArgs};

/// Top-level CLI parser for the `nightdump` binary.
#[derive(Debug, Parser)]
#[command(
    name = "nightdump",
    version,
    about = "Scheduled MongoDB backups to encrypted object storage"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (YAML, or TOML by extension). Defaults to /config.yml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only, no progress)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            config: self.config.clone(),
            quiet: self.quiet,
            verbose: self.verbose,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["nightdump", "--config", "/etc/nd.toml", "--verbose", "probe"])
            .expect("cli should parse");

        assert!(cli.verbose);
        assert!(!cli.quiet);
        assert_eq!(
            cli.global_flags().config.as_deref(),
            Some(std::path::Path::new("/etc/nd.toml"))
        );
        assert!(matches!(cli.command, Commands::Probe));
    }

    #[test]
    fn run_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "nightdump",
            "run",
            "--output-dir",
            "/scratch",
            "--no-email",
            "-q",
        ])
        .expect("cli should parse");

        assert!(cli.quiet);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.output_dir.as_deref(), Some(std::path::Path::new("/scratch")));
                assert!(args.no_email);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_config_is_kebab_case() {
        let cli = Cli::try_parse_from(["nightdump", "check-config"]).expect("cli should parse");
        assert!(matches!(cli.command, Commands::CheckConfig));
    }
}
