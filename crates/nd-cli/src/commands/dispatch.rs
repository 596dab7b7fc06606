use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use nd_config::NightdumpConfig;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: NightdumpConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Run(args) => commands::run::handle(&args, config, flags).await,
        Commands::Probe => commands::probe::handle(&config).await,
        Commands::CheckConfig => commands::check_config::handle(&config),
    }
}
