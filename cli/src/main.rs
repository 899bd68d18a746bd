use std::path::PathBuf;

use clap::{Parser, Subcommand};
use snaptrack_core::{TrackerConfig, TrackerError};
use tracing_subscriber::EnvFilter;

mod commands;
mod table;

#[derive(Parser)]
#[command(name = "snaptrack", version, about = "Collection and performance tracker for your card game account")]
struct Cli {
    /// Alternate configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show your best performing cards
    Stats,
    /// Show the upgrades you can afford right now
    Upgrades,
    /// Print the static upgrade price ladder
    Prices,
    /// Ingest the current account state once
    Ingest,
    /// Watch the profile directory and ingest on every change
    Watch,
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), TrackerError> {
    let config = TrackerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats => commands::stats(&commands::open_tracker(config)?),
        Commands::Upgrades => commands::upgrades(&commands::open_tracker(config)?),
        Commands::Prices => commands::prices(),
        Commands::Ingest => commands::ingest(&commands::open_tracker(config)?),
        Commands::Watch => commands::watch(commands::open_tracker(config)?).await,
        Commands::Config => commands::show_config(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_commands_parse() {
        assert!(matches!(
            Cli::try_parse_from(["snaptrack", "stats"]).expect("parses").command,
            Commands::Stats
        ));
        assert!(matches!(
            Cli::try_parse_from(["snaptrack", "upgrades"]).expect("parses").command,
            Commands::Upgrades
        ));

        let with_config =
            Cli::try_parse_from(["snaptrack", "--config", "/tmp/t.toml", "ingest"]).expect("parses");
        assert_eq!(with_config.config, Some(PathBuf::from("/tmp/t.toml")));
    }
}
