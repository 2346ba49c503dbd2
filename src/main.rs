use anyhow::Result;
use clap::Parser;
use flasharray_client::config::ClientConfig;
use log::info;

mod cli;
mod commands;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    info!("Starting flasharray-cli");

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load_with(path)?,
        None => ClientConfig::load()?,
    };
    if let Some(target) = cli.target {
        config.target = Some(target);
    }
    if let Some(version) = cli.api_version {
        config.api_version = version;
    }
    if cli.insecure {
        config.verify_ssl = false;
    }

    let client = config.build_client()?;

    match cli.command {
        Commands::List(args) => commands::list_command(&client, args).await,
        Commands::Token { refresh } => commands::token_command(&client, refresh).await,
        Commands::Version => commands::version_command(&client),
        Commands::Versions => commands::versions_command(&client).await,
    }
}
