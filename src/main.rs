mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::warn;

use mailrotor_core::config::AppConfig;
use mailrotor_storage::AccountStore;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    // One workflow at a time; no need for a worker pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_str = std::fs::read_to_string(&cli.config).unwrap_or_else(|_| {
        warn!(path = %cli.config, "config file not found, using defaults");
        include_str!("../config/default.toml").to_string()
    });
    let mut config = AppConfig::from_toml(&config_str)?;

    // MAILROTOR_ACCOUNTS_FILE / MAILROTOR_SESSION_FILE / MAILROTOR_COOLDOWN_SECS
    config.apply_env_overrides()?;

    let store = AccountStore::new(&config.store.accounts_file);

    match cli.command {
        Commands::Status => commands::status::run(&config, &store)?,
        Commands::List => commands::accounts::list(&store),
        Commands::Next { after } => commands::rotate::preview(&store, after.as_deref()),
        Commands::Select { after } => commands::rotate::select(&config, &store, after.as_deref()).await?,
        Commands::Add {
            email,
            password,
            token,
            quota,
        } => commands::accounts::add(&store, &email, &password, &token, &quota)?,
        Commands::MarkUsed { email } => commands::accounts::mark_used(&store, &email)?,
        Commands::Export { output } => {
            let output = output.unwrap_or_else(|| config.store.export_file.clone());
            commands::export::run(&store, &output)?;
        }
    }

    Ok(())
}
