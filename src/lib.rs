pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod resolver;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands, ProgressArgs};
pub use config::Config;
use services::Scheduler;
use state::SharedState;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("config.toml already exists.");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config);

    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(());
    };

    let user_id = cli
        .user
        .unwrap_or_else(|| config.general.default_user.clone());

    let state = SharedState::new(config)
        .await
        .context("Failed to initialize application state")?;

    match command {
        Commands::Search { query } => cli::cmd_search_anime(&state, &query.join(" ")).await,

        Commands::Resolve { mal_id } => cli::cmd_resolve_seasons(&state, mal_id).await,

        Commands::Add { query, status, yes } => {
            cli::cmd_add_show(&state, &user_id, &query.join(" "), &status, yes).await
        }

        Commands::List => cli::cmd_list_shows(&state, &user_id).await,

        Commands::Progress {
            id,
            watched,
            status,
            rating,
            total,
            notes,
        } => {
            let args = ProgressArgs {
                watched,
                status,
                rating,
                total,
                notes,
            };
            cli::cmd_update_progress(&state, &user_id, &id, args).await
        }

        Commands::Remove { id } => cli::cmd_remove_entry(&state, &user_id, &id).await,

        Commands::Rank { title, to, remove } => {
            cli::cmd_rank_show(&state, &user_id, &title.join(" "), to, remove).await
        }

        Commands::Check { all } => cli::cmd_check_updates(&state, &user_id, all).await,

        Commands::Notifications { mark_read, read } => {
            cli::cmd_notifications(&state, &user_id, mark_read, read.as_deref()).await
        }

        Commands::Daemon => run_daemon(state).await,

        Commands::Init => Ok(()),
    }
}

async fn run_daemon(state: SharedState) -> anyhow::Result<()> {
    info!("Starting animelog daemon...");

    let scheduler = Arc::new(Scheduler::new(
        state.update_checker.clone(),
        state.config.scheduler.clone(),
    ));

    let scheduler_task = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.start().await })
    };

    info!("Daemon running. Press Ctrl+C to stop.");

    signal::ctrl_c().await?;
    info!("Shutdown signal received");

    scheduler.stop().await;
    scheduler_task
        .await
        .context("Scheduler task panicked")??;

    info!("Daemon stopped");
    Ok(())
}
