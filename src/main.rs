//! Task Tracker Bot
//!
//! Runs the Telegram poller, the liveness endpoint and the REST API in one
//! process on a single-threaded runtime. Store calls run on the bounded
//! blocking pool.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use task_tracker_bot::api::{self, StatsResponse};
use task_tracker_bot::bot::{
    ChatHandler, InMemorySessionStore, TelegramTransport, connect, run_polling,
};
use task_tracker_bot::cli::{Cli, Command};
use task_tracker_bot::config::Config;
use task_tracker_bot::db::Database;
use task_tracker_bot::health;
use task_tracker_bot::logging::{self, LogTarget};
use task_tracker_bot::types::TaskFilter;
use teloxide::requests::Requester;
use tracing::{info, warn};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env before anything reads the environment (RUST_LOG included)
    let dotenv = dotenvy::dotenv();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    match dotenv {
        Ok(path) => info!("Loaded environment file {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    let mut config = Config::load_or_default(cli.config.as_deref())?;

    // Override from CLI arguments
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(api_port) = cli.api_port {
        config.server.api_port = api_port;
    }
    if cli.no_api {
        config.server.api_enabled = false;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .max_blocking_threads(config.server.blocking_threads.max(1))
        .build()?;

    match cli.command {
        Some(Command::Stats) => runtime.block_on(run_stats(&config)),
        Some(Command::Serve) | None => runtime.block_on(run_bot(config)),
    }
}

/// Print store statistics as JSON.
async fn run_stats(config: &Config) -> Result<()> {
    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path)?;
    let stats = db.call(|db| db.get_stats(&TaskFilter::default())).await?;
    println!("{}", serde_json::to_string_pretty(&StatsResponse::from(stats))?);
    Ok(())
}

/// Run the bot with its HTTP servers until Ctrl-C.
async fn run_bot(config: Config) -> Result<()> {
    let token = config.bot_token()?.to_string();

    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path).with_context(|| {
        format!(
            "failed to open database {}",
            config.server.db_path.display()
        )
    })?;
    info!("Database ready at {}", config.server.db_path.display());

    let host: IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host: {}", config.server.host))?;

    let (liveness_shutdown, _) =
        health::start_server(SocketAddr::new(host, config.server.port)).await?;

    let api_shutdown = if config.server.api_enabled {
        let (tx, _) =
            api::start_server(db.clone(), SocketAddr::new(host, config.server.api_port)).await?;
        Some(tx)
    } else {
        info!("REST API disabled");
        None
    };

    let poll_timeout = Duration::from_secs(config.bot.poll_timeout_seconds);
    let bot = connect(&token, poll_timeout)?;
    let me = bot
        .get_me()
        .await
        .context("Telegram rejected the bot token")?;
    info!("Authorized as @{}", me.username());

    let sessions = Arc::new(InMemorySessionStore::new(config.bot.session_ttl()));
    let transport = Arc::new(TelegramTransport::new(bot.clone()));
    let handler = Arc::new(ChatHandler::new(db, transport, sessions));

    // Returns once Ctrl-C stops the dispatcher
    run_polling(bot, handler, poll_timeout).await;

    let _ = liveness_shutdown.send(());
    if let Some(tx) = api_shutdown {
        let _ = tx.send(());
    }

    Ok(())
}
