//! CLI command definitions for task-tracker-bot
//!
//! This module defines the CLI structure using clap's derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Telegram task tracker bot with a REST API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (default: ./task-bot.yaml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<PathBuf>,

    /// Port for the liveness endpoint (overrides PORT)
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Port for the REST API (overrides API_PORT)
    #[arg(long, global = true)]
    pub api_port: Option<u16>,

    /// Do not serve the REST API
    #[arg(long, global = true)]
    pub no_api: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the bot, the liveness endpoint and the REST API (default)
    Serve,

    /// Print task statistics from the database and exit
    Stats,
}
