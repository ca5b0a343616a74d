//! Task Tracker Bot Library
//!
//! A Telegram bot and a REST API sharing one SQLite task store.

pub mod api;
pub mod bot;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod health;
pub mod http;
pub mod logging;
pub mod types;
