//! Logging initialization and startup diagnostics
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup summary of the effective configuration

use anyhow::Result;
use simplelog::*;
use std::fs::File;

use crate::core::config;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup.
///
/// Secrets are never printed; only whether they are present.
pub fn log_startup_configuration() {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("goaltrack configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("DATABASE_PATH: {}", *config::DATABASE_PATH);
    log::info!("LOG_FILE_PATH: {}", *config::LOG_FILE_PATH);
    log::info!("SITE_URL: {}", *config::SITE_URL);
    log::info!("DEFAULT_LANG: {}", *config::DEFAULT_LANG);

    match config::BOT_API_URL.as_deref() {
        Some(url) => log::info!("BOT_API_URL: {}", url),
        None => log::info!("BOT_API_URL: not set (using api.telegram.org)"),
    }

    if config::BOT_TOKEN.is_empty() {
        log::error!("❌ BOT_TOKEN: not set, the bot cannot start");
    } else {
        log::info!("✅ BOT_TOKEN: set");
    }

    match *config::METRICS_PORT {
        0 => log::info!("METRICS_PORT: disabled"),
        port => log::info!("METRICS_PORT: {}", port),
    }

    match config::session::idle_timeout() {
        Some(timeout) => log::info!("Session idle timeout: {}s", timeout.as_secs()),
        None => log::info!("Session idle timeout: disabled"),
    }
}
