use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tokio::time::sleep;

use goalbot::admin;
use goalbot::cli::{Cli, Commands};
use goalbot::metrics_server::start_metrics_server;
use goalbot::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps};
use goalcore::core::{config, init_logger, log_startup_configuration, metrics};
use goalcore::storage::{create_pool, get_connection};
use goalcore::{CommandRouter, SessionRegistry, SqliteStore};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, database, bot creation)
/// or an operator command fails.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from handler tasks instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // Load environment variables from .env if present
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        None | Some(Commands::Run) => run_bot().await,
        Some(Commands::Migrate) => {
            create_pool(&config::DATABASE_PATH)?;
            log::info!("Database {} is up to date", *config::DATABASE_PATH);
            Ok(())
        }
        Some(command) => {
            let pool = create_pool(&config::DATABASE_PATH)?;
            let conn = get_connection(&pool)?;
            let output = admin::execute(&conn, command)?;
            println!("{}", output);
            Ok(())
        }
    }
}

async fn run_bot() -> Result<()> {
    log::info!("Starting bot...");
    log_startup_configuration();
    metrics::init_metrics();

    let db_pool = Arc::new(
        create_pool(&config::DATABASE_PATH).map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?,
    );
    let store = Arc::new(SqliteStore::new(db_pool));
    let router = Arc::new(CommandRouter::new(
        store,
        SessionRegistry::from_config(),
        config::SITE_URL.as_str(),
    ));

    let bot = create_bot()?;
    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    match *config::METRICS_PORT {
        0 => log::info!("Metrics server disabled (METRICS_PORT=0)"),
        port => {
            tokio::spawn(async move {
                if let Err(e) = start_metrics_server(port).await {
                    log::error!("Metrics server error: {}", e);
                }
            });
        }
    }

    // Sessions live in the router, so they survive dispatcher restarts
    let deps = HandlerDeps::new(router);
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;
    let mut retry_count = 0;

    loop {
        let handler = schema(deps.clone());
        let bot_clone = bot.clone();

        let handle = tokio::spawn(async move {
            // Create polling listener that drops pending updates on start
            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) if join_err.is_panic() && retry_count < max_retries => {
                retry_count += 1;
                log::error!(
                    "Dispatcher panicked: {}. Restarting (attempt {}/{})...",
                    join_err,
                    retry_count,
                    max_retries
                );
                sleep(config::retry::dispatcher_delay()).await;
            }
            Err(join_err) => {
                log::error!("Dispatcher stopped: {}. Exiting...", join_err);
                break;
            }
        }
    }

    Ok(())
}
