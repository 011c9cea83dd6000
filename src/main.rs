//! Todo service server
//!
//! Serves the todo REST API, backed by MongoDB or an in-memory store.

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use todo_service::api::start_server;
use todo_service::core::config::StorageType;
use todo_service::core::logging::init_tracing;
use todo_service::core::{create_app_state, AppState, Config};
use todo_service::storage::connect_store;
use todo_service::todo::demo_todos;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("todo-server")
        .version(todo_service::VERSION)
        .about("REST backend for todo entries.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address")
        )
        .arg(
            Arg::new("storage-type")
                .long("storage-type")
                .value_name("TYPE")
                .help("Storage backend type (memory, mongo)")
        )
        .arg(
            Arg::new("mongo-uri")
                .long("mongo-uri")
                .value_name("URI")
                .help("MongoDB connection string")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .action(ArgAction::SetTrue)
                .help("Upsert the sample todos at startup")
        )
        .get_matches();

    let mut config = Config::load(matches.get_one::<String>("config").map(String::as_str))
        .context("Failed to load configuration")?;
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    init_tracing(&config.logging)?;
    info!("Starting {} v{}", todo_service::NAME, todo_service::VERSION);

    let addr = config.server.http_addr;
    let state = create_app_state(config);

    // Requests are answered with 503 until storage is open
    let (failed_tx, failed_rx) = oneshot::channel::<()>();
    let startup_state = state.clone();
    let startup = tokio::spawn(async move {
        let result = open_storage(&startup_state).await;
        if let Err(e) = &result {
            error!("Storage startup failed: {}", e);
            let _ = failed_tx.send(());
        }
        result
    });

    let shutdown = async move {
        tokio::select! {
            _ = shutdown_signal() => {}
            Ok(()) = failed_rx => warn!("Shutting down after storage startup failure"),
        }
    };

    start_server(addr, state.clone(), shutdown)
        .await
        .context("HTTP server failed")?;
    state.store.close();

    if startup.is_finished() {
        startup.await??;
    } else {
        startup.abort();
    }

    info!("Shutdown complete");
    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> anyhow::Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr
            .parse()
            .with_context(|| format!("Invalid HTTP address: {}", addr))?;
    }

    if let Some(storage_type) = matches.get_one::<String>("storage-type") {
        config.storage.storage_type = storage_type.parse::<StorageType>()?;
    }

    if let Some(uri) = matches.get_one::<String>("mongo-uri") {
        config.storage.mongo_uri = uri.clone();
    }

    if let Some(level) = matches.get_one::<String>("log-level") {
        config.logging.level = level.clone();
    }

    if matches.get_flag("seed") {
        config.storage.seed_demo_data = true;
    }

    Ok(())
}

/// Connect the configured backend, then seed it if asked to
async fn open_storage(state: &AppState) -> todo_service::Result<()> {
    connect_store(&state.store, &state.config.storage).await?;
    if state.config.storage.seed_demo_data {
        state.todos.seed(&demo_todos()).await?;
    }
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
