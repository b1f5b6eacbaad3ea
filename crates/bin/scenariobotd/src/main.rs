//! # scenariobotd: scenariobot daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise tracing
//! - Initialize the `SQLite` connection pool and run migrations
//! - Register the built-in events and install their scenarios
//! - Construct the dispatcher, injecting repositories via port traits
//! - Tick the schedule queue
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use scenariobot_adapter_events::builtin_registry;
use scenariobot_adapter_http_axum::state::AppState;
use scenariobot_adapter_storage_sqlite_sqlx::{SqliteDictionary, SqliteHistoryRepository};
use scenariobot_app::dispatcher::ScenarioDispatcher;
use scenariobot_app::outbox::InProcessOutbox;
use scenariobot_app::ports::{ChatTransport, DictionaryRepository, HistoryRepository};
use scenariobot_app::schedule_queue::ScheduleQueue;
use scenariobot_app::services::install_service::InstallService;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = scenariobot_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let dictionary = Arc::new(SqliteDictionary::new(pool.clone()));
    let history = Arc::new(SqliteHistoryRepository::new(pool));

    // Outbound replies and scheduled commands
    let outbox = Arc::new(InProcessOutbox::new(256));
    let queue = Arc::new(ScheduleQueue::new());

    // Events
    let dispatcher_config = config.dispatcher_config();
    let registry = builtin_registry(
        Arc::clone(&outbox),
        Arc::clone(&queue),
        &dispatcher_config.repeat_alias,
    )?;
    for (alias, outcome) in InstallService::new(Arc::clone(&dictionary))
        .install_all(&registry)
        .await?
    {
        tracing::info!(%alias, %outcome, "event provisioned");
    }

    let dispatcher = Arc::new(ScenarioDispatcher::new(
        Arc::clone(&dictionary),
        Arc::clone(&history),
        Arc::clone(&outbox),
        registry,
        dispatcher_config,
    ));

    tokio::spawn(run_scheduler(
        Arc::clone(&dispatcher),
        queue,
        config.tick_interval(),
    ));
    tokio::spawn(log_replies(Arc::clone(&outbox)));

    // HTTP
    let state = AppState::new(dispatcher, history, outbox);
    let app = scenariobot_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "scenariobotd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("scenariobotd stopped");
    Ok(())
}

/// Periodically run the queued commands whose time has come.
async fn run_scheduler<D, H, T>(
    dispatcher: Arc<ScenarioDispatcher<D, H, T>>,
    queue: Arc<ScheduleQueue>,
    every: Duration,
) where
    D: DictionaryRepository + Send + Sync + 'static,
    H: HistoryRepository + Send + Sync + 'static,
    T: ChatTransport + Send + Sync + 'static,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let started = dispatcher
            .dispatch_due(&queue, scenariobot_domain::time::now())
            .await;
        if !started.is_empty() {
            tracing::debug!(count = started.len(), "scheduled commands dispatched");
        }
    }
}

/// Trace every outbound reply, so the daemon is usable without an SSE client.
async fn log_replies(outbox: Arc<InProcessOutbox>) {
    let mut replies = outbox.subscribe();
    loop {
        match replies.recv().await {
            Ok(reply) => {
                tracing::info!(channel = %reply.channel, text = %reply.text, "reply");
            }
            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "reply log lagging");
            }
            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
