//! # pageforged — pageforge daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct repository and outbound adapter implementations
//! - Construct the automation service and engine, injecting via port traits
//! - Run the event loop and schedule ticker as background tasks
//! - Build the axum router, bind to a TCP port, and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use pageforge_adapter_http_axum::state::AppState;
use pageforge_adapter_outbound_reqwest::{HttpRelayMailer, ReqwestWebhookDispatcher};
use pageforge_adapter_storage_sqlite_sqlx::{
    Config as DbConfig, SqliteAutomationRepository, SqliteExecutionLog,
};
use pageforge_app::automation_engine::{AutomationEngine, EngineConfig};
use pageforge_app::event_bus::InProcessEventBus;
use pageforge_app::services::automation_service::AutomationService;

use crate::config::Config;

/// How often the schedule ticker checks cron expressions. Well under a
/// minute so a due minute is never skipped.
const TICK_INTERVAL: Duration = Duration::from_secs(20);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(config.logging.filter.clone())
        .init();

    // Database
    let db = DbConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(256));

    // Outbound delivery
    let mut mailer = HttpRelayMailer::new(config.outbound.mail_relay_url.clone());
    if let Some(key) = &config.outbound.mail_relay_api_key {
        mailer = mailer.with_api_key(key.clone());
    }
    let webhooks = ReqwestWebhookDispatcher::new();

    // Engine
    let engine = Arc::new(AutomationEngine::with_config(
        SqliteAutomationRepository::new(pool.clone()),
        mailer,
        webhooks,
        SqliteExecutionLog::new(pool.clone()),
        Arc::clone(&event_bus),
        EngineConfig {
            action_timeout: Duration::from_secs(config.outbound.action_timeout_secs),
        },
    ));

    // Service
    let automation_service = Arc::new(AutomationService::new(
        SqliteAutomationRepository::new(pool.clone()),
        SqliteExecutionLog::new(pool),
    ));

    // Event loop: drive the engine from the bus
    let mut events = event_bus.subscribe();
    let event_engine = Arc::clone(&engine);
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(err) = event_engine.process_event(&event).await {
                        tracing::error!(error = %err, "event processing failed");
                    }
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event loop lagged behind the bus");
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Schedule ticker: drive cron triggers
    let tick_engine = Arc::clone(&engine);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            interval.tick().await;
            if let Err(err) = tick_engine.process_tick(pageforge_domain::time::now()).await {
                tracing::error!(error = %err, "schedule tick failed");
            }
        }
    });

    // HTTP
    let state = AppState::new(automation_service, engine);
    let app = pageforge_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    tracing::info!(%bind_addr, "pageforged listening");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => tracing::error!(error = %err, "failed to install sigterm handler"),
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
