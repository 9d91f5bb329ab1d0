//! # loopctld: loop control daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars) and initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct storage, pump and profile implementations (adapters)
//! - Construct the loop controller, injecting adapters via port traits
//! - Forward inbound bus events to the controller
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use loopctl_adapter_http_axum::router;
use loopctl_adapter_http_axum::state::AppState;
use loopctl_adapter_storage_sqlite_sqlx::{
    SqliteOfflineEventStore, SqliteSettingsStore, pool::Config as StorageConfig,
};
use loopctl_adapter_virtual::{StaticProfileProvider, VirtualPump};
use loopctl_app::event_bus::InProcessEventBus;
use loopctl_app::notice_board::NoticeBoard;
use loopctl_app::ports::SystemClock;
use loopctl_app::services::confirmation::ConfirmationGateway;
use loopctl_app::services::constraint_evaluator::ObjectivesEvaluator;
use loopctl_app::services::loop_state_store::LoopStateStore;
use loopctl_app::services::mode_controller::{ControllerSettings, ModeController, forward_events};
use loopctl_domain::profile::Profile;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await
    .context("failed to open database")?;
    let pool = db.pool().clone();

    // Adapters
    let settings = SqliteSettingsStore::new(pool.clone());
    let offline_events = Arc::new(SqliteOfflineEventStore::new(pool));
    let pump = Arc::new(VirtualPump::new(config.pump.virtual_pump()));
    let profiles = StaticProfileProvider::new(config.profile.name.clone().map(Profile::new));

    // In-process infrastructure
    let event_bus = Arc::new(InProcessEventBus::new(256));
    let notices = Arc::new(NoticeBoard::new(64));

    // Loop control
    let constraints =
        ObjectivesEvaluator::new(settings.clone(), config.control.closed_loop_permitted);
    let loop_state = LoopStateStore::load(settings, SystemClock)
        .await
        .context("failed to load loop state")?;
    let controller = Arc::new(
        ModeController::new(
            loop_state,
            constraints,
            profiles,
            pump,
            Arc::clone(&offline_events),
            Arc::clone(&event_bus),
            Arc::clone(&notices),
        )
        .with_settings(ControllerSettings {
            unknown_offline_minutes: config.control.unknown_offline_minutes,
        }),
    );

    let listener_control = Arc::clone(&controller);
    let inbound = event_bus.subscribe();
    tokio::spawn(async move {
        forward_events(listener_control.as_ref(), inbound).await;
    });

    // HTTP
    let state = AppState::new(
        controller,
        ConfirmationGateway::new(config.control.confirmation_required),
        offline_events,
        event_bus,
        notices,
    );
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, "loopctld listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("loopctld stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
