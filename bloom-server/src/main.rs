//! bloom-server — multi-tenant appointment booking backend
//!
//! Long-running service that:
//! - Manages stores, treatment catalogs, resources, and timeslots
//! - Admits bookings under the five-quota model, per-store serialized
//! - Delivers lifecycle events to webhook subscribers with signed payloads

mod api;
mod auth;
mod config;
mod db;
mod dispatcher;
mod error;
mod reservation;
mod scheduling;
mod state;
mod util;

use std::net::SocketAddr;

use config::Config;
use dispatcher::{Dispatcher, EventQueue, QUEUE_CAPACITY};
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bloom_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env();

    tracing::info!("Starting bloom-server (env: {})", config.environment);

    let (events, event_rx) = EventQueue::new(QUEUE_CAPACITY);

    // Initialize application state (connects to Postgres, runs migrations)
    let state = AppState::new(&config, events).await?;

    // Event dispatcher worker; exits once the queue closes on shutdown
    let worker = Dispatcher::new(state.pool.clone());
    tokio::spawn(worker.run(event_rx));

    // Periodic rate limiter cleanup (every 5 minutes)
    let rate_limiter = state.rate_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            rate_limiter.cleanup();
        }
    });

    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("bloom-server listening on {addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown signal received, draining");
}
