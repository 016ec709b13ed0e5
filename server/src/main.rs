mod auth;
mod config;
mod error;
mod routes;

use adapters::{AdapterConfig, CompetitionFormatsClient, EventsClient, TokenProvider, UsersClient};
use anyhow::Result;
use axum::{Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use config::ServerConfig;
use db_memory::MemoryDb;
use race_core::{CoreBuilder, CoreHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_error::ErrorLayer;
use tracing_log::LogTracer;
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

fn init_tracing_bunyan() -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,axum=info"));

    // Name identifies the service in log streams
    let formatting_layer = BunyanFormattingLayer::new(
        "race-service".into(),
        std::io::stdout, // single sink: JSON to stdout; no other outputs supported
    );

    // Build a Bunyan-only subscriber:
    // - JsonStorageLayer: propagates span fields to child events
    // - BunyanFormattingLayer: strict Bunyan JSON output
    // - ErrorLayer: enrich errors with span context
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .with(ErrorLayer::default());

    // Set as the single global subscriber (no fallback to fmt/console)
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub core: CoreHandle,
}

// --- /health (service liveness) ---
#[instrument(name = "health")]
async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

// --- /health/db (database readiness) ---
#[derive(Serialize)]
struct DbStatus {
    db: &'static str,
}

#[instrument(name = "health_db", skip(app_state))]
async fn health_db(State(app_state): State<AppState>) -> impl IntoResponse {
    match app_state.core.database.ping_db().await {
        Ok(_) => (StatusCode::OK, axum::Json(DbStatus { db: "ok" })),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            axum::Json(DbStatus { db: "down" }),
        ),
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    // Load .env first if present; ignore if missing (Docker sets envs)
    let _ = dotenvy::dotenv();
    // map all log! calls in dependencies to tracing
    LogTracer::init()?;
    // Initialize Bunyan-only tracing before constructing anything else.
    init_tracing_bunyan()?;

    let server_config = ServerConfig::from_env()?;
    let adapter_config = AdapterConfig::from_env()?;

    // one pooled client shared by every adapter
    let http = reqwest::Client::new();
    let users = Arc::new(UsersClient::new(adapter_config.users_base_url.clone(), http.clone()));
    let tokens = TokenProvider::new(
        users.clone(),
        adapter_config.admin_username.clone(),
        adapter_config.admin_password.clone(),
    );
    let events = Arc::new(EventsClient::new(
        adapter_config.events_base_url.clone(),
        http.clone(),
        tokens.clone(),
    ));
    let formats = Arc::new(CompetitionFormatsClient::new(
        adapter_config.formats_base_url.clone(),
        http,
        tokens,
    ));

    let core = CoreBuilder::new()
        .set_db(Arc::new(MemoryDb::new()))
        .set_events(events)
        .set_formats(formats)
        .set_users(users)
        .build();
    let app_state = AppState {
        core: Arc::new(core),
    };

    let app = Router::new()
        .route("/health", get(health))
        .route("/health/db", get(health_db))
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr = format!("{}:{}", server_config.host, server_config.port);
    info!(%addr, "listening on http server");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
