//! Taberna Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod infrastructure;
mod stores;
mod use_cases;

use api::{websocket::WsState, ConnectionManager};
use app::{App, AppConfig};
use infrastructure::{
    catalog::StaticItemCatalog,
    clock::SystemClock,
    ports::{ClockPort, ItemCatalogPort, ProgressionPort},
    progression::LoggingProgression,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taberna_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Taberna Engine");

    // Load configuration
    let config = AppConfig::from_env();
    let server_host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let server_port: u16 = std::env::var("SERVER_PORT")
        .or_else(|_| std::env::var("PORT"))
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .unwrap_or(3000);

    // Wire the ports
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let catalog: Arc<dyn ItemCatalogPort> = Arc::new(StaticItemCatalog::new());
    let progression: Arc<dyn ProgressionPort> = Arc::new(LoggingProgression::new());

    // Create connection manager
    let connections = Arc::new(ConnectionManager::new());

    // Create application
    let app = Arc::new(App::new(
        config,
        connections.clone(),
        clock,
        catalog,
        progression,
        StdRng::from_entropy(),
    ));

    // Create WebSocket state
    let ws_state = Arc::new(WsState {
        app: app.clone(),
        connections,
    });

    // Spawn the background sweeps: unanswered challenges, idle combat turns
    // and connections that stopped talking.
    let sweep_app = app.clone();
    tokio::spawn(async move {
        loop {
            sweep_app.use_cases.duel.sweep_expired().await;
            sweep_app.use_cases.combat.sweep_turn_timeouts().await;
            sweep_app.use_cases.lobby.sweep_idle().await;

            // Check every 5 seconds
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    });

    // Build router with separate states for HTTP and WebSocket
    let mut router = api::http::routes()
        .with_state(app)
        .route("/ws", get(api::websocket::ws_handler).with_state(ws_state))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer_from_env() {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{server_host}:{server_port}").parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer_from_env() -> Option<CorsLayer> {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let Some(allowed_origins) = allowed_origins else {
        return None;
    };

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // The browser client sends JSON content types which trigger CORS preflights.
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
