//! HTTP routes.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::app::App;

pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
}

async fn health() -> &'static str {
    "OK"
}
