//! Liveness endpoint

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::http::response::{success, Envelope};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
async fn health() -> Json<Envelope<HealthStatus>> {
    success(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
