//! Local HTTP playground.
//!
//! Three unauthenticated endpoints bound to loopback only: `POST /analyze`
//! (multipart CSV + brief fields), `GET /strategies` (+ `/{id}`), and
//! `GET /health`.

pub mod routes;

use anyhow::{Context, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::application::Pipeline;
use crate::infrastructure::store::StrategyStore;

/// Body cap: the CSV limit plus multipart framing slack.
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub store: Arc<StrategyStore>,
}

/// Build the playground router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/analyze", post(routes::handle_analyze))
        .route("/strategies", get(routes::handle_list))
        .route("/strategies/:id", get(routes::handle_get))
        .route("/health", get(routes::handle_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

/// Serve the playground on loopback.
pub async fn serve(pipeline: Arc<Pipeline>, store: Arc<StrategyStore>, port: u16) -> Result<()> {
    let app = router(AppState { pipeline, store });

    let addr = format!("127.0.0.1:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("playground listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
