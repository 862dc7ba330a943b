// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server startup.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;
use tracing::info;

use repliq_core::RepliqError;

use crate::auth::require_shared_secret;
use crate::handlers;
use crate::state::AppState;

/// Build the gateway router. The verification handshake and the health
/// probe are public; delivery and poll routes sit behind the shared
/// secret.
pub fn build_router(state: AppState) -> Router {
    let guarded = Router::new()
        .route("/webhook", post(handlers::receive_delivery))
        .route("/poll/{platform}", get(handlers::trigger_poll))
        .route_layer(from_fn_with_state(state.clone(), require_shared_secret));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/webhook", get(handlers::verify_webhook))
        .merge(guarded)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn start_server(state: AppState) -> Result<(), RepliqError> {
    let addr = format!("{}:{}", state.gateway.host, state.gateway.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RepliqError::Config(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "gateway listening");

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .map_err(|e| RepliqError::Internal(format!("server error: {e}")))
}
