// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway route handlers.

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::{info, warn};

use repliq_core::types::NormalizedDelivery;
use repliq_core::{Platform, RepliqError};

use crate::auth::{SIGNATURE_HEADER, verify_hub_signature};
use crate::state::AppState;

fn error_status(e: &RepliqError) -> StatusCode {
    match e {
        RepliqError::Auth(_) => StatusCode::UNAUTHORIZED,
        RepliqError::Validation(_) => StatusCode::BAD_REQUEST,
        RepliqError::ConnectionMissing { .. } => StatusCode::NOT_FOUND,
        RepliqError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        RepliqError::Token(_) | RepliqError::Storage { .. } | RepliqError::Config(_)
        | RepliqError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: RepliqError) -> Response {
    let status = error_status(&e);
    warn!(error = %e, status = %status, "request failed");
    (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.started.elapsed().as_secs(),
    }))
}

/// Webhook subscription verification (`GET /webhook`). Meta sends
/// `hub.mode`, `hub.verify_token` and `hub.challenge`; a matching token is
/// answered with the raw challenge.
#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    challenge: Option<String>,
}

pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    let expected = state.gateway.verify_token.as_deref();
    let subscribe = params.mode.as_deref() == Some("subscribe");
    let token_ok = expected.is_some() && params.verify_token.as_deref() == expected;
    if subscribe && token_ok {
        info!("webhook subscription verified");
        return params.challenge.unwrap_or_default().into_response();
    }
    warn!("webhook verification rejected");
    StatusCode::FORBIDDEN.into_response()
}

/// Normalized comment delivery (`POST /webhook`). The shared-secret
/// middleware has already run; the optional HMAC check covers the raw body
/// before it is parsed.
pub async fn receive_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(app_secret) = state.gateway.app_secret.as_deref() {
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !verify_hub_signature(app_secret, &body, signature) {
            return error_response(RepliqError::Auth("payload signature mismatch".to_string()));
        }
    }

    let delivery: NormalizedDelivery = match serde_json::from_slice(&body) {
        Ok(d) => d,
        Err(e) => return error_response(RepliqError::Validation(e.to_string())),
    };

    match state.engine.handle_delivery(delivery).await {
        Ok(outcome) => Json(serde_json::json!({
            "ok": true,
            "matched": outcome.matched,
            "automation_id": outcome.automation_id,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Trigger one poll run (`GET /poll/{platform}`), invoked by an external
/// scheduler.
pub async fn trigger_poll(
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Response {
    let platform = match Platform::from_str(&platform) {
        Ok(p) => p,
        Err(_) => {
            return error_response(RepliqError::Validation(format!(
                "unknown platform: {platform}"
            )));
        }
    };
    match state.engine.run_poll(platform).await {
        Ok(report) => Json(serde_json::json!({
            "ok": true,
            "processed": report.processed,
            "replies": report.replies,
            "dms_sent": report.dms_sent,
            "errors": report.errors,
            "debug": report.debug,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}
