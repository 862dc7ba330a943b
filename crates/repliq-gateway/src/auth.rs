// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request authentication for the guarded gateway routes.
//!
//! Two independent checks: the `x-webhook-secret` shared secret on every
//! guarded route, and the optional `x-hub-signature-256` HMAC over the raw
//! webhook body. Both fail closed: an unconfigured shared secret rejects
//! everything, and a configured app secret rejects unsigned payloads.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::state::AppState;

pub const SECRET_HEADER: &str = "x-webhook-secret";
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Middleware guarding the delivery and poll routes.
pub async fn require_shared_secret(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(expected) = state.gateway.shared_secret.as_deref() else {
        warn!("shared secret not configured, rejecting guarded request");
        return Err(StatusCode::UNAUTHORIZED);
    };
    let presented = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());
    match presented {
        Some(value) if constant_time_eq(value.as_bytes(), expected.as_bytes()) => {
            Ok(next.run(request).await)
        }
        _ => {
            warn!(path = %request.uri().path(), "shared secret mismatch");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Verify a Meta-style `sha256=<hex>` HMAC signature over the raw body.
pub fn verify_hub_signature(app_secret: &str, body: &[u8], signature_header: &str) -> bool {
    let Some(hex_digest) = signature_header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(hex_digest) else {
        return false;
    };
    let mut mac = Hmac::<Sha256>::new_from_slice(app_secret.as_bytes())
        .expect("hmac accepts any key length");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn valid_signature_verifies() {
        let body = br#"{"platform":"instagram"}"#;
        let header = sign("app-secret", body);
        assert!(verify_hub_signature("app-secret", body, &header));
    }

    #[test]
    fn tampered_body_fails() {
        let header = sign("app-secret", b"original");
        assert!(!verify_hub_signature("app-secret", b"tampered", &header));
    }

    #[test]
    fn wrong_secret_fails() {
        let body = b"payload";
        let header = sign("other-secret", body);
        assert!(!verify_hub_signature("app-secret", body, &header));
    }

    #[test]
    fn malformed_headers_fail() {
        assert!(!verify_hub_signature("s", b"x", "sha1=abcd"));
        assert!(!verify_hub_signature("s", b"x", "sha256=not-hex"));
        assert!(!verify_hub_signature("s", b"x", ""));
    }

    #[test]
    fn constant_time_eq_basics() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
