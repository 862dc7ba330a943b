// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform API adapters for the Repliq engagement engine.
//!
//! Each adapter implements [`repliq_core::PlatformClient`] for one social
//! platform; the [`ClientRegistry`] selects the adapter per platform at
//! configuration time so the pipeline never branches on platform names.

pub mod linkedin;
pub mod meta;
pub mod registry;
pub mod twitter;

pub use linkedin::LinkedInClient;
pub use meta::MetaGraphClient;
pub use registry::ClientRegistry;
pub use twitter::TwitterClient;

use repliq_core::{Platform, RepliqError};

/// OAuth app credentials used by token-refresh exchanges.
#[derive(Clone)]
pub struct OAuthApp {
    pub client_id: String,
    pub client_secret: String,
}

impl std::fmt::Debug for OAuthApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthApp")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .finish()
    }
}

/// Truncate an upstream error body for logging without panicking on a
/// char boundary.
pub(crate) fn truncate_body(body: &str, max_chars: usize) -> String {
    body.chars().take(max_chars).collect()
}

/// Map a reqwest transport failure into an upstream error.
pub(crate) fn transport_err(
    platform: Platform,
    context: &str,
    e: reqwest::Error,
) -> RepliqError {
    RepliqError::Upstream {
        platform,
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Reject non-2xx responses, capturing a truncated body snippet.
pub(crate) async fn ensure_success(
    platform: Platform,
    context: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, RepliqError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(RepliqError::upstream(
        platform,
        format!("{context}: HTTP {status}: {}", truncate_body(&body, 200)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let s = "héllo wörld".repeat(40);
        let t = truncate_body(&s, 200);
        assert_eq!(t.chars().count(), 200);
    }

    #[test]
    fn oauth_app_debug_redacts_secret() {
        let app = OAuthApp {
            client_id: "cid".into(),
            client_secret: "topsecret".into(),
        };
        let debug = format!("{app:?}");
        assert!(debug.contains("cid"));
        assert!(!debug.contains("topsecret"));
    }
}
