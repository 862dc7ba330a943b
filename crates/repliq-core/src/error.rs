// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Repliq engagement engine.

use thiserror::Error;

use crate::types::Platform;

/// The primary error type used across the Repliq workspace.
///
/// Per-item failures (one comment, one automation, one user) are converted
/// into aggregate counters by the callers and never abort a larger run.
/// A dedup hit is deliberately not an error; the ledger reserve operation
/// reports it as a boolean.
#[derive(Debug, Error)]
pub enum RepliqError {
    /// Bad shared secret or verify token. The caller must not retry with
    /// the same credentials.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Malformed inbound payload. Rejected with no side effect.
    #[error("invalid payload: {0}")]
    Validation(String),

    /// No Connection row exists for this user/platform. A skip condition,
    /// not a fatal error.
    #[error("no {platform} connection for user {user_id}")]
    ConnectionMissing { user_id: String, platform: Platform },

    /// Token decryption or refresh failure. The calling ingestion step
    /// skips the affected user/automation.
    #[error("token error: {0}")]
    Token(String),

    /// A platform API call failed. Recorded per item, counted, and the
    /// run continues.
    #[error("{platform} API error: {message}")]
    Upstream {
        platform: Platform,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure,
    /// serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RepliqError {
    /// Shorthand for an upstream platform failure without an underlying
    /// source error.
    pub fn upstream(platform: Platform, message: impl Into<String>) -> Self {
        Self::Upstream {
            platform,
            message: message.into(),
            source: None,
        }
    }
}
