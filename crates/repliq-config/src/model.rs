// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model for the Repliq engine.
//!
//! Sections map one-to-one to TOML tables and to `REPLIQ_<SECTION>_*`
//! environment variables.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepliqConfig {
    pub gateway: GatewayConfig,
    pub poller: PollerConfig,
    pub pacing: PacingConfig,
    pub storage: StorageConfig,
    pub vault: VaultConfig,
    pub log_level: LogConfig,
}

/// HTTP gateway settings, including the webhook secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Shared secret expected in the `x-webhook-secret` header on the
    /// normalized delivery and poll-trigger endpoints. Unset means all
    /// guarded requests are rejected (fail-closed).
    pub shared_secret: Option<String>,
    /// Token echoed back during webhook subscription verification.
    pub verify_token: Option<String>,
    /// Platform app secret for `x-hub-signature-256` payload authentication.
    /// Unset disables the signature check.
    pub app_secret: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8686,
            shared_secret: None,
            verify_token: None,
            app_secret: None,
        }
    }
}

/// Poll run bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Hard wall-clock budget for one poll run, in seconds.
    pub budget_secs: u64,
    /// How many recent posts to scan when no target post is configured.
    pub posts_per_account: u32,
    /// Maximum comments fetched per post.
    pub comments_per_post: u32,
    /// Per-automation dedup ledger capacity.
    pub ledger_capacity: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            budget_secs: 120,
            posts_per_account: 10,
            comments_per_post: 50,
            ledger_capacity: 200,
        }
    }
}

/// Randomized delay ranges between automated actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Pause between a public reply and the follow-up DM, in seconds.
    pub action_gap_min_secs: u64,
    pub action_gap_max_secs: u64,
    /// Pause between distinct comments' reply+DM sequences in one poll
    /// cycle, in seconds.
    pub comment_gap_min_secs: u64,
    pub comment_gap_max_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            action_gap_min_secs: 2,
            action_gap_max_secs: 6,
            comment_gap_min_secs: 20,
            comment_gap_max_secs: 90,
        }
    }
}

/// SQLite storage location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "repliq.db".to_string(),
        }
    }
}

/// Token encryption key material.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// 32-byte AES-256-GCM key, hex encoded. Usually supplied via
    /// `REPLIQ_VAULT_KEY_HEX`.
    pub key_hex: Option<String>,
}

/// Tracing filter, e.g. "info" or "repliq_engine=debug,info".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogConfig(pub String);

impl Default for LogConfig {
    fn default() -> Self {
        Self("info".to_string())
    }
}
