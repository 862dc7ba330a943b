// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./repliq.toml` > `~/.config/repliq/repliq.toml`
//! > `/etc/repliq/repliq.toml` with environment overrides via the
//! `REPLIQ_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::RepliqConfig;

/// Load configuration from the standard XDG hierarchy with env overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/repliq/repliq.toml`
/// 3. `~/.config/repliq/repliq.toml`
/// 4. `./repliq.toml`
/// 5. `REPLIQ_*` environment variables
pub fn load_config() -> Result<RepliqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RepliqConfig::default()))
        .merge(Toml::file("/etc/repliq/repliq.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("repliq/repliq.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("repliq.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (tests and tooling).
pub fn load_config_from_str(toml_content: &str) -> Result<RepliqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RepliqConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env overrides.
pub fn load_config_from_path(path: &Path) -> Result<RepliqConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RepliqConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Environment variable provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` so underscore-containing
/// key names stay unambiguous: `REPLIQ_GATEWAY_SHARED_SECRET` must map to
/// `gateway.shared_secret`, not `gateway.shared.secret`.
fn env_provider() -> Env {
    Env::prefixed("REPLIQ_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("gateway_", "gateway.", 1)
            .replacen("poller_", "poller.", 1)
            .replacen("pacing_", "pacing.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("vault_", "vault.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
            [gateway]
            port = 9000
            shared_secret = "s3cret"

            [poller]
            budget_secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.shared_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.poller.budget_secs, 30);
        // Untouched sections keep defaults.
        assert_eq!(config.poller.ledger_capacity, 200);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.storage.database_path, "repliq.db");
        assert_eq!(config.pacing.action_gap_min_secs, 2);
    }

    #[test]
    fn invalid_types_are_rejected() {
        let result = load_config_from_str(
            r#"
            [poller]
            budget_secs = "not a number"
            "#,
        );
        assert!(result.is_err());
    }
}
