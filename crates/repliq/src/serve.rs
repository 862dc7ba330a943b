// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring: configuration into a running engine.

use std::sync::Arc;

use tracing::info;

use repliq_config::RepliqConfig;
use repliq_core::{Platform, RepliqError};
use repliq_engine::{Engine, Pacer};
use repliq_gateway::AppState;
use repliq_platform::ClientRegistry;
use repliq_storage::Database;
use repliq_vault::TokenCipher;

async fn build_engine(config: &RepliqConfig) -> Result<Engine, RepliqError> {
    let key_hex = config
        .vault
        .key_hex
        .as_deref()
        .ok_or_else(|| RepliqError::Config("vault.key_hex is not set".to_string()))?;
    let cipher = TokenCipher::from_hex(key_hex)?;

    let db = Database::open(&config.storage.database_path).await?;
    info!(path = %config.storage.database_path, "database ready");

    let http = reqwest::Client::builder()
        .user_agent(concat!("repliq/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| RepliqError::Internal(format!("http client: {e}")))?;
    let registry = ClientRegistry::with_defaults(http);

    Ok(Engine::new(
        db,
        cipher,
        registry,
        Pacer::from_config(&config.pacing),
        config.poller.clone(),
    ))
}

/// `repliq serve`: run the gateway until shutdown.
pub async fn run(config: RepliqConfig) -> Result<(), RepliqError> {
    let engine = build_engine(&config).await?;
    let state = AppState::new(Arc::new(engine), config.gateway.clone());
    repliq_gateway::start_server(state).await
}

/// `repliq poll <platform>`: one poll cycle, report on stdout.
pub async fn poll_once(config: RepliqConfig, platform: Platform) -> Result<(), RepliqError> {
    let engine = build_engine(&config).await?;
    let report = engine.run_poll(platform).await?;
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| RepliqError::Internal(format!("report serialization: {e}")))?;
    println!("{json}");
    engine.db().close().await?;
    Ok(())
}
