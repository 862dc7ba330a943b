// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Repliq engagement engine.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    GatewayConfig, LogConfig, PacingConfig, PollerConfig, RepliqConfig, StorageConfig, VaultConfig,
};
