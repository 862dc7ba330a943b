// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Instant;

use repliq_config::GatewayConfig;
use repliq_engine::Engine;

/// Shared state for all gateway routes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub gateway: Arc<GatewayConfig>,
    pub started: Instant,
}

impl AppState {
    pub fn new(engine: Arc<Engine>, gateway: GatewayConfig) -> Self {
        Self {
            engine,
            gateway: Arc::new(gateway),
            started: Instant::now(),
        }
    }
}
