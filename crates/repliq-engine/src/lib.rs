// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The Repliq engagement engine.
//!
//! Ties the pieces together: normalized deliveries from the gateway flow
//! through [`Engine::handle_delivery`], scheduled polls through
//! [`Engine::run_poll`]. Both paths share the matcher, the dedup ledger
//! reservation, and the action executor.

pub mod executor;
pub mod matcher;
pub mod pacing;
pub mod pipeline;
pub mod poller;
pub mod template;
pub mod token;

pub use pacing::Pacer;

use repliq_config::PollerConfig;
use repliq_core::types::{DeliveryOutcome, NormalizedDelivery, PollReport};
use repliq_core::{Platform, RepliqError};
use repliq_platform::ClientRegistry;
use repliq_storage::Database;
use repliq_vault::TokenCipher;

pub struct Engine {
    pub(crate) db: Database,
    pub(crate) cipher: TokenCipher,
    pub(crate) registry: ClientRegistry,
    pub(crate) pacer: Pacer,
    pub(crate) poller: PollerConfig,
}

impl Engine {
    pub fn new(
        db: Database,
        cipher: TokenCipher,
        registry: ClientRegistry,
        pacer: Pacer,
        poller: PollerConfig,
    ) -> Self {
        Self {
            db,
            cipher,
            registry,
            pacer,
            poller,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Process one normalized webhook delivery end to end.
    pub async fn handle_delivery(
        &self,
        delivery: NormalizedDelivery,
    ) -> Result<DeliveryOutcome, RepliqError> {
        pipeline::handle_delivery(self, delivery).await
    }

    /// Run one bounded poll cycle for a platform.
    pub async fn run_poll(&self, platform: Platform) -> Result<PollReport, RepliqError> {
        poller::run_poll(self, platform).await
    }
}
