// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-to-adapter dispatch table.

use std::collections::HashMap;
use std::sync::Arc;

use repliq_core::{Platform, PlatformClient, RepliqError};

use crate::{LinkedInClient, MetaGraphClient, TwitterClient};

/// Maps each [`Platform`] to its adapter. Built once at startup and shared
/// by the gateway and the poller.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: HashMap<Platform, Arc<dyn PlatformClient>>,
}

impl ClientRegistry {
    /// A registry with no adapters. Tests register mocks into this.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The production set: Meta Graph for Instagram and Facebook, plus the
    /// LinkedIn and Twitter adapters, all sharing one HTTP client.
    pub fn with_defaults(http: reqwest::Client) -> Self {
        let mut registry = Self::empty();
        registry.insert(Arc::new(MetaGraphClient::new(
            http.clone(),
            Platform::Instagram,
        )));
        registry.insert(Arc::new(MetaGraphClient::new(
            http.clone(),
            Platform::Facebook,
        )));
        registry.insert(Arc::new(LinkedInClient::new(http.clone())));
        registry.insert(Arc::new(TwitterClient::new(http)));
        registry
    }

    /// Registers an adapter under its own reported platform, replacing any
    /// previous one.
    pub fn insert(&mut self, client: Arc<dyn PlatformClient>) {
        self.clients.insert(client.platform(), client);
    }

    pub fn get(&self, platform: Platform) -> Result<Arc<dyn PlatformClient>, RepliqError> {
        self.clients
            .get(&platform)
            .cloned()
            .ok_or_else(|| RepliqError::Validation(format!("unsupported platform: {platform}")))
    }

    pub fn platforms(&self) -> Vec<Platform> {
        self.clients.keys().copied().collect()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("platforms", &self.platforms())
            .finish()
    }
}
