// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Randomized action pacing.
//!
//! Automated actions are spaced with jittered pauses so the outbound
//! traffic does not look mechanical: a short gap between a public reply
//! and its follow-up DM, a longer gap between distinct comments in a poll
//! cycle. Tests disable pacing entirely.

use std::time::Duration;

use repliq_config::PacingConfig;

use crate::template::sample_secs;

#[derive(Debug, Clone)]
pub struct Pacer {
    action_gap: (u64, u64),
    comment_gap: (u64, u64),
    enabled: bool,
}

impl Pacer {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            action_gap: (config.action_gap_min_secs, config.action_gap_max_secs),
            comment_gap: (config.comment_gap_min_secs, config.comment_gap_max_secs),
            enabled: true,
        }
    }

    /// A pacer that never sleeps.
    pub fn disabled() -> Self {
        Self {
            action_gap: (0, 0),
            comment_gap: (0, 0),
            enabled: false,
        }
    }

    /// Pause between a public reply and the follow-up DM.
    pub async fn action_pause(&self) {
        self.pause(self.action_gap).await;
    }

    /// Pause between distinct comments' action sequences in one poll run.
    pub async fn comment_pause(&self) {
        self.pause(self.comment_gap).await;
    }

    async fn pause(&self, (min, max): (u64, u64)) {
        if !self.enabled {
            return;
        }
        let secs = sample_secs(min, max);
        if secs > 0 {
            tokio::time::sleep(Duration::from_secs(secs)).await;
        }
    }
}
