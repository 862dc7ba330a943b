// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The platform capability trait.
//!
//! Every social platform is represented by one adapter implementing this
//! capability set, selected once at configuration time. The pipeline itself
//! is platform-agnostic; platform quirks (different DM fallback endpoints,
//! id formats) stay behind this boundary.

use async_trait::async_trait;

use crate::error::RepliqError;
use crate::types::{DmRecipient, IncomingComment, Platform, PostSummary, TokenGrant};

/// Capability set `{list_posts, list_comments, reply, send_dm, refresh_token}`
/// consumed by ingestion and the action executor.
#[async_trait]
pub trait PlatformClient: Send + Sync + 'static {
    /// The platform this adapter speaks for.
    fn platform(&self) -> Platform;

    /// List the account's most recent posts, newest first.
    async fn list_posts(
        &self,
        access_token: &str,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<PostSummary>, RepliqError>;

    /// List comments on one post, in the order the platform returns them.
    /// Adapters must populate `post_id` and `parent_id` on each comment.
    async fn list_comments(
        &self,
        access_token: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<IncomingComment>, RepliqError>;

    /// Post a threaded public reply under the given comment.
    async fn reply(
        &self,
        access_token: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<(), RepliqError>;

    /// Send a one-to-one direct message through the primary channel.
    async fn send_dm(
        &self,
        access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError>;

    /// Fallback DM send path, attempted once when the primary channel
    /// fails. Adapters without a fallback keep the default.
    async fn send_dm_fallback(
        &self,
        _access_token: &str,
        _recipient: &DmRecipient,
        _text: &str,
    ) -> Result<(), RepliqError> {
        Err(RepliqError::upstream(
            self.platform(),
            "no fallback DM channel",
        ))
    }

    /// Exchange a refresh token for a new access/refresh pair.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, RepliqError>;
}
