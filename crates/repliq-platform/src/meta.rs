// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Meta Graph API adapter serving both Instagram and Facebook.
//!
//! The two platforms share one API surface with slightly different edge
//! names (IG `media`/`replies` vs FB `posts`/`comments`). The DM fallback
//! is the page `private_replies` edge, which addresses the comment rather
//! than the commenter and works where a standing messaging window is
//! missing.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use repliq_core::types::{DmRecipient, IncomingComment, PostSummary, TokenGrant};
use repliq_core::{Platform, PlatformClient, RepliqError};

use crate::{OAuthApp, ensure_success, transport_err};

const GRAPH_BASE: &str = "https://graph.facebook.com/v23.0";

/// Graph API client for Instagram or Facebook, per the `platform` it was
/// constructed with.
#[derive(Debug, Clone)]
pub struct MetaGraphClient {
    http: reqwest::Client,
    base_url: String,
    platform: Platform,
    oauth: Option<OAuthApp>,
}

impl MetaGraphClient {
    pub fn new(http: reqwest::Client, platform: Platform) -> Self {
        Self {
            http,
            base_url: GRAPH_BASE.to_string(),
            platform,
            oauth: None,
        }
    }

    /// Overrides the base URL (local stub servers in tests).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    /// App credentials for long-lived token exchange.
    pub fn with_oauth(mut self, oauth: OAuthApp) -> Self {
        self.oauth = Some(oauth);
        self
    }

    fn posts_edge(&self) -> (&'static str, &'static str) {
        match self.platform {
            Platform::Instagram => ("media", "id,permalink"),
            _ => ("posts", "id,permalink_url"),
        }
    }

    fn reply_edge(&self) -> &'static str {
        match self.platform {
            Platform::Instagram => "replies",
            _ => "comments",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Paged<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GraphPost {
    id: String,
    #[serde(default)]
    permalink: Option<String>,
    #[serde(default)]
    permalink_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphFrom {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphParent {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphComment {
    id: String,
    /// FB uses `message`, IG uses `text`.
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    from: Option<GraphFrom>,
    #[serde(default)]
    parent: Option<GraphParent>,
    /// IG surfaces the commenter's username at the top level.
    #[serde(default)]
    username: Option<String>,
}

/// Normalize one Graph comment object into the engine's event shape.
fn to_incoming(platform: Platform, post_id: &str, c: GraphComment) -> IncomingComment {
    let from = c.from;
    let author_id = from
        .as_ref()
        .and_then(|f| f.id.clone())
        .unwrap_or_default();
    let author_username = c
        .username
        .or_else(|| from.as_ref().and_then(|f| f.username.clone()))
        .or_else(|| from.and_then(|f| f.name));
    IncomingComment {
        external_id: c.id,
        parent_id: c.parent.map(|p| p.id),
        author_id,
        author_username,
        text: c.message.or(c.text).unwrap_or_default(),
        post_id: Some(post_id.to_string()),
        platform,
    }
}

#[async_trait]
impl PlatformClient for MetaGraphClient {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn list_posts(
        &self,
        access_token: &str,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<PostSummary>, RepliqError> {
        let (edge, fields) = self.posts_edge();
        let url = format!("{}/{}/{}", self.base_url, account_id, edge);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("fields", fields),
                ("limit", &limit.to_string()),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| transport_err(self.platform, "list posts", e))?;
        let resp = ensure_success(self.platform, "list posts", resp).await?;
        let page: Paged<GraphPost> = resp
            .json()
            .await
            .map_err(|e| transport_err(self.platform, "list posts: decode", e))?;
        debug!(count = page.data.len(), account_id, "fetched recent posts");
        Ok(page
            .data
            .into_iter()
            .map(|p| PostSummary {
                id: p.id,
                permalink: p.permalink.or(p.permalink_url),
            })
            .collect())
    }

    async fn list_comments(
        &self,
        access_token: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<IncomingComment>, RepliqError> {
        let url = format!("{}/{}/comments", self.base_url, post_id);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("fields", "id,message,text,from,parent,username"),
                ("limit", &limit.to_string()),
                ("access_token", access_token),
            ])
            .send()
            .await
            .map_err(|e| transport_err(self.platform, "list comments", e))?;
        let resp = ensure_success(self.platform, "list comments", resp).await?;
        let page: Paged<GraphComment> = resp
            .json()
            .await
            .map_err(|e| transport_err(self.platform, "list comments: decode", e))?;
        Ok(page
            .data
            .into_iter()
            .map(|c| to_incoming(self.platform, post_id, c))
            .collect())
    }

    async fn reply(
        &self,
        access_token: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<(), RepliqError> {
        let url = format!("{}/{}/{}", self.base_url, comment_id, self.reply_edge());
        let resp = self
            .http
            .post(&url)
            .form(&[("message", text), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| transport_err(self.platform, "reply", e))?;
        ensure_success(self.platform, "reply", resp).await?;
        Ok(())
    }

    async fn send_dm(
        &self,
        access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError> {
        let url = format!("{}/me/messages", self.base_url);
        let body = serde_json::json!({
            "recipient": { "id": recipient.user_id },
            "message": { "text": text },
            "messaging_type": "RESPONSE",
        });
        let resp = self
            .http
            .post(&url)
            .query(&[("access_token", access_token)])
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(self.platform, "send dm", e))?;
        ensure_success(self.platform, "send dm", resp).await?;
        Ok(())
    }

    async fn send_dm_fallback(
        &self,
        access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError> {
        // Private replies address the comment, not the user, so they work
        // without an open messaging window.
        let comment_id = recipient.comment_id.as_deref().ok_or_else(|| {
            RepliqError::upstream(self.platform, "private reply requires a comment id")
        })?;
        let url = format!("{}/{}/private_replies", self.base_url, comment_id);
        let resp = self
            .http
            .post(&url)
            .form(&[("message", text), ("access_token", access_token)])
            .send()
            .await
            .map_err(|e| transport_err(self.platform, "private reply", e))?;
        ensure_success(self.platform, "private reply", resp).await?;
        Ok(())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, RepliqError> {
        let oauth = self
            .oauth
            .as_ref()
            .ok_or_else(|| RepliqError::Token("token refresh requires app credentials".into()))?;
        let url = format!("{}/oauth/access_token", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("grant_type", "fb_exchange_token"),
                ("client_id", &oauth.client_id),
                ("client_secret", &oauth.client_secret),
                ("fb_exchange_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| transport_err(self.platform, "refresh token", e))?;
        let resp = ensure_success(self.platform, "refresh token", resp).await?;
        resp.json()
            .await
            .map_err(|e| transport_err(self.platform, "refresh token: decode", e))
    }
}
