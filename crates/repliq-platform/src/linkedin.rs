// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LinkedIn REST adapter.
//!
//! Comment listing goes through the `socialActions` API keyed by post URN.
//! Replies need the acting member's URN, which is resolved once per call
//! from `/me` since the engine holds only the access token.

use async_trait::async_trait;
use serde::Deserialize;

use repliq_core::types::{DmRecipient, IncomingComment, PostSummary, TokenGrant};
use repliq_core::{Platform, PlatformClient, RepliqError};

use crate::{OAuthApp, ensure_success, transport_err};

const API_BASE: &str = "https://api.linkedin.com/v2";
const OAUTH_BASE: &str = "https://www.linkedin.com/oauth/v2";

#[derive(Debug, Clone)]
pub struct LinkedInClient {
    http: reqwest::Client,
    base_url: String,
    oauth_url: String,
    oauth: Option<OAuthApp>,
}

impl LinkedInClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
            oauth_url: OAUTH_BASE.to_string(),
            oauth: None,
        }
    }

    /// Overrides both API and OAuth base URLs (local stub servers in tests).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.oauth_url = url.clone();
        self.base_url = url;
        self
    }

    pub fn with_oauth(mut self, oauth: OAuthApp) -> Self {
        self.oauth = Some(oauth);
        self
    }

    async fn actor_urn(&self, access_token: &str) -> Result<String, RepliqError> {
        #[derive(Deserialize)]
        struct Me {
            id: String,
        }
        let url = format!("{}/me", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "resolve actor", e))?;
        let resp = ensure_success(Platform::LinkedIn, "resolve actor", resp).await?;
        let me: Me = resp
            .json()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "resolve actor: decode", e))?;
        Ok(format!("urn:li:person:{}", me.id))
    }
}

#[derive(Debug, Deserialize)]
struct Elements<T> {
    #[serde(default = "Vec::new")]
    elements: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct UgcPost {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CommentMessage {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct SocialComment {
    /// URN of the comment itself.
    #[serde(rename = "$URN", default)]
    urn: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    actor: Option<String>,
    #[serde(default)]
    message: Option<CommentMessage>,
    #[serde(default, alias = "parentCommentUrn")]
    parent_comment: Option<String>,
}

/// Normalize one socialActions comment into the engine's event shape.
fn to_incoming(post_urn: &str, c: SocialComment) -> IncomingComment {
    let external_id = c.urn.or(c.id).unwrap_or_default();
    IncomingComment {
        external_id,
        parent_id: c.parent_comment,
        author_id: c.actor.unwrap_or_default(),
        author_username: None,
        text: c.message.map(|m| m.text).unwrap_or_default(),
        post_id: Some(post_urn.to_string()),
        platform: Platform::LinkedIn,
    }
}

#[async_trait]
impl PlatformClient for LinkedInClient {
    fn platform(&self) -> Platform {
        Platform::LinkedIn
    }

    async fn list_posts(
        &self,
        access_token: &str,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<PostSummary>, RepliqError> {
        let url = format!("{}/ugcPosts", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("q", "authors"),
                ("authors", &format!("List({account_id})")),
                ("count", &limit.to_string()),
                ("sortBy", "LAST_MODIFIED"),
            ])
            .send()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "list posts", e))?;
        let resp = ensure_success(Platform::LinkedIn, "list posts", resp).await?;
        let page: Elements<UgcPost> = resp
            .json()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "list posts: decode", e))?;
        Ok(page
            .elements
            .into_iter()
            .map(|p| PostSummary {
                permalink: Some(format!("https://www.linkedin.com/feed/update/{}", p.id)),
                id: p.id,
            })
            .collect())
    }

    async fn list_comments(
        &self,
        access_token: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<IncomingComment>, RepliqError> {
        let url = format!("{}/socialActions/{}/comments", self.base_url, post_id);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("count", &limit.to_string())])
            .send()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "list comments", e))?;
        let resp = ensure_success(Platform::LinkedIn, "list comments", resp).await?;
        let page: Elements<SocialComment> = resp
            .json()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "list comments: decode", e))?;
        Ok(page
            .elements
            .into_iter()
            .map(|c| to_incoming(post_id, c))
            .collect())
    }

    async fn reply(
        &self,
        access_token: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<(), RepliqError> {
        let actor = self.actor_urn(access_token).await?;
        let url = format!("{}/socialActions/{}/comments", self.base_url, comment_id);
        let body = serde_json::json!({
            "actor": actor,
            "message": { "text": text },
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "reply", e))?;
        ensure_success(Platform::LinkedIn, "reply", resp).await?;
        Ok(())
    }

    async fn send_dm(
        &self,
        access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError> {
        let url = format!("{}/messages", self.base_url);
        let body = serde_json::json!({
            "recipients": [recipient.user_id],
            "message": { "body": text },
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "send dm", e))?;
        ensure_success(Platform::LinkedIn, "send dm", resp).await?;
        Ok(())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, RepliqError> {
        let oauth = self
            .oauth
            .as_ref()
            .ok_or_else(|| RepliqError::Token("token refresh requires app credentials".into()))?;
        let url = format!("{}/accessToken", self.oauth_url);
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &oauth.client_id),
                ("client_secret", &oauth.client_secret),
            ])
            .send()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "refresh token", e))?;
        let resp = ensure_success(Platform::LinkedIn, "refresh token", resp).await?;
        resp.json()
            .await
            .map_err(|e| transport_err(Platform::LinkedIn, "refresh token: decode", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_normalizes_with_parent_urn() {
        let raw = r#"{
            "$URN": "urn:li:comment:(urn:li:ugcPost:9,201)",
            "actor": "urn:li:person:abc",
            "message": { "text": "interested, more info?" },
            "parentCommentUrn": "urn:li:comment:(urn:li:ugcPost:9,200)"
        }"#;
        let c: SocialComment = serde_json::from_str(raw).unwrap();
        let incoming = to_incoming("urn:li:ugcPost:9", c);
        assert_eq!(incoming.external_id, "urn:li:comment:(urn:li:ugcPost:9,201)");
        assert_eq!(
            incoming.parent_id.as_deref(),
            Some("urn:li:comment:(urn:li:ugcPost:9,200)")
        );
        assert_eq!(incoming.author_id, "urn:li:person:abc");
        assert_eq!(incoming.text, "interested, more info?");
        assert!(incoming.author_username.is_none());
    }

    #[test]
    fn comment_falls_back_to_id_field() {
        let raw = r#"{ "id": "c-7", "message": { "text": "info" } }"#;
        let c: SocialComment = serde_json::from_str(raw).unwrap();
        let incoming = to_incoming("urn:li:ugcPost:9", c);
        assert_eq!(incoming.external_id, "c-7");
        assert!(incoming.parent_id.is_none());
    }

    #[test]
    fn elements_defaults_to_empty() {
        let page: Elements<UgcPost> = serde_json::from_str("{}").unwrap();
        assert!(page.elements.is_empty());
    }
}
