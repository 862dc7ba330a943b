// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twitter (X) v2 API adapter.
//!
//! Comments are modeled as replies inside a conversation, so listing goes
//! through recent search with a `conversation_id:` query. A reply whose
//! `replied_to` reference points at anything other than the root tweet is
//! a nested reply and carries a `parent_id`.

use async_trait::async_trait;
use serde::Deserialize;

use repliq_core::types::{DmRecipient, IncomingComment, PostSummary, TokenGrant};
use repliq_core::{Platform, PlatformClient, RepliqError};

use crate::{OAuthApp, ensure_success, transport_err};

const API_BASE: &str = "https://api.x.com/2";

#[derive(Debug, Clone)]
pub struct TwitterClient {
    http: reqwest::Client,
    base_url: String,
    oauth: Option<OAuthApp>,
}

impl TwitterClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: API_BASE.to_string(),
            oauth: None,
        }
    }

    /// Overrides the base URL (local stub servers in tests).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url;
        self
    }

    pub fn with_oauth(mut self, oauth: OAuthApp) -> Self {
        self.oauth = Some(oauth);
        self
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    includes: Option<Includes>,
}

#[derive(Debug, Deserialize, Default)]
struct Includes {
    #[serde(default)]
    users: Vec<TweetUser>,
}

#[derive(Debug, Deserialize)]
struct TweetUser {
    id: String,
    username: String,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: String,
    #[serde(default)]
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    referenced_tweets: Vec<TweetRef>,
}

#[derive(Debug, Deserialize)]
struct TweetRef {
    #[serde(rename = "type")]
    kind: String,
    id: String,
}

/// Normalize one search hit. A `replied_to` reference that is not the
/// conversation root marks the tweet as a nested reply.
fn to_incoming(conversation_id: &str, users: &[TweetUser], t: Tweet) -> IncomingComment {
    let parent_id = t
        .referenced_tweets
        .iter()
        .find(|r| r.kind == "replied_to" && r.id != conversation_id)
        .map(|r| r.id.clone());
    let author_id = t.author_id.unwrap_or_default();
    let author_username = users
        .iter()
        .find(|u| u.id == author_id)
        .map(|u| u.username.clone());
    IncomingComment {
        external_id: t.id,
        parent_id,
        author_id,
        author_username,
        text: t.text,
        post_id: Some(conversation_id.to_string()),
        platform: Platform::Twitter,
    }
}

#[async_trait]
impl PlatformClient for TwitterClient {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    async fn list_posts(
        &self,
        access_token: &str,
        account_id: &str,
        limit: u32,
    ) -> Result<Vec<PostSummary>, RepliqError> {
        let url = format!("{}/users/{}/tweets", self.base_url, account_id);
        // The endpoint rejects max_results below 5.
        let max_results = limit.clamp(5, 100).to_string();
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("max_results", max_results.as_str()), ("exclude", "replies,retweets")])
            .send()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "list posts", e))?;
        let resp = ensure_success(Platform::Twitter, "list posts", resp).await?;
        let page: Page<Tweet> = resp
            .json()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "list posts: decode", e))?;
        Ok(page
            .data
            .into_iter()
            .map(|t| PostSummary {
                permalink: Some(format!("https://x.com/i/status/{}", t.id)),
                id: t.id,
            })
            .collect())
    }

    async fn list_comments(
        &self,
        access_token: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<IncomingComment>, RepliqError> {
        let url = format!("{}/tweets/search/recent", self.base_url);
        let query = format!("conversation_id:{post_id}");
        let max_results = limit.clamp(10, 100).to_string();
        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[
                ("query", query.as_str()),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "author_id,referenced_tweets"),
                ("expansions", "author_id"),
                ("user.fields", "username"),
            ])
            .send()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "list comments", e))?;
        let resp = ensure_success(Platform::Twitter, "list comments", resp).await?;
        let page: Page<Tweet> = resp
            .json()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "list comments: decode", e))?;
        let users = page.includes.unwrap_or_default().users;
        Ok(page
            .data
            .into_iter()
            .map(|t| to_incoming(post_id, &users, t))
            .collect())
    }

    async fn reply(
        &self,
        access_token: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<(), RepliqError> {
        let url = format!("{}/tweets", self.base_url);
        let body = serde_json::json!({
            "text": text,
            "reply": { "in_reply_to_tweet_id": comment_id },
        });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "reply", e))?;
        ensure_success(Platform::Twitter, "reply", resp).await?;
        Ok(())
    }

    async fn send_dm(
        &self,
        access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError> {
        let url = format!(
            "{}/dm_conversations/with/{}/messages",
            self.base_url, recipient.user_id
        );
        let body = serde_json::json!({ "text": text });
        let resp = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "send dm", e))?;
        ensure_success(Platform::Twitter, "send dm", resp).await?;
        Ok(())
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, RepliqError> {
        let oauth = self
            .oauth
            .as_ref()
            .ok_or_else(|| RepliqError::Token("token refresh requires app credentials".into()))?;
        let url = format!("{}/oauth2/token", self.base_url);
        let resp = self
            .http
            .post(&url)
            .basic_auth(&oauth.client_id, Some(&oauth.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "refresh token", e))?;
        let resp = ensure_success(Platform::Twitter, "refresh token", resp).await?;
        resp.json()
            .await
            .map_err(|e| transport_err(Platform::Twitter, "refresh token: decode", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Vec<TweetUser> {
        vec![TweetUser {
            id: "u-1".into(),
            username: "alice_dev".into(),
        }]
    }

    #[test]
    fn direct_reply_to_root_has_no_parent() {
        let raw = r#"{
            "id": "t-2",
            "text": "INFO please",
            "author_id": "u-1",
            "referenced_tweets": [{ "type": "replied_to", "id": "t-1" }]
        }"#;
        let t: Tweet = serde_json::from_str(raw).unwrap();
        let incoming = to_incoming("t-1", &users(), t);
        assert!(incoming.parent_id.is_none());
        assert_eq!(incoming.author_username.as_deref(), Some("alice_dev"));
    }

    #[test]
    fn reply_to_another_reply_carries_parent() {
        let raw = r#"{
            "id": "t-3",
            "text": "same question",
            "author_id": "u-2",
            "referenced_tweets": [{ "type": "replied_to", "id": "t-2" }]
        }"#;
        let t: Tweet = serde_json::from_str(raw).unwrap();
        let incoming = to_incoming("t-1", &users(), t);
        assert_eq!(incoming.parent_id.as_deref(), Some("t-2"));
        assert!(incoming.author_username.is_none());
    }

    #[test]
    fn page_defaults_to_empty() {
        let page: Page<Tweet> = serde_json::from_str("{}").unwrap();
        assert!(page.data.is_empty());
        assert!(page.includes.is_none());
    }
}
