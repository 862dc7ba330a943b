// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! An in-memory [`PlatformClient`] with injectable fixtures and failure
//! switches. Captured replies and DMs let tests assert on the exact
//! outbound actions the engine took.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use repliq_core::types::{DmRecipient, IncomingComment, PostSummary, TokenGrant};
use repliq_core::{Platform, PlatformClient, RepliqError};

#[derive(Default)]
struct MockState {
    posts: Vec<PostSummary>,
    comments: HashMap<String, Vec<IncomingComment>>,
    failing_comment_posts: HashSet<String>,
    replies: Vec<(String, String)>,
    dms: Vec<(String, String)>,
    fallback_dms: Vec<(String, String)>,
    refresh_calls: u32,
    refresh_grant: Option<TokenGrant>,
}

pub struct MockPlatform {
    platform: Platform,
    state: Mutex<MockState>,
    pub fail_list_posts: AtomicBool,
    pub fail_list_comments: AtomicBool,
    pub fail_reply: AtomicBool,
    pub fail_dm_primary: AtomicBool,
    pub fail_dm_fallback: AtomicBool,
    pub fail_refresh: AtomicBool,
}

impl MockPlatform {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: Mutex::new(MockState::default()),
            fail_list_posts: AtomicBool::new(false),
            fail_list_comments: AtomicBool::new(false),
            fail_reply: AtomicBool::new(false),
            fail_dm_primary: AtomicBool::new(false),
            fail_dm_fallback: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
        }
    }

    pub fn push_post(&self, id: &str) {
        self.state.lock().unwrap().posts.push(PostSummary {
            id: id.to_string(),
            permalink: Some(format!("https://example.test/p/{id}")),
        });
    }

    pub fn set_comments(&self, post_id: &str, comments: Vec<IncomingComment>) {
        self.state
            .lock()
            .unwrap()
            .comments
            .insert(post_id.to_string(), comments);
    }

    /// Make [`PlatformClient::list_comments`] fail for `post_id` only,
    /// leaving other posts readable.
    pub fn fail_comments_for(&self, post_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_comment_posts
            .insert(post_id.to_string());
    }

    pub fn set_refresh_grant(&self, grant: TokenGrant) {
        self.state.lock().unwrap().refresh_grant = Some(grant);
    }

    /// Captured `(comment_id, text)` pairs from [`PlatformClient::reply`].
    pub fn replies(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().replies.clone()
    }

    /// Captured `(recipient_user_id, text)` pairs from the primary DM path.
    pub fn dms(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().dms.clone()
    }

    /// Captured `(comment_id, text)` pairs from the fallback DM path.
    pub fn fallback_dms(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().fallback_dms.clone()
    }

    pub fn refresh_calls(&self) -> u32 {
        self.state.lock().unwrap().refresh_calls
    }

    fn fail(&self, context: &str) -> RepliqError {
        RepliqError::upstream(self.platform, format!("{context}: injected failure"))
    }
}

#[async_trait]
impl PlatformClient for MockPlatform {
    fn platform(&self) -> Platform {
        self.platform
    }

    async fn list_posts(
        &self,
        _access_token: &str,
        _account_id: &str,
        limit: u32,
    ) -> Result<Vec<PostSummary>, RepliqError> {
        if self.fail_list_posts.load(Ordering::SeqCst) {
            return Err(self.fail("list posts"));
        }
        let posts = self.state.lock().unwrap().posts.clone();
        Ok(posts.into_iter().take(limit as usize).collect())
    }

    async fn list_comments(
        &self,
        _access_token: &str,
        post_id: &str,
        limit: u32,
    ) -> Result<Vec<IncomingComment>, RepliqError> {
        if self.fail_list_comments.load(Ordering::SeqCst) {
            return Err(self.fail("list comments"));
        }
        let state = self.state.lock().unwrap();
        if state.failing_comment_posts.contains(post_id) {
            return Err(self.fail("list comments"));
        }
        let comments = state.comments.get(post_id).cloned().unwrap_or_default();
        Ok(comments.into_iter().take(limit as usize).collect())
    }

    async fn reply(
        &self,
        _access_token: &str,
        comment_id: &str,
        text: &str,
    ) -> Result<(), RepliqError> {
        if self.fail_reply.load(Ordering::SeqCst) {
            return Err(self.fail("reply"));
        }
        self.state
            .lock()
            .unwrap()
            .replies
            .push((comment_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn send_dm(
        &self,
        _access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError> {
        if self.fail_dm_primary.load(Ordering::SeqCst) {
            return Err(self.fail("send dm"));
        }
        self.state
            .lock()
            .unwrap()
            .dms
            .push((recipient.user_id.clone(), text.to_string()));
        Ok(())
    }

    async fn send_dm_fallback(
        &self,
        _access_token: &str,
        recipient: &DmRecipient,
        text: &str,
    ) -> Result<(), RepliqError> {
        if self.fail_dm_fallback.load(Ordering::SeqCst) {
            return Err(self.fail("dm fallback"));
        }
        let comment_id = recipient
            .comment_id
            .clone()
            .ok_or_else(|| RepliqError::upstream(self.platform, "fallback needs a comment id"))?;
        self.state
            .lock()
            .unwrap()
            .fallback_dms
            .push((comment_id, text.to_string()));
        Ok(())
    }

    async fn refresh_token(&self, _refresh_token: &str) -> Result<TokenGrant, RepliqError> {
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(self.fail("refresh token"));
        }
        let mut state = self.state.lock().unwrap();
        state.refresh_calls += 1;
        state
            .refresh_grant
            .clone()
            .ok_or_else(|| RepliqError::Token("no refresh grant configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_replies_and_dms() {
        let mock = MockPlatform::new(Platform::Instagram);
        mock.reply("tok", "c-1", "check your dms").await.unwrap();
        mock.send_dm(
            "tok",
            &DmRecipient {
                user_id: "u-1".into(),
                comment_id: Some("c-1".into()),
            },
            "hi",
        )
        .await
        .unwrap();

        assert_eq!(mock.replies(), vec![("c-1".to_string(), "check your dms".to_string())]);
        assert_eq!(mock.dms(), vec![("u-1".to_string(), "hi".to_string())]);
    }

    #[tokio::test]
    async fn failure_switches_inject_errors() {
        let mock = MockPlatform::new(Platform::Twitter);
        mock.fail_reply.store(true, Ordering::SeqCst);
        let err = mock.reply("tok", "c-1", "x").await.unwrap_err();
        assert!(err.to_string().contains("injected failure"));
        assert!(mock.replies().is_empty());
    }
}
