// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Repliq workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A supported social platform.
///
/// Instagram and Facebook deliver comments by webhook push; LinkedIn and
/// Twitter are covered by scheduled polling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Instagram,
    Facebook,
    LinkedIn,
    Twitter,
}

/// A tenant-owned trigger-keyword -> reply/DM rule.
///
/// Rows are created and edited by the settings UI; the engine only reads
/// them and mutates `last_processed` and the stats counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Automation {
    pub id: String,
    pub user_id: String,
    pub enabled: bool,
    /// Platforms this automation listens on.
    pub platforms: Vec<Platform>,
    /// Trigger keyword, matched case-insensitively as a substring.
    pub trigger_keyword: String,
    /// Optional explicit target post. When absent the engine scans the
    /// account's recent posts.
    pub target_post_url: Option<String>,
    /// Public reply text variants; one is chosen at random per action.
    pub reply_variants: Vec<String>,
    /// DM template with `{{prenom}}` / `{{firstname}}` / `{{username}}`
    /// placeholders. Empty string disables the DM branch.
    pub dm_template: String,
    /// RFC 3339 timestamp of the last acted-upon comment.
    pub last_processed: Option<String>,
    pub stats_triggers: i64,
    pub stats_dms_sent: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// One OAuth credential set per (user, platform). Tokens are stored
/// encrypted; see `repliq-vault`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub user_id: String,
    pub platform: Platform,
    /// The connected account's id on the platform.
    pub platform_user_id: String,
    pub platform_username: Option<String>,
    pub access_token_enc: String,
    pub refresh_token_enc: Option<String>,
    /// RFC 3339 expiry of the access token. `None` means non-expiring.
    pub token_expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A normalized comment event produced by ingestion and consumed by
/// matching. Ephemeral; nothing persists beyond its id once acted upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingComment {
    /// The platform's external id for this comment.
    pub external_id: String,
    /// Non-null means this comment is itself a nested reply and never
    /// triggers an action.
    pub parent_id: Option<String>,
    pub author_id: String,
    pub author_username: Option<String>,
    pub text: String,
    /// Id of the post the comment sits under, when the source carries it.
    pub post_id: Option<String>,
    pub platform: Platform,
}

/// A post returned by the platform's recent-posts listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub id: String,
    pub permalink: Option<String>,
}

/// The connected account's own identity, used for self-exclusion.
#[derive(Debug, Clone)]
pub struct AccountIdentity {
    pub platform_user_id: String,
    pub username: Option<String>,
}

/// Target of a direct message. `comment_id` enables platform-specific
/// fallback send paths that address the comment rather than the user.
#[derive(Debug, Clone)]
pub struct DmRecipient {
    pub user_id: String,
    pub comment_id: Option<String>,
}

/// Result of a token refresh exchange.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the new access token in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// The normalized webhook delivery body (POST /webhook).
#[derive(Debug, Clone, Deserialize)]
pub struct NormalizedDelivery {
    pub platform: Platform,
    pub page_id: String,
    pub sender_id: String,
    #[serde(default)]
    pub sender_name: Option<String>,
    pub comment_text: String,
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub post_id: Option<String>,
    pub page_access_token: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Outcome of one webhook pipeline pass.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryOutcome {
    pub matched: bool,
    pub automation_id: Option<String>,
}

/// Per-comment action outcomes. Reply and DM branches are independent;
/// each failure is recorded with truncated error text.
#[derive(Debug, Clone, Default)]
pub struct ActionReport {
    pub replied: bool,
    pub dm_sent: bool,
    pub errors: Vec<String>,
}

/// Aggregate counters plus a human-readable debug trail for one poll run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollReport {
    pub processed: u32,
    pub replies: u32,
    pub dms_sent: u32,
    pub errors: u32,
    pub debug: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn platform_round_trips_through_strings() {
        for p in [
            Platform::Instagram,
            Platform::Facebook,
            Platform::LinkedIn,
            Platform::Twitter,
        ] {
            let s = p.to_string();
            assert_eq!(Platform::from_str(&s).unwrap(), p);
        }
        assert_eq!(Platform::Instagram.to_string(), "instagram");
        assert_eq!(Platform::LinkedIn.to_string(), "linkedin");
    }

    #[test]
    fn platform_serde_uses_lowercase() {
        let json = serde_json::to_string(&Platform::Twitter).unwrap();
        assert_eq!(json, "\"twitter\"");
        let p: Platform = serde_json::from_str("\"facebook\"").unwrap();
        assert_eq!(p, Platform::Facebook);
    }

    #[test]
    fn normalized_delivery_deserializes_with_optionals_absent() {
        let json = r#"{
            "platform": "instagram",
            "page_id": "page-1",
            "sender_id": "sender-1",
            "comment_text": "je veux des INFOS",
            "page_access_token": "tok"
        }"#;
        let d: NormalizedDelivery = serde_json::from_str(json).unwrap();
        assert_eq!(d.platform, Platform::Instagram);
        assert!(d.comment_id.is_none());
        assert!(d.post_id.is_none());
        assert!(d.user_id.is_none());
    }

    #[test]
    fn poll_report_serializes_counters() {
        let report = PollReport {
            processed: 3,
            replies: 1,
            dms_sent: 1,
            errors: 0,
            debug: vec!["ok".into()],
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"processed\":3"));
        assert!(json.contains("\"dms_sent\":1"));
    }
}
