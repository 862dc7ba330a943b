// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger matching rules.
//!
//! All functions here are pure; the pipeline and the poller feed them
//! normalized comments and candidate automations. "First match wins" is
//! defined over the caller-supplied order, which storage guarantees to be
//! creation order.

use repliq_core::types::{AccountIdentity, Automation, IncomingComment};

/// Strip a leading `@` and lowercase, for username comparison across
/// platforms that differ on the prefix.
pub fn normalize_username(name: &str) -> String {
    name.trim().trim_start_matches('@').to_lowercase()
}

/// Whether the comment was written by the connected account itself.
/// Matches on platform user id first, then on normalized username.
pub fn is_self_comment(comment: &IncomingComment, identity: &AccountIdentity) -> bool {
    if !comment.author_id.is_empty() && comment.author_id == identity.platform_user_id {
        return true;
    }
    match (&comment.author_username, &identity.username) {
        (Some(author), Some(own)) => normalize_username(author) == normalize_username(own),
        _ => false,
    }
}

/// Post id extraction from a configured target URL: the last non-empty
/// path segment. A bare id passes through unchanged.
pub fn post_id_from_url(url: &str) -> &str {
    url.trim_end_matches('/').rsplit('/').next().unwrap_or(url)
}

/// Post scoping. An automation with a target post only fires on that post;
/// a comment without a known post id cannot satisfy a target (fail closed).
/// The target's trailing segment must equal the post id exactly, so one id
/// prefixing another cannot satisfy the wrong target.
pub fn post_scope_allows(target_post_url: Option<&str>, post_id: Option<&str>) -> bool {
    match target_post_url {
        None => true,
        Some(target) => match post_id {
            None => false,
            Some(pid) => post_id_from_url(target) == pid,
        },
    }
}

/// Case-insensitive substring match. An empty keyword never matches.
pub fn keyword_matches(keyword: &str, text: &str) -> bool {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return false;
    }
    text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Full trigger predicate for one automation against one comment.
///
/// Nested replies (comments with a parent) never trigger, so automated
/// reply threads cannot feed back into matching.
pub fn automation_matches(
    automation: &Automation,
    comment: &IncomingComment,
    identity: &AccountIdentity,
) -> bool {
    automation.enabled
        && automation.platforms.contains(&comment.platform)
        && comment.parent_id.is_none()
        && !is_self_comment(comment, identity)
        && post_scope_allows(automation.target_post_url.as_deref(), comment.post_id.as_deref())
        && keyword_matches(&automation.trigger_keyword, &comment.text)
}

/// First automation (in the given order) whose trigger fires.
pub fn first_match<'a>(
    automations: &'a [Automation],
    comment: &IncomingComment,
    identity: &AccountIdentity,
) -> Option<&'a Automation> {
    automations
        .iter()
        .find(|a| automation_matches(a, comment, identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use repliq_core::Platform;

    fn automation(keyword: &str) -> Automation {
        Automation {
            id: "a1".to_string(),
            user_id: "user-1".to_string(),
            enabled: true,
            platforms: vec![Platform::Instagram],
            trigger_keyword: keyword.to_string(),
            target_post_url: None,
            reply_variants: vec!["Check your DMs!".to_string()],
            dm_template: "Hi {{prenom}}".to_string(),
            last_processed: None,
            stats_triggers: 0,
            stats_dms_sent: 0,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn comment(text: &str) -> IncomingComment {
        IncomingComment {
            external_id: "c-1".to_string(),
            parent_id: None,
            author_id: "fan-1".to_string(),
            author_username: Some("fan_account".to_string()),
            text: text.to_string(),
            post_id: Some("post-1".to_string()),
            platform: Platform::Instagram,
        }
    }

    fn identity() -> AccountIdentity {
        AccountIdentity {
            platform_user_id: "acct-1".to_string(),
            username: Some("creator".to_string()),
        }
    }

    #[test]
    fn keyword_is_case_insensitive_substring() {
        assert!(keyword_matches("info", "Je veux des INFOS svp"));
        assert!(keyword_matches("INFO", "more info please"));
        assert!(!keyword_matches("info", "tell me more"));
        assert!(!keyword_matches("", "anything"));
        assert!(!keyword_matches("   ", "anything"));
    }

    #[test]
    fn nested_replies_never_trigger() {
        let a = automation("info");
        let mut c = comment("info please");
        assert!(automation_matches(&a, &c, &identity()));
        c.parent_id = Some("parent-comment".to_string());
        assert!(!automation_matches(&a, &c, &identity()));
    }

    #[test]
    fn own_comments_are_excluded_by_id_and_username() {
        let a = automation("info");
        let ident = identity();

        let mut by_id = comment("info");
        by_id.author_id = "acct-1".to_string();
        assert!(!automation_matches(&a, &by_id, &ident));

        let mut by_name = comment("info");
        by_name.author_username = Some("@Creator".to_string());
        assert!(!automation_matches(&a, &by_name, &ident));
    }

    #[test]
    fn platform_set_gates_matching() {
        let mut a = automation("info");
        a.platforms = vec![Platform::Twitter];
        assert!(!automation_matches(&a, &comment("info"), &identity()));
    }

    #[test]
    fn target_post_scoping_fails_closed() {
        let mut a = automation("info");
        a.target_post_url = Some("https://instagram.com/p/post-1/".to_string());

        assert!(automation_matches(&a, &comment("info"), &identity()));

        let mut other_post = comment("info");
        other_post.post_id = Some("post-2".to_string());
        assert!(!automation_matches(&a, &other_post, &identity()));

        // No post id at all cannot satisfy a target.
        let mut unknown = comment("info");
        unknown.post_id = None;
        assert!(!automation_matches(&a, &unknown, &identity()));
    }

    #[test]
    fn post_id_extraction_handles_urls_and_bare_ids() {
        assert_eq!(
            post_id_from_url("https://www.linkedin.com/feed/update/urn:li:ugcPost:9/"),
            "urn:li:ugcPost:9"
        );
        assert_eq!(post_id_from_url("https://x.com/i/status/123"), "123");
        assert_eq!(post_id_from_url("123456"), "123456");
    }

    #[test]
    fn target_scope_requires_the_exact_post_id() {
        let mut a = automation("info");
        a.target_post_url = Some("https://x.com/i/status/post-12".to_string());

        // "post-1" is a prefix of the target's id but not that post.
        assert!(!automation_matches(&a, &comment("info"), &identity()));

        let mut exact = comment("info");
        exact.post_id = Some("post-12".to_string());
        assert!(automation_matches(&a, &exact, &identity()));
    }

    #[test]
    fn first_match_respects_order() {
        let mut first = automation("info");
        first.id = "first".to_string();
        let mut second = automation("info");
        second.id = "second".to_string();

        let list = vec![first, second];
        let hit = first_match(&list, &comment("info please"), &identity()).unwrap();
        assert_eq!(hit.id, "first");
    }

    #[test]
    fn disabled_automation_never_matches() {
        let mut a = automation("info");
        a.enabled = false;
        assert!(!automation_matches(&a, &comment("info"), &identity()));
    }
}
