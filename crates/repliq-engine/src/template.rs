// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! DM template rendering and reply variant selection.

use rand::Rng;
use rand::seq::SliceRandom;

/// Used when an automation has no reply variants configured.
const DEFAULT_REPLY: &str = "Check your DMs!";

/// First whitespace-separated token of a display name, used for the
/// `{{prenom}}` / `{{firstname}}` placeholders.
fn first_name(display_name: &str) -> Option<&str> {
    display_name.split_whitespace().next()
}

/// Render a DM template against the commenter's identity.
///
/// `{{prenom}}` and `{{firstname}}` resolve to the first name token of the
/// display name, falling back to the username. `{{username}}` resolves to
/// the username, falling back to the display name. A placeholder with no
/// value available is left verbatim rather than rendered empty.
pub fn render_dm(
    template: &str,
    display_name: Option<&str>,
    username: Option<&str>,
) -> String {
    let mut out = template.to_string();

    let prenom = display_name.and_then(first_name).or(username);
    if let Some(value) = prenom {
        out = out.replace("{{prenom}}", value);
        out = out.replace("{{firstname}}", value);
    }

    if let Some(value) = username.or(display_name) {
        out = out.replace("{{username}}", value);
    }

    out
}

/// Pick a random public reply variant, skipping blank entries.
pub fn pick_reply_variant(variants: &[String]) -> String {
    let usable: Vec<&String> = variants.iter().filter(|v| !v.trim().is_empty()).collect();
    usable
        .choose(&mut rand::thread_rng())
        .map(|v| v.to_string())
        .unwrap_or_else(|| DEFAULT_REPLY.to_string())
}

/// Uniform sample from an inclusive seconds range, tolerating a reversed
/// range in configuration.
pub fn sample_secs(min: u64, max: u64) -> u64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    if lo == hi {
        return lo;
    }
    rand::thread_rng().gen_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_resolve_from_display_name() {
        let out = render_dm(
            "Salut {{prenom}}, ravi de te voir {{username}}",
            Some("Jane Doe"),
            Some("jane_d"),
        );
        assert_eq!(out, "Salut Jane, ravi de te voir jane_d");
    }

    #[test]
    fn firstname_alias_matches_prenom() {
        let out = render_dm("Hi {{firstname}}!", Some("John Smith"), None);
        assert_eq!(out, "Hi John!");
    }

    #[test]
    fn username_backs_up_missing_display_name() {
        let out = render_dm("Hi {{prenom}}", None, Some("fan_42"));
        assert_eq!(out, "Hi fan_42");
    }

    #[test]
    fn unresolvable_placeholder_stays_verbatim() {
        let out = render_dm("Hi {{prenom}}", None, None);
        assert_eq!(out, "Hi {{prenom}}");
    }

    #[test]
    fn variant_selection_skips_blanks_and_falls_back() {
        assert_eq!(pick_reply_variant(&[]), DEFAULT_REPLY);
        assert_eq!(
            pick_reply_variant(&["".to_string(), "   ".to_string()]),
            DEFAULT_REPLY
        );
        let only = vec!["Réponse en DM 📩".to_string()];
        assert_eq!(pick_reply_variant(&only), "Réponse en DM 📩");
    }

    #[test]
    fn variant_selection_stays_within_the_set() {
        let variants = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        for _ in 0..20 {
            let picked = pick_reply_variant(&variants);
            assert!(variants.contains(&picked));
        }
    }

    #[test]
    fn sample_secs_respects_bounds() {
        for _ in 0..50 {
            let v = sample_secs(2, 6);
            assert!((2..=6).contains(&v));
        }
        assert_eq!(sample_secs(5, 5), 5);
        // Reversed ranges are tolerated.
        let v = sample_secs(6, 2);
        assert!((2..=6).contains(&v));
    }
}
