// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound action execution for one matched comment.
//!
//! The reply and DM branches are independent: a failed reply does not stop
//! the DM and vice versa. The caller must already hold the ledger
//! reservation for this comment; this module never checks dedup.

use tracing::{info, warn};

use repliq_core::types::{ActionReport, Automation, DmRecipient};
use repliq_core::{PlatformClient, RepliqError};
use repliq_storage::Database;
use repliq_storage::queries::automations;

use crate::pacing::Pacer;
use crate::template::{pick_reply_variant, render_dm};

/// Everything needed to act on one matched comment.
pub struct ActionContext<'a> {
    pub client: &'a dyn PlatformClient,
    pub access_token: &'a str,
    pub automation: &'a Automation,
    /// Comment to reply to publicly. `None` suppresses the reply branch
    /// (webhook deliveries without a comment id).
    pub reply_target: Option<&'a str>,
    pub recipient: DmRecipient,
    pub display_name: Option<&'a str>,
    pub username: Option<&'a str>,
}

fn record_error(report: &mut ActionReport, context: &str, e: &RepliqError) {
    let text: String = format!("{context}: {e}").chars().take(200).collect();
    report.errors.push(text);
}

/// Run the reply and DM branches, then persist stats for whatever
/// succeeded.
pub async fn execute(db: &Database, pacer: &Pacer, ctx: ActionContext<'_>) -> ActionReport {
    let mut report = ActionReport::default();
    let automation = ctx.automation;

    if let Some(comment_id) = ctx.reply_target {
        let text = pick_reply_variant(&automation.reply_variants);
        match ctx.client.reply(ctx.access_token, comment_id, &text).await {
            Ok(()) => {
                info!(automation_id = %automation.id, comment_id, "posted public reply");
                report.replied = true;
            }
            Err(e) => {
                warn!(automation_id = %automation.id, comment_id, error = %e, "public reply failed");
                record_error(&mut report, "reply", &e);
            }
        }
    }

    if !automation.dm_template.trim().is_empty() {
        if report.replied {
            pacer.action_pause().await;
        }
        let text = render_dm(&automation.dm_template, ctx.display_name, ctx.username);
        match ctx
            .client
            .send_dm(ctx.access_token, &ctx.recipient, &text)
            .await
        {
            Ok(()) => report.dm_sent = true,
            Err(primary) => {
                // One shot at the platform's alternate DM channel.
                match ctx
                    .client
                    .send_dm_fallback(ctx.access_token, &ctx.recipient, &text)
                    .await
                {
                    Ok(()) => {
                        info!(automation_id = %automation.id, "dm sent via fallback channel");
                        report.dm_sent = true;
                    }
                    Err(fallback) => {
                        warn!(automation_id = %automation.id, error = %primary, "dm failed on both channels");
                        record_error(&mut report, "dm", &primary);
                        record_error(&mut report, "dm fallback", &fallback);
                    }
                }
            }
        }
        if report.dm_sent {
            info!(automation_id = %automation.id, recipient = %ctx.recipient.user_id, "dm delivered");
        }
    }

    if report.replied || report.dm_sent {
        if let Err(e) = automations::record_action(db, &automation.id, report.dm_sent).await {
            warn!(automation_id = %automation.id, error = %e, "failed to record action stats");
            record_error(&mut report, "stats", &e);
        }
    }

    report
}
