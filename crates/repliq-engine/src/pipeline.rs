// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The webhook delivery pipeline.
//!
//! One normalized delivery is matched against the enabled automations for
//! its platform, reserved in the dedup ledger, and acted upon. The access
//! token rides along in the delivery itself (the upstream webhook relay
//! resolves the page token), so this path does not consult the vault.

use tracing::{debug, info};

use repliq_core::RepliqError;
use repliq_core::types::{
    AccountIdentity, DeliveryOutcome, DmRecipient, IncomingComment, NormalizedDelivery,
};
use repliq_storage::queries::{automations, connections, ledger};

use crate::Engine;
use crate::executor::{ActionContext, execute};
use crate::matcher::first_match;

/// Ledger key for deliveries that carry no comment id (pure DM-style
/// events). Keyed on the sender so the same person cannot retrigger.
fn fallback_ledger_key(delivery: &NormalizedDelivery) -> String {
    format!("dm:{}:{}", delivery.platform, delivery.sender_id)
}

pub(crate) async fn handle_delivery(
    engine: &Engine,
    delivery: NormalizedDelivery,
) -> Result<DeliveryOutcome, RepliqError> {
    let platform = delivery.platform;
    let client = engine.registry.get(platform)?;

    let mut candidates = automations::list_enabled_for_platform(&engine.db, platform).await?;

    // Resolve which tenant owns the receiving page so matching is scoped
    // to their automations. An unknown page still matches globally when
    // the delivery names the owner explicitly.
    let connection = connections::find_by_account(&engine.db, platform, &delivery.page_id).await?;
    let owner_id = connection
        .as_ref()
        .map(|c| c.user_id.clone())
        .or_else(|| delivery.user_id.clone());
    if let Some(owner) = &owner_id {
        candidates.retain(|a| a.user_id == *owner);
    }

    let identity = AccountIdentity {
        platform_user_id: delivery.page_id.clone(),
        username: connection.and_then(|c| c.platform_username),
    };

    let external_id = delivery
        .comment_id
        .clone()
        .unwrap_or_else(|| fallback_ledger_key(&delivery));
    let comment = IncomingComment {
        external_id: external_id.clone(),
        parent_id: None,
        author_id: delivery.sender_id.clone(),
        author_username: delivery.sender_name.clone(),
        text: delivery.comment_text.clone(),
        post_id: delivery.post_id.clone(),
        platform,
    };

    let Some(automation) = first_match(&candidates, &comment, &identity) else {
        debug!(%platform, page_id = %delivery.page_id, "delivery matched no automation");
        return Ok(DeliveryOutcome {
            matched: false,
            automation_id: None,
        });
    };

    let already = ledger::reserve(
        &engine.db,
        &automation.id,
        &external_id,
        engine.poller.ledger_capacity,
    )
    .await?;
    // A dedup hit reports as unmatched so retried deliveries read as
    // no-ops to the caller.
    if already {
        info!(automation_id = %automation.id, external_id, "duplicate delivery, skipping");
        return Ok(DeliveryOutcome {
            matched: false,
            automation_id: Some(automation.id.clone()),
        });
    }

    let report = execute(
        &engine.db,
        &engine.pacer,
        ActionContext {
            client: client.as_ref(),
            access_token: &delivery.page_access_token,
            automation,
            reply_target: delivery.comment_id.as_deref(),
            recipient: DmRecipient {
                user_id: delivery.sender_id.clone(),
                comment_id: delivery.comment_id.clone(),
            },
            display_name: delivery.sender_name.as_deref(),
            username: delivery.sender_name.as_deref(),
        },
    )
    .await;

    // Total failure surfaces as an upstream error; partial success is a
    // success with the failures already logged.
    if !report.replied && !report.dm_sent && !report.errors.is_empty() {
        return Err(RepliqError::upstream(platform, report.errors.join("; ")));
    }

    Ok(DeliveryOutcome {
        matched: true,
        automation_id: Some(automation.id.clone()),
    })
}
