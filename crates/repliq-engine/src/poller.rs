// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduled poll path for platforms without comment webhooks.
//!
//! One run walks every enabled automation for the platform, scans the
//! configured or recent posts, and acts on fresh matching comments. The
//! run is bounded by a wall-clock budget checked before each unit of work;
//! per-automation failures are counted and never abort the run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use repliq_core::types::{AccountIdentity, Automation, DmRecipient, PollReport, PostSummary};
use repliq_core::{Platform, PlatformClient, RepliqError};
use repliq_storage::queries::{automations, connections, ledger};

use crate::Engine;
use crate::executor::{ActionContext, execute};
use crate::matcher::{automation_matches, post_id_from_url};
use crate::token::ensure_fresh_token;

pub(crate) async fn run_poll(
    engine: &Engine,
    platform: Platform,
) -> Result<PollReport, RepliqError> {
    let started = Instant::now();
    let budget = std::time::Duration::from_secs(engine.poller.budget_secs);
    let client = engine.registry.get(platform)?;
    let candidates = automations::list_enabled_for_platform(&engine.db, platform).await?;

    let mut report = PollReport::default();
    // At most one action per comment per run, across all automations.
    let mut acted: HashSet<String> = HashSet::new();

    info!(%platform, automations = candidates.len(), "poll run starting");

    for automation in &candidates {
        if started.elapsed() >= budget {
            report
                .debug
                .push("time budget exhausted, run truncated".to_string());
            break;
        }
        if let Err(e) = poll_automation(
            engine,
            client.clone(),
            automation,
            started,
            budget,
            &mut acted,
            &mut report,
        )
        .await
        {
            warn!(automation_id = %automation.id, error = %e, "automation skipped");
            report.errors += 1;
            report
                .debug
                .push(format!("automation {}: {e}", automation.id));
        }
    }

    info!(
        %platform,
        processed = report.processed,
        replies = report.replies,
        dms_sent = report.dms_sent,
        errors = report.errors,
        "poll run finished"
    );
    Ok(report)
}

async fn poll_automation(
    engine: &Engine,
    client: Arc<dyn PlatformClient>,
    automation: &Automation,
    started: Instant,
    budget: std::time::Duration,
    acted: &mut HashSet<String>,
    report: &mut PollReport,
) -> Result<(), RepliqError> {
    let platform = client.platform();
    let connection = connections::get_for_user(&engine.db, &automation.user_id, platform)
        .await?
        .ok_or_else(|| RepliqError::ConnectionMissing {
            user_id: automation.user_id.clone(),
            platform,
        })?;

    let identity = AccountIdentity {
        platform_user_id: connection.platform_user_id.clone(),
        username: connection.platform_username.clone(),
    };
    let access_token = ensure_fresh_token(&engine.db, &engine.cipher, client.as_ref(), &connection)
        .await?;

    let posts: Vec<PostSummary> = match &automation.target_post_url {
        Some(target) => vec![PostSummary {
            id: post_id_from_url(target).to_string(),
            permalink: Some(target.clone()),
        }],
        None => {
            client
                .list_posts(
                    &access_token,
                    &connection.platform_user_id,
                    engine.poller.posts_per_account,
                )
                .await?
        }
    };

    for post in &posts {
        if started.elapsed() >= budget {
            report
                .debug
                .push(format!("automation {}: budget hit mid-scan", automation.id));
            return Ok(());
        }

        // One post's comment fetch failing must not cost the automation
        // its remaining posts.
        let comments = match client
            .list_comments(&access_token, &post.id, engine.poller.comments_per_post)
            .await
        {
            Ok(comments) => comments,
            Err(e) => {
                warn!(post_id = %post.id, error = %e, "comment fetch failed, skipping post");
                report.errors += 1;
                report.debug.push(format!("post {}: {e}", post.id));
                continue;
            }
        };

        for comment in comments {
            if started.elapsed() >= budget {
                report
                    .debug
                    .push(format!("automation {}: budget hit mid-post", automation.id));
                return Ok(());
            }
            if acted.contains(&comment.external_id) {
                continue;
            }
            if !automation_matches(automation, &comment, &identity) {
                continue;
            }
            let already = ledger::reserve(
                &engine.db,
                &automation.id,
                &comment.external_id,
                engine.poller.ledger_capacity,
            )
            .await?;
            if already {
                continue;
            }

            if report.processed > 0 {
                engine.pacer.comment_pause().await;
            }

            acted.insert(comment.external_id.clone());
            let outcome = execute(
                &engine.db,
                &engine.pacer,
                ActionContext {
                    client: client.as_ref(),
                    access_token: &access_token,
                    automation,
                    reply_target: Some(&comment.external_id),
                    recipient: DmRecipient {
                        user_id: comment.author_id.clone(),
                        comment_id: Some(comment.external_id.clone()),
                    },
                    display_name: comment.author_username.as_deref(),
                    username: comment.author_username.as_deref(),
                },
            )
            .await;

            report.processed += 1;
            if outcome.replied {
                report.replies += 1;
            }
            if outcome.dm_sent {
                report.dms_sent += 1;
            }
            if !outcome.errors.is_empty() {
                report.errors += outcome.errors.len() as u32;
                for e in &outcome.errors {
                    report
                        .debug
                        .push(format!("comment {}: {e}", comment.external_id));
                }
            }
        }
    }

    Ok(())
}
