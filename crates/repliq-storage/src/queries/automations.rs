// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Automation CRUD and stats operations.
//!
//! The engine only reads automation configuration; it mutates the stats
//! counters and `last_processed`. Creation/update queries exist for tests
//! and seeding tools.

use repliq_core::RepliqError;
use repliq_core::types::Platform;
use rusqlite::params;

use crate::database::Database;
use crate::models::Automation;

const SELECT_COLS: &str = "id, user_id, enabled, platforms, trigger_keyword, target_post_url,
     reply_variants, dm_template, last_processed, stats_triggers, stats_dms_sent,
     created_at, updated_at";

fn json_col<T: serde::de::DeserializeOwned>(idx: usize, raw: String) -> rusqlite::Result<T> {
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_automation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Automation> {
    let platforms_raw: String = row.get(3)?;
    let variants_raw: String = row.get(6)?;
    Ok(Automation {
        id: row.get(0)?,
        user_id: row.get(1)?,
        enabled: row.get::<_, i64>(2)? != 0,
        platforms: json_col(3, platforms_raw)?,
        trigger_keyword: row.get(4)?,
        target_post_url: row.get(5)?,
        reply_variants: json_col(6, variants_raw)?,
        dm_template: row.get(7)?,
        last_processed: row.get(8)?,
        stats_triggers: row.get(9)?,
        stats_dms_sent: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Insert or replace an automation row.
pub async fn upsert_automation(db: &Database, automation: &Automation) -> Result<(), RepliqError> {
    let a = automation.clone();
    let platforms = serde_json::to_string(&a.platforms)
        .map_err(|e| RepliqError::Storage { source: Box::new(e) })?;
    let variants = serde_json::to_string(&a.reply_variants)
        .map_err(|e| RepliqError::Storage { source: Box::new(e) })?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO automations
                 (id, user_id, enabled, platforms, trigger_keyword, target_post_url,
                  reply_variants, dm_template, last_processed, stats_triggers,
                  stats_dms_sent, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    a.id,
                    a.user_id,
                    a.enabled as i64,
                    platforms,
                    a.trigger_keyword,
                    a.target_post_url,
                    variants,
                    a.dm_template,
                    a.last_processed,
                    a.stats_triggers,
                    a.stats_dms_sent,
                    a.created_at,
                    a.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an automation by id.
pub async fn get_automation(db: &Database, id: &str) -> Result<Option<Automation>, RepliqError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM automations WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_automation);
            match result {
                Ok(a) => Ok(Some(a)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List enabled automations whose platform set contains `platform`, in
/// creation order. Creation order is what makes "first match" on the
/// webhook path deterministic.
pub async fn list_enabled_for_platform(
    db: &Database,
    platform: Platform,
) -> Result<Vec<Automation>, RepliqError> {
    let rows: Vec<Automation> = db
        .connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM automations
                 WHERE enabled = 1
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map([], row_to_automation)?;
            let mut automations = Vec::new();
            for row in rows {
                automations.push(row?);
            }
            Ok(automations)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    // The platform set is a JSON column; filter after deserialization.
    Ok(rows
        .into_iter()
        .filter(|a| a.platforms.contains(&platform))
        .collect())
}

/// Record a successful trigger action: bump `stats_triggers`, bump
/// `stats_dms_sent` when a DM went out, and touch `last_processed`.
/// A single UPDATE keeps the counters atomic under concurrent invocations.
pub async fn record_action(db: &Database, id: &str, dm_sent: bool) -> Result<(), RepliqError> {
    let id = id.to_string();
    let dm_delta: i64 = if dm_sent { 1 } else { 0 };
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE automations
                 SET stats_triggers = stats_triggers + 1,
                     stats_dms_sent = stats_dms_sent + ?1,
                     last_processed = strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![dm_delta, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_automation(id: &str, platforms: Vec<Platform>) -> Automation {
        Automation {
            id: id.to_string(),
            user_id: "user-1".to_string(),
            enabled: true,
            platforms,
            trigger_keyword: "info".to_string(),
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

    #[tokio::test]
    async fn upsert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let a = make_automation("a1", vec![Platform::Instagram, Platform::Facebook]);

        upsert_automation(&db, &a).await.unwrap();
        let got = get_automation(&db, "a1").await.unwrap().unwrap();
        assert_eq!(got.trigger_keyword, "info");
        assert_eq!(got.platforms, vec![Platform::Instagram, Platform::Facebook]);
        assert_eq!(got.reply_variants, vec!["Check your DMs!".to_string()]);
        assert!(got.enabled);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_automation(&db, "nope").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_filters_by_platform_and_enabled() {
        let (db, _dir) = setup_db().await;

        let ig = make_automation("ig-only", vec![Platform::Instagram]);
        let li = make_automation("li-only", vec![Platform::LinkedIn]);
        let mut disabled = make_automation("disabled", vec![Platform::Instagram]);
        disabled.enabled = false;

        upsert_automation(&db, &ig).await.unwrap();
        upsert_automation(&db, &li).await.unwrap();
        upsert_automation(&db, &disabled).await.unwrap();

        let found = list_enabled_for_platform(&db, Platform::Instagram)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "ig-only");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_preserves_creation_order() {
        let (db, _dir) = setup_db().await;

        let mut first = make_automation("first", vec![Platform::Twitter]);
        first.created_at = "2026-01-01T00:00:00.000Z".to_string();
        let mut second = make_automation("second", vec![Platform::Twitter]);
        second.created_at = "2026-01-02T00:00:00.000Z".to_string();

        // Insert out of order.
        upsert_automation(&db, &second).await.unwrap();
        upsert_automation(&db, &first).await.unwrap();

        let found = list_enabled_for_platform(&db, Platform::Twitter)
            .await
            .unwrap();
        assert_eq!(found[0].id, "first");
        assert_eq!(found[1].id, "second");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn record_action_bumps_counters_and_timestamp() {
        let (db, _dir) = setup_db().await;
        let a = make_automation("a-stats", vec![Platform::Instagram]);
        upsert_automation(&db, &a).await.unwrap();

        record_action(&db, "a-stats", true).await.unwrap();
        record_action(&db, "a-stats", false).await.unwrap();

        let got = get_automation(&db, "a-stats").await.unwrap().unwrap();
        assert_eq!(got.stats_triggers, 2);
        assert_eq!(got.stats_dms_sent, 1);
        assert!(got.last_processed.is_some());

        db.close().await.unwrap();
    }
}
