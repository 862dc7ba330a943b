// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dedup ledger: a per-automation bounded FIFO of already-acted-upon
//! external comment ids.
//!
//! [`reserve`] is the engine's at-most-once guarantee. It runs as a single
//! transaction on the single writer thread, so two overlapping invocations
//! cannot both observe "absent" and both act -- the insert-if-absent and
//! the capacity eviction commit together, before any outbound action is
//! dispatched (mark-before-send).

use repliq_core::RepliqError;
use rusqlite::params;

use crate::database::Database;

/// Atomically check-and-mark an external id for an automation.
///
/// Returns `true` when the id was already present (dedup hit -- the caller
/// must not act). Returns `false` when the id was inserted now; the oldest
/// entries beyond `capacity` are evicted in the same transaction.
pub async fn reserve(
    db: &Database,
    automation_id: &str,
    external_id: &str,
    capacity: u32,
) -> Result<bool, RepliqError> {
    let automation_id = automation_id.to_string();
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let inserted = tx.execute(
                "INSERT OR IGNORE INTO processed_ids (automation_id, external_id)
                 VALUES (?1, ?2)",
                params![automation_id, external_id],
            )?;

            if inserted == 0 {
                tx.commit()?;
                return Ok(true);
            }

            // Evict oldest entries beyond capacity (ring buffer semantics).
            tx.execute(
                "DELETE FROM processed_ids
                 WHERE automation_id = ?1
                   AND seq NOT IN (
                       SELECT seq FROM processed_ids
                       WHERE automation_id = ?1
                       ORDER BY seq DESC
                       LIMIT ?2
                   )",
                params![automation_id, capacity],
            )?;

            tx.commit()?;
            Ok(false)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether an external id is currently in the ledger.
pub async fn contains(
    db: &Database,
    automation_id: &str,
    external_id: &str,
) -> Result<bool, RepliqError> {
    let automation_id = automation_id.to_string();
    let external_id = external_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM processed_ids
                 WHERE automation_id = ?1 AND external_id = ?2",
                params![automation_id, external_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of ledger entries for an automation.
pub async fn count(db: &Database, automation_id: &str) -> Result<u32, RepliqError> {
    let automation_id = automation_id.to_string();
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM processed_ids WHERE automation_id = ?1",
                params![automation_id],
                |row| row.get(0),
            )?;
            Ok(count as u32)
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

    #[tokio::test]
    async fn first_reserve_inserts_second_is_a_hit() {
        let (db, _dir) = setup_db().await;

        let hit = reserve(&db, "a1", "comment-1", 200).await.unwrap();
        assert!(!hit, "first reserve must not be a dedup hit");

        let hit = reserve(&db, "a1", "comment-1", 200).await.unwrap();
        assert!(hit, "second reserve of the same id must be a hit");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ledgers_are_scoped_per_automation() {
        let (db, _dir) = setup_db().await;

        assert!(!reserve(&db, "a1", "x", 200).await.unwrap());
        // The same external id is fresh for a different automation.
        assert!(!reserve(&db, "a2", "x", 200).await.unwrap());
        assert!(reserve(&db, "a1", "x", 200).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn capacity_evicts_oldest_entries() {
        let (db, _dir) = setup_db().await;

        for i in 0..250 {
            let hit = reserve(&db, "a1", &format!("c-{i}"), 200).await.unwrap();
            assert!(!hit);
        }

        assert_eq!(count(&db, "a1").await.unwrap(), 200);

        // The 50 oldest ids were evicted, the 200 newest retained.
        assert!(!contains(&db, "a1", "c-0").await.unwrap());
        assert!(!contains(&db, "a1", "c-49").await.unwrap());
        assert!(contains(&db, "a1", "c-50").await.unwrap());
        assert!(contains(&db, "a1", "c-249").await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn evicted_id_can_be_reserved_again() {
        let (db, _dir) = setup_db().await;

        // Tiny capacity to force wraparound.
        assert!(!reserve(&db, "a1", "first", 2).await.unwrap());
        assert!(!reserve(&db, "a1", "second", 2).await.unwrap());
        assert!(!reserve(&db, "a1", "third", 2).await.unwrap());

        // "first" fell out of the window; it is reservable again.
        assert!(!contains(&db, "a1", "first").await.unwrap());
        assert!(!reserve(&db, "a1", "first", 2).await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_reserves_act_at_most_once() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent.db");
        let db = std::sync::Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());

        // Ten tasks race to reserve the same (automation, comment) pair.
        let mut handles = Vec::new();
        for _ in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                reserve(&db, "a1", "contested", 200).await.unwrap()
            }));
        }

        let mut fresh = 0;
        for handle in handles {
            if !handle.await.unwrap() {
                fresh += 1;
            }
        }
        assert_eq!(fresh, 1, "exactly one racer may win the reservation");

        db.close().await.unwrap();
    }
}
