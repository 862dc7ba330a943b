// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection lookups and token persistence.

use std::str::FromStr;

use repliq_core::RepliqError;
use repliq_core::types::Platform;
use rusqlite::params;

use crate::database::Database;
use crate::models::Connection;

const SELECT_COLS: &str = "id, user_id, platform, platform_user_id, platform_username,
     access_token_enc, refresh_token_enc, token_expires_at, created_at, updated_at";

fn row_to_connection(row: &rusqlite::Row<'_>) -> rusqlite::Result<Connection> {
    let platform_raw: String = row.get(2)?;
    let platform = Platform::from_str(&platform_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Connection {
        id: row.get(0)?,
        user_id: row.get(1)?,
        platform,
        platform_user_id: row.get(3)?,
        platform_username: row.get(4)?,
        access_token_enc: row.get(5)?,
        refresh_token_enc: row.get(6)?,
        token_expires_at: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// Insert or update the (user, platform) credential set.
pub async fn upsert_connection(db: &Database, connection: &Connection) -> Result<(), RepliqError> {
    let c = connection.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO connections
                 (id, user_id, platform, platform_user_id, platform_username,
                  access_token_enc, refresh_token_enc, token_expires_at,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(user_id, platform) DO UPDATE SET
                   platform_user_id = excluded.platform_user_id,
                   platform_username = excluded.platform_username,
                   access_token_enc = excluded.access_token_enc,
                   refresh_token_enc = excluded.refresh_token_enc,
                   token_expires_at = excluded.token_expires_at,
                   updated_at = excluded.updated_at",
                params![
                    c.id,
                    c.user_id,
                    c.platform.to_string(),
                    c.platform_user_id,
                    c.platform_username,
                    c.access_token_enc,
                    c.refresh_token_enc,
                    c.token_expires_at,
                    c.created_at,
                    c.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the connection for a (user, platform) pair.
pub async fn get_for_user(
    db: &Database,
    user_id: &str,
    platform: Platform,
) -> Result<Option<Connection>, RepliqError> {
    let user_id = user_id.to_string();
    let platform = platform.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM connections
                 WHERE user_id = ?1 AND platform = ?2"
            ))?;
            let result = stmt.query_row(params![user_id, platform], row_to_connection);
            match result {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find the connection owning a platform-side account id (webhook path:
/// resolve the page/account a delivery belongs to).
pub async fn find_by_account(
    db: &Database,
    platform: Platform,
    platform_user_id: &str,
) -> Result<Option<Connection>, RepliqError> {
    let platform = platform.to_string();
    let platform_user_id = platform_user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SELECT_COLS} FROM connections
                 WHERE platform = ?1 AND platform_user_id = ?2"
            ))?;
            let result = stmt.query_row(params![platform, platform_user_id], row_to_connection);
            match result {
                Ok(c) => Ok(Some(c)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Persist freshly exchanged tokens and their expiry.
pub async fn update_tokens(
    db: &Database,
    id: &str,
    access_token_enc: &str,
    refresh_token_enc: Option<&str>,
    token_expires_at: Option<&str>,
) -> Result<(), RepliqError> {
    let id = id.to_string();
    let access = access_token_enc.to_string();
    let refresh = refresh_token_enc.map(|s| s.to_string());
    let expires = token_expires_at.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE connections
                 SET access_token_enc = ?1,
                     refresh_token_enc = COALESCE(?2, refresh_token_enc),
                     token_expires_at = ?3,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![access, refresh, expires, id],
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

    fn make_connection(id: &str, user_id: &str, platform: Platform) -> Connection {
        Connection {
            id: id.to_string(),
            user_id: user_id.to_string(),
            platform,
            platform_user_id: format!("acct-{user_id}"),
            platform_username: Some("creator".to_string()),
            access_token_enc: "enc-access".to_string(),
            refresh_token_enc: Some("enc-refresh".to_string()),
            token_expires_at: Some("2026-06-01T00:00:00.000Z".to_string()),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_and_get_roundtrips() {
        let (db, _dir) = setup_db().await;
        let c = make_connection("c1", "user-1", Platform::Instagram);
        upsert_connection(&db, &c).await.unwrap();

        let got = get_for_user(&db, "user-1", Platform::Instagram)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.platform, Platform::Instagram);
        assert_eq!(got.platform_user_id, "acct-user-1");

        // Missing platform for the same user.
        assert!(
            get_for_user(&db, "user-1", Platform::Twitter)
                .await
                .unwrap()
                .is_none()
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_replaces_on_user_platform_conflict() {
        let (db, _dir) = setup_db().await;
        let c = make_connection("c1", "user-1", Platform::LinkedIn);
        upsert_connection(&db, &c).await.unwrap();

        let mut updated = make_connection("c2", "user-1", Platform::LinkedIn);
        updated.access_token_enc = "enc-access-v2".to_string();
        upsert_connection(&db, &updated).await.unwrap();

        let got = get_for_user(&db, "user-1", Platform::LinkedIn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.access_token_enc, "enc-access-v2");
        // The original row id is kept; only credentials change.
        assert_eq!(got.id, "c1");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_by_account_resolves_owner() {
        let (db, _dir) = setup_db().await;
        let c = make_connection("c1", "user-9", Platform::Facebook);
        upsert_connection(&db, &c).await.unwrap();

        let got = find_by_account(&db, Platform::Facebook, "acct-user-9")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.user_id, "user-9");

        assert!(
            find_by_account(&db, Platform::Facebook, "unknown")
                .await
                .unwrap()
                .is_none()
        );

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_tokens_keeps_refresh_when_absent() {
        let (db, _dir) = setup_db().await;
        let c = make_connection("c1", "user-1", Platform::Twitter);
        upsert_connection(&db, &c).await.unwrap();

        update_tokens(&db, "c1", "enc-new", None, Some("2026-07-01T00:00:00.000Z"))
            .await
            .unwrap();

        let got = get_for_user(&db, "user-1", Platform::Twitter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.access_token_enc, "enc-new");
        // COALESCE keeps the old refresh token when the grant omits one.
        assert_eq!(got.refresh_token_enc.as_deref(), Some("enc-refresh"));
        assert_eq!(
            got.token_expires_at.as_deref(),
            Some("2026-07-01T00:00:00.000Z")
        );

        db.close().await.unwrap();
    }
}
