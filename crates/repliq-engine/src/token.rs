// SPDX-FileCopyrightText: 2026 Repliq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Access token decryption and proactive refresh.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use repliq_core::types::Connection;
use repliq_core::{PlatformClient, RepliqError};
use repliq_storage::Database;
use repliq_storage::queries::connections;
use repliq_vault::TokenCipher;

/// Tokens expiring within this window are refreshed before use.
const REFRESH_BUFFER_SECS: i64 = 300;

fn needs_refresh(token_expires_at: Option<&str>, now: DateTime<Utc>) -> bool {
    let Some(raw) = token_expires_at else {
        // No expiry recorded means a non-expiring token.
        return false;
    };
    match DateTime::parse_from_rfc3339(raw) {
        Ok(expiry) => expiry.with_timezone(&Utc) - now < Duration::seconds(REFRESH_BUFFER_SECS),
        Err(_) => {
            warn!(expiry = raw, "unparseable token expiry, treating as expired");
            true
        }
    }
}

/// Return a usable plaintext access token for this connection, refreshing
/// and re-persisting it first when it is expired or about to expire.
///
/// A failed refresh is an error; the caller skips the affected automation
/// rather than acting with a stale token.
pub async fn ensure_fresh_token(
    db: &Database,
    cipher: &TokenCipher,
    client: &dyn PlatformClient,
    connection: &Connection,
) -> Result<String, RepliqError> {
    let access_token = cipher.decrypt(&connection.access_token_enc)?;

    if !needs_refresh(connection.token_expires_at.as_deref(), Utc::now()) {
        return Ok(access_token);
    }

    let refresh_enc = connection.refresh_token_enc.as_deref().ok_or_else(|| {
        RepliqError::Token(format!(
            "token for connection {} expired and no refresh token is stored",
            connection.id
        ))
    })?;
    let refresh_token = cipher.decrypt(refresh_enc)?;

    debug!(connection_id = %connection.id, platform = %connection.platform, "refreshing access token");
    let grant = client.refresh_token(&refresh_token).await?;

    let access_enc = cipher.encrypt(&grant.access_token)?;
    let new_refresh_enc = match &grant.refresh_token {
        Some(t) => Some(cipher.encrypt(t)?),
        None => None,
    };
    let expires_at = grant
        .expires_in
        .map(|secs| (Utc::now() + Duration::seconds(secs)).to_rfc3339());

    connections::update_tokens(
        db,
        &connection.id,
        &access_enc,
        new_refresh_enc.as_deref(),
        expires_at.as_deref(),
    )
    .await?;

    Ok(grant.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_expiry_means_non_expiring() {
        assert!(!needs_refresh(None, Utc::now()));
    }

    #[test]
    fn far_future_expiry_does_not_refresh() {
        let now = Utc::now();
        let future = (now + Duration::days(30)).to_rfc3339();
        assert!(!needs_refresh(Some(&future), now));
    }

    #[test]
    fn imminent_and_past_expiries_refresh() {
        let now = Utc::now();
        let soon = (now + Duration::seconds(60)).to_rfc3339();
        let past = (now - Duration::hours(1)).to_rfc3339();
        assert!(needs_refresh(Some(&soon), now));
        assert!(needs_refresh(Some(&past), now));
    }

    #[test]
    fn unparseable_expiry_refreshes() {
        assert!(needs_refresh(Some("not-a-date"), Utc::now()));
    }
}
