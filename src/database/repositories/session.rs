use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Session, SessionStatus};

/// Session issuance and verification. Transitions are lazy: nothing sweeps
/// the table in the background, a session is found expired by the request
/// that trips over it.
pub struct SessionRepository;

impl SessionRepository {
    /// Issues a new active session bound to `client_fingerprint`. The token
    /// is a fresh UUIDv4 in hex form, which the OS CSPRNG makes unguessable
    /// and unique for practical purposes.
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        client_fingerprint: &str,
        ttl: Duration,
    ) -> Result<Session, sqlx::Error> {
        let now = Utc::now();
        let access_token = Uuid::new_v4().simple().to_string();

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions
                (access_token, client_fingerprint, status, expires_at, created_at, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, access_token, client_fingerprint, status, expires_at, created_at, user_id
            "#,
        )
        .bind(&access_token)
        .bind(client_fingerprint)
        .bind(SessionStatus::Active)
        .bind(now + ttl)
        .bind(now)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        tracing::debug!("Issued session for user {}", user_id);
        Ok(session)
    }

    pub async fn find_by_token(
        pool: &SqlitePool,
        access_token: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            r#"
            SELECT id, access_token, client_fingerprint, status, expires_at, created_at, user_id
            FROM sessions
            WHERE access_token = $1
            "#,
        )
        .bind(access_token)
        .fetch_optional(pool)
        .await
    }

    /// Returns the live session, or None when the token is unknown, the
    /// session is terminal, or the caller's fingerprint does not match the
    /// one captured at login. A session found past its expiry is flipped to
    /// EXPIRED here and is already unusable for the call that discovered it.
    pub async fn verify(
        pool: &SqlitePool,
        access_token: &str,
        client_fingerprint: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let Some(session) = Self::find_by_token(pool, access_token).await? else {
            return Ok(None);
        };

        if session.status != SessionStatus::Active
            || session.client_fingerprint != client_fingerprint
        {
            return Ok(None);
        }

        if session.expires_at <= Utc::now() {
            sqlx::query("UPDATE sessions SET status = $1 WHERE access_token = $2")
                .bind(SessionStatus::Expired)
                .bind(access_token)
                .execute(pool)
                .await?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Logout. Idempotent: an unknown token is a silent no-op and repeated
    /// calls leave the row INACTIVE either way.
    pub async fn deactivate(pool: &SqlitePool, access_token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE sessions SET status = $1 WHERE access_token = $2")
            .bind(SessionStatus::Inactive)
            .bind(access_token)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::database::repositories::UserRepository;

    async fn setup() -> (SqlitePool, i64) {
        let pool = database::test_pool().await;
        let user = UserRepository::create(&pool, "sessionuser", "s@example.com", "x")
            .await
            .unwrap();
        (pool, user.id)
    }

    #[tokio::test]
    async fn verify_returns_live_session() {
        let (pool, user_id) = setup().await;
        let created = SessionRepository::create(&pool, user_id, "fp", Duration::days(7))
            .await
            .unwrap();

        let found = SessionRepository::verify(&pool, &created.access_token, "fp")
            .await
            .unwrap()
            .expect("session should be live");
        assert_eq!(found.status, SessionStatus::Active);
        assert_eq!(found.user_id, user_id);
    }

    #[tokio::test]
    async fn tokens_are_unique_and_unknown_token_is_none() {
        let (pool, user_id) = setup().await;
        let a = SessionRepository::create(&pool, user_id, "fp", Duration::days(1))
            .await
            .unwrap();
        let b = SessionRepository::create(&pool, user_id, "fp", Duration::days(1))
            .await
            .unwrap();
        assert_ne!(a.access_token, b.access_token);

        let missing = SessionRepository::verify(&pool, "deadbeef", "fp").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn fingerprint_mismatch_is_rejected_even_before_expiry() {
        let (pool, user_id) = setup().await;
        let session = SessionRepository::create(&pool, user_id, "browser-a", Duration::days(7))
            .await
            .unwrap();

        let stolen = SessionRepository::verify(&pool, &session.access_token, "browser-b")
            .await
            .unwrap();
        assert!(stolen.is_none());

        // Row untouched: the rightful client still gets in.
        let rightful = SessionRepository::verify(&pool, &session.access_token, "browser-a")
            .await
            .unwrap();
        assert!(rightful.is_some());
    }

    #[tokio::test]
    async fn expiry_is_discovered_lazily_and_persisted() {
        let (pool, user_id) = setup().await;
        // Negative TTL puts the session in the past from the start.
        let session = SessionRepository::create(&pool, user_id, "fp", Duration::days(-1))
            .await
            .unwrap();

        let verified = SessionRepository::verify(&pool, &session.access_token, "fp")
            .await
            .unwrap();
        assert!(verified.is_none(), "the discovering call is not authenticated");

        let row = SessionRepository::find_by_token(&pool, &session.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, SessionStatus::Expired);

        // Terminal: still rejected on the next call.
        let again = SessionRepository::verify(&pool, &session.access_token, "fp")
            .await
            .unwrap();
        assert!(again.is_none());
    }

    #[tokio::test]
    async fn deactivate_is_idempotent() {
        let (pool, user_id) = setup().await;
        let session = SessionRepository::create(&pool, user_id, "fp", Duration::days(7))
            .await
            .unwrap();

        SessionRepository::deactivate(&pool, &session.access_token).await.unwrap();
        SessionRepository::deactivate(&pool, &session.access_token).await.unwrap();

        let row = SessionRepository::find_by_token(&pool, &session.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, SessionStatus::Inactive);

        assert!(
            SessionRepository::verify(&pool, &session.access_token, "fp")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn deactivate_unknown_token_is_a_silent_noop() {
        let (pool, _) = setup().await;
        SessionRepository::deactivate(&pool, "no-such-token").await.unwrap();
    }

    #[tokio::test]
    async fn deactivate_wins_over_expired_too() {
        // Logout on an already-expired session still lands on INACTIVE;
        // both states are terminal so the order does not matter.
        let (pool, user_id) = setup().await;
        let session = SessionRepository::create(&pool, user_id, "fp", Duration::days(-1))
            .await
            .unwrap();
        SessionRepository::verify(&pool, &session.access_token, "fp").await.unwrap();
        SessionRepository::deactivate(&pool, &session.access_token).await.unwrap();

        let row = SessionRepository::find_by_token(&pool, &session.access_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status, SessionStatus::Inactive);
    }
}
