use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Session lifecycle. `Active` can move to either terminal state
/// (`Inactive` on logout, `Expired` once the TTL elapses) and terminal
/// states never move again. Rows are kept after they die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Inactive,
    Expired,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: i64,
    /// Opaque bearer token, unique across the store.
    pub access_token: String,
    /// Fingerprint of the client that logged in; checked on every verify.
    pub client_fingerprint: String,
    pub status: SessionStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
}
