use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Rating {
    pub id: i64,
    pub user_id: i64,
    pub image_id: i64,
    pub created_at: DateTime<Utc>,
}
