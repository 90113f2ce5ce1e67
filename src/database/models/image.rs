use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// `media_file` is always a server-generated name; the client-declared name
/// only ever contributes its extension. `score` starts at zero and is only
/// incremented.
#[derive(Debug, Clone, FromRow)]
pub struct Image {
    pub id: i64,
    pub media_file: String,
    pub alt_text: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}
