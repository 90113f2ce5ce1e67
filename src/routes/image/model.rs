use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::database::models::Image;

#[derive(Debug, Serialize)]
pub struct ImageResponse {
    pub id: i64,
    pub media_file: String,
    pub alt_text: Option<String>,
    pub score: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Image> for ImageResponse {
    fn from(image: Image) -> Self {
        Self {
            id: image.id,
            media_file: image.media_file,
            alt_text: image.alt_text,
            score: image.score,
            created_at: image.created_at,
        }
    }
}
