use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::Rating;

/// Audit trail of who rated what. No per-user uniqueness: rating twice
/// records twice.
pub struct RatingRepository;

impl RatingRepository {
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        image_id: i64,
    ) -> Result<Rating, sqlx::Error> {
        sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (user_id, image_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, image_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(image_id)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn count_for_image(pool: &SqlitePool, image_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM ratings WHERE image_id = $1")
            .bind(image_id)
            .fetch_one(pool)
            .await
    }
}
