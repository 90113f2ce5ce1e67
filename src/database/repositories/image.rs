use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::Image;

const IMAGE_COLUMNS: &str = "id, media_file, alt_text, score, created_at";

pub struct ImageRepository;

impl ImageRepository {
    pub async fn create(
        pool: &SqlitePool,
        media_file: &str,
        alt_text: Option<&str>,
    ) -> Result<Image, sqlx::Error> {
        sqlx::query_as::<_, Image>(&format!(
            r#"
            INSERT INTO images (media_file, alt_text, score, created_at)
            VALUES ($1, $2, 0, $3)
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(media_file)
        .bind(alt_text)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Image>, sqlx::Error> {
        sqlx::query_as::<_, Image>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Two random images for the compare-and-rate view. Fewer than two rows
    /// in the table means a shorter result, not an error.
    pub async fn random_pair(pool: &SqlitePool) -> Result<Vec<Image>, sqlx::Error> {
        sqlx::query_as::<_, Image>(&format!(
            "SELECT {IMAGE_COLUMNS} FROM images ORDER BY RANDOM() LIMIT 2"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, image_id: i64) -> Result<Option<Image>, sqlx::Error> {
        sqlx::query_as::<_, Image>(&format!("SELECT {IMAGE_COLUMNS} FROM images WHERE id = $1"))
            .bind(image_id)
            .fetch_optional(pool)
            .await
    }

    /// Scores only go up; a single atomic read-modify-write per call.
    pub async fn increment_score(
        pool: &SqlitePool,
        image_id: i64,
    ) -> Result<Option<Image>, sqlx::Error> {
        sqlx::query_as::<_, Image>(&format!(
            r#"
            UPDATE images
            SET score = score + 1
            WHERE id = $1
            RETURNING {IMAGE_COLUMNS}
            "#
        ))
        .bind(image_id)
        .fetch_optional(pool)
        .await
    }

    /// Removes the row and hands back what was deleted so the caller can
    /// also unlink the file on disk.
    pub async fn delete(pool: &SqlitePool, image_id: i64) -> Result<Option<Image>, sqlx::Error> {
        sqlx::query_as::<_, Image>(&format!(
            "DELETE FROM images WHERE id = $1 RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(image_id)
        .fetch_optional(pool)
        .await
    }
}
