use sqlx::SqlitePool;

use crate::database::models::Profile;

const PROFILE_COLUMNS: &str = "id, display_name, avatar_file, bio, user_id";

/// One profile per user, created together with the account.
pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        display_name: &str,
        avatar_file: Option<&str>,
        bio: Option<&str>,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (display_name, avatar_file, bio, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(display_name)
        .bind(avatar_file.unwrap_or("default.jpg"))
        .bind(bio)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_user_id(
        pool: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<Profile>, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: i64,
        display_name: Option<&str>,
        bio: Option<&str>,
        avatar_file: Option<&str>,
    ) -> Result<Profile, sqlx::Error> {
        sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles
            SET display_name = COALESCE($1, display_name),
                bio = COALESCE($2, bio),
                avatar_file = COALESCE($3, avatar_file)
            WHERE user_id = $4
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(display_name)
        .bind(bio)
        .bind(avatar_file)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;
    use crate::database::repositories::UserRepository;

    #[tokio::test]
    async fn missing_avatar_falls_back_to_the_default() {
        let pool = database::test_pool().await;
        let user = UserRepository::create(&pool, "johndoe", "j@example.com", "h")
            .await
            .unwrap();
        let profile = ProfileRepository::create(&pool, user.id, "John Doe", None, None)
            .await
            .unwrap();
        assert_eq!(profile.avatar_file, "default.jpg");
        assert_eq!(profile.bio, None);
    }

    #[tokio::test]
    async fn update_touches_only_the_given_fields() {
        let pool = database::test_pool().await;
        let user = UserRepository::create(&pool, "johndoe", "j@example.com", "h")
            .await
            .unwrap();
        ProfileRepository::create(&pool, user.id, "John Doe", None, Some("old bio"))
            .await
            .unwrap();

        let updated = ProfileRepository::update(&pool, user.id, Some("Johnny"), None, None)
            .await
            .unwrap();
        assert_eq!(updated.display_name, "Johnny");
        assert_eq!(updated.bio.as_deref(), Some("old bio"));
        assert_eq!(updated.avatar_file, "default.jpg");
    }
}
