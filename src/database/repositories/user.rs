use chrono::Utc;
use sqlx::SqlitePool;

use crate::database::models::{User, UserRole};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

/// User row access. Uniqueness of username and email is enforced both here
/// (pre-checks at the call sites, for precise errors) and by the schema.
pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(UserRole::User)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &SqlitePool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Partial account update; None leaves the column untouched.
    pub async fn update_account(
        pool: &SqlitePool,
        user_id: i64,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = COALESCE($1, username),
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash)
            WHERE id = $4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }

    pub async fn update_role(
        pool: &SqlitePool,
        username: &str,
        role: UserRole,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET role = $1
            WHERE username = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(role)
        .bind(username)
        .fetch_optional(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database;

    #[tokio::test]
    async fn new_users_default_to_the_user_role() {
        let pool = database::test_pool().await;
        let user = UserRepository::create(&pool, "johndoe", "j@example.com", "hash")
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.username, "johndoe");
    }

    #[tokio::test]
    async fn duplicate_username_violates_the_unique_constraint() {
        let pool = database::test_pool().await;
        UserRepository::create(&pool, "johndoe", "a@example.com", "h").await.unwrap();
        let dup = UserRepository::create(&pool, "johndoe", "b@example.com", "h").await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn partial_update_leaves_missing_fields_alone() {
        let pool = database::test_pool().await;
        let user = UserRepository::create(&pool, "johndoe", "j@example.com", "hash")
            .await
            .unwrap();

        let updated = UserRepository::update_account(&pool, user.id, Some("janedoe"), None, None)
            .await
            .unwrap();
        assert_eq!(updated.username, "janedoe");
        assert_eq!(updated.email, "j@example.com");
        assert_eq!(updated.password_hash, "hash");
    }

    #[tokio::test]
    async fn role_update_by_unknown_username_is_none() {
        let pool = database::test_pool().await;
        let missing = UserRepository::update_role(&pool, "ghost", UserRole::Admin)
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
