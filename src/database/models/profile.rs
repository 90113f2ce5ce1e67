use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: i64,
    pub display_name: String,
    pub avatar_file: String,
    pub bio: Option<String>,
    pub user_id: i64,
}
