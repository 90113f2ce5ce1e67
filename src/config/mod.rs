use std::env;
use std::path::PathBuf;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub session_expire_days: i64,
    pub max_image_size_bytes: u64,
    pub media_storage_path: PathBuf,
    pub allowed_origins: Vec<String>,
    pub debug_enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        let media_storage_path = PathBuf::from(
            env::var("MEDIA_STORAGE_PATH").unwrap_or_else(|_| "media".to_string()),
        );
        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_default()
                .parse()
                .unwrap_or(3000),
            session_expire_days: env::var("SESSION_EXPIRE_DAYS")?.parse().unwrap_or(7),
            max_image_size_bytes: env::var("MAX_IMAGE_SIZE_BYTES")?.parse().unwrap_or(3_145_728),
            media_storage_path,
            allowed_origins,
            debug_enabled: env::var("DEBUG_ENABLED").map(|v| v == "1").unwrap_or(false),
        })
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::days(self.session_expire_days)
    }

    /// Uploaded gallery images live under `<media>/gallery`.
    pub fn gallery_storage_path(&self) -> PathBuf {
        self.media_storage_path.join("gallery")
    }

    /// Profile avatars live under `<media>/avatars`.
    pub fn avatars_storage_path(&self) -> PathBuf {
        self.media_storage_path.join("avatars")
    }

    /// Cookies drop the Secure flag in debug mode so local http works.
    pub fn cookie_secure(&self) -> bool {
        !self.debug_enabled
    }
}
