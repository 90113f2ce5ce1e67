use std::path::Path;

use axum::http::{HeaderMap, header};
use bcrypt::{DEFAULT_COST, hash, verify};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;

pub const SESSION_COOKIE: &str = "access_token";

const UNIQUE_ID_LENGTH: usize = 15;

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password.as_bytes(), DEFAULT_COST)
}

/// A malformed digest is a verification failure, not an error.
pub fn verify_password(password: &str, hashed: &str) -> bool {
    verify(password.as_bytes(), hashed).unwrap_or(false)
}

/// Binds a session to the browsing context that created it. Deterministic:
/// the same header pair always hashes to the same 64-char hex string.
pub fn client_fingerprint(user_agent: &str, accept_language: &str) -> String {
    let raw = format!("{}-{}", user_agent, accept_language);
    hex::encode(Sha256::digest(raw.as_bytes()))
}

pub fn fingerprint_from_headers(headers: &HeaderMap) -> String {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    let accept_language = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");
    client_fingerprint(user_agent, accept_language)
}

/// Random 15-hex-char identifier plus the declared name's extension. The
/// client-supplied base name never reaches the filesystem. Collisions are not
/// checked for; the identifier space makes them negligible.
pub fn generate_unique_file_name(file_name: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    let extension = Path::new(file_name)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    format!("{}{}", &id[..UNIQUE_ID_LENGTH], extension)
}

pub fn build_session_cookie(token: &str, config: &Config) -> String {
    let mut cookie = format!("{}={}; HttpOnly; SameSite=Lax; Path=/", SESSION_COOKIE, token);
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn build_clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; Max-Age=0", SESSION_COOKIE)
}

pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hashes_are_salted() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("password123", &first));
        assert!(verify_password("password123", &second));
    }

    #[test]
    fn wrong_password_fails_verification() {
        let digest = hash_password("password123").unwrap();
        assert!(!verify_password("hunter2", &digest));
    }

    #[test]
    fn malformed_digest_verifies_false_instead_of_erroring() {
        assert!(!verify_password("password123", "not-a-bcrypt-digest"));
        assert!(!verify_password("password123", ""));
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let a = client_fingerprint("Mozilla/5.0", "en-US");
        let b = client_fingerprint("Mozilla/5.0", "en-US");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn fingerprint_differs_per_client() {
        let a = client_fingerprint("Mozilla/5.0", "en-US");
        let b = client_fingerprint("curl/8.0", "en-US");
        assert_ne!(a, b);
    }

    #[test]
    fn missing_headers_fall_back_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(
            fingerprint_from_headers(&headers),
            client_fingerprint("unknown", "unknown")
        );
    }

    #[test]
    fn generated_file_name_keeps_extension_only() {
        let name = generate_unique_file_name("my holiday photo.PNG");
        assert_eq!(name.len(), UNIQUE_ID_LENGTH + ".PNG".len());
        assert!(name.ends_with(".PNG"));
        assert!(!name.contains("holiday"));
    }

    #[test]
    fn generated_file_names_are_unique() {
        let a = generate_unique_file_name("x.jpg");
        let b = generate_unique_file_name("x.jpg");
        assert_ne!(a, b);
    }

    #[test]
    fn session_cookie_roundtrip() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "other=1; access_token=abc123; theme=dark".parse().unwrap(),
        );
        assert_eq!(extract_session_cookie(&headers).as_deref(), Some("abc123"));
    }
}
