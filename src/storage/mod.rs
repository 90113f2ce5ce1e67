//! Upload ingestion: validate the declared file, pick a server-side name,
//! copy the bytes verbatim to disk. No re-encoding, no dimension checks.

use std::path::Path;

use crate::config::Config;
use crate::error::AppError;
use crate::utils::generate_unique_file_name;

/// MIME types accepted for uploads. BMP is accepted here even though the
/// scraped-content pipeline only ever serves JPEG/PNG/GIF; the asymmetry is
/// intentional and covered by tests.
pub const ALLOWED_UPLOAD_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "image/bmp"];

/// MIME derived from the declared name's extension, not from sniffing bytes.
pub fn mime_from_file_name(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?;
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Validates and persists one uploaded file, returning the generated name the
/// caller stores as the row's file reference. Validation rejects before any
/// byte reaches the disk; the write itself is a plain verbatim copy.
pub async fn save_image_file(
    data: &[u8],
    declared_file_name: &str,
    storage_path: &Path,
    max_size_bytes: u64,
) -> Result<String, AppError> {
    let mime = mime_from_file_name(declared_file_name).ok_or(AppError::UnsupportedMediaType)?;
    if !ALLOWED_UPLOAD_MIME_TYPES.contains(&mime) {
        return Err(AppError::UnsupportedMediaType);
    }
    if data.len() as u64 > max_size_bytes {
        return Err(AppError::PayloadTooLarge(max_size_bytes));
    }

    let file_name = generate_unique_file_name(declared_file_name);
    let file_path = storage_path.join(&file_name);
    tokio::fs::write(&file_path, data).await?;

    tracing::debug!("Stored `{}` as `{}`", declared_file_name, file_path.display());
    Ok(file_name)
}

/// Removes a previously ingested file. Failure is logged, not surfaced: the
/// row deletion that triggered this has already happened.
pub async fn remove_image_file(file_name: &str, storage_path: &Path) {
    let file_path = storage_path.join(file_name);
    if let Err(err) = tokio::fs::remove_file(&file_path).await {
        tracing::warn!("Failed to remove `{}`: {}", file_path.display(), err);
    }
}

/// Creates the media directory tree at startup.
pub async fn ensure_storage_dirs(config: &Config) -> std::io::Result<()> {
    tokio::fs::create_dir_all(config.gallery_storage_path()).await?;
    tokio::fs::create_dir_all(config.avatars_storage_path()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn extension_decides_the_mime() {
        assert_eq!(mime_from_file_name("a.jpg"), Some("image/jpeg"));
        assert_eq!(mime_from_file_name("a.JPEG"), Some("image/jpeg"));
        assert_eq!(mime_from_file_name("a.png"), Some("image/png"));
        assert_eq!(mime_from_file_name("a.gif"), Some("image/gif"));
        assert_eq!(mime_from_file_name("archive.tar.gz"), None);
        assert_eq!(mime_from_file_name("noextension"), None);
    }

    // Uploads accept BMP; the scraped-content serving map never did. Keep the
    // mismatch visible here instead of quietly unifying the two lists.
    #[test]
    fn bmp_is_accepted_for_upload() {
        assert_eq!(mime_from_file_name("a.bmp"), Some("image/bmp"));
        assert!(ALLOWED_UPLOAD_MIME_TYPES.contains(&"image/bmp"));
    }

    #[tokio::test]
    async fn unsupported_extension_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = save_image_file(b"hello", "notes.txt", dir.path(), 1024).await;
        assert!(matches!(result, Err(AppError::UnsupportedMediaType)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn oversize_payload_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = save_image_file(&[0u8; 32], "big.png", dir.path(), 16).await;
        assert!(matches!(result, Err(AppError::PayloadTooLarge(16))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn accepted_upload_is_copied_verbatim() {
        let dir = TempDir::new().unwrap();
        let bytes = b"fake image bytes";
        let name = save_image_file(bytes, "cat.jpg", dir.path(), 1024).await.unwrap();
        assert!(name.ends_with(".jpg"));
        let written = std::fs::read(dir.path().join(&name)).unwrap();
        assert_eq!(written, bytes);
    }

    #[tokio::test]
    async fn remove_is_quiet_about_missing_files() {
        let dir = TempDir::new().unwrap();
        remove_image_file("never-existed.jpg", dir.path()).await;
    }
}
