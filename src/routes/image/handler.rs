use axum::{
    Json,
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::AppState;
use crate::database::repositories::{ImageRepository, RatingRepository};
use crate::error::AppError;
use crate::middleware::{CurrentUser, require_moderator};
use crate::storage;

use super::model::ImageResponse;

const MAX_ALT_TEXT_CHARS: usize = 250;

pub async fn list_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = ImageRepository::list(&state.pool).await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

pub async fn random_images(
    State(state): State<AppState>,
) -> Result<Json<Vec<ImageResponse>>, AppError> {
    let images = ImageRepository::random_pair(&state.pool).await?;
    Ok(Json(images.into_iter().map(ImageResponse::from).collect()))
}

pub async fn read_image(
    State(state): State<AppState>,
    Path(image_id): Path<i64>,
) -> Result<Json<ImageResponse>, AppError> {
    let image = ImageRepository::find_by_id(&state.pool, image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;
    Ok(Json(ImageResponse::from(image)))
}

/// Gallery upload, moderators and admins only. The file goes through the
/// ingestion pipeline first; the row is only created once the bytes are on
/// disk, so a failed write never leaves a dangling row.
pub async fn upload_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<ImageResponse>, AppError> {
    require_moderator(&user)?;

    let (media_file, alt_text) = parse_upload_form(multipart).await?;
    let file_name = storage::save_image_file(
        &media_file.data,
        &media_file.file_name,
        &state.config.gallery_storage_path(),
        state.config.max_image_size_bytes,
    )
    .await?;

    let image = ImageRepository::create(&state.pool, &file_name, alt_text.as_deref()).await?;
    tracing::info!("User `{}` uploaded image {}", user.username, image.id);
    Ok(Json(ImageResponse::from(image)))
}

pub async fn delete_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(image_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    require_moderator(&user)?;

    let image = ImageRepository::delete(&state.pool, image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;
    storage::remove_image_file(&image.media_file, &state.config.gallery_storage_path()).await;

    tracing::info!("User `{}` deleted image {}", user.username, image_id);
    Ok(Json(json!({ "message": "Image deleted successfully." })))
}

pub async fn rate_image(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(image_id): Path<i64>,
) -> Result<Json<ImageResponse>, AppError> {
    ImageRepository::find_by_id(&state.pool, image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;

    RatingRepository::create(&state.pool, user.id, image_id).await?;
    let image = ImageRepository::increment_score(&state.pool, image_id)
        .await?
        .ok_or(AppError::NotFound("Image"))?;

    Ok(Json(ImageResponse::from(image)))
}

struct UploadedMedia {
    file_name: String,
    data: axum::body::Bytes,
}

async fn parse_upload_form(
    mut multipart: Multipart,
) -> Result<(UploadedMedia, Option<String>), AppError> {
    let mut media_file = None;
    let mut alt_text = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Malformed multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "media_file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::Validation("media_file must be a file part.".to_string())
                    })?;
                let data = field.bytes().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read media_file: {err}"))
                })?;
                media_file = Some(UploadedMedia { file_name, data });
            }
            "alt_text" => {
                let text = field.text().await.map_err(|err| {
                    AppError::Validation(format!("Malformed form field: {err}"))
                })?;
                if text.chars().count() > MAX_ALT_TEXT_CHARS {
                    return Err(AppError::Validation(
                        "Alt text must be at most 250 characters.".to_string(),
                    ));
                }
                alt_text = Some(text);
            }
            _ => {}
        }
    }

    let media_file = media_file
        .ok_or_else(|| AppError::Validation("Field `media_file` is required.".to_string()))?;
    Ok((media_file, alt_text))
}
