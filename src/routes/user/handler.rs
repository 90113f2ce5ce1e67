use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::Field},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::AppState;
use crate::database::repositories::{ProfileRepository, SessionRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::{CurrentUser, require_moderator};
use crate::storage;
use crate::utils::{
    build_clear_session_cookie, build_session_cookie, extract_session_cookie,
    fingerprint_from_headers, hash_password, verify_password,
};

use super::model::{
    LoginRequest, RegisterForm, UpdateProfileForm, UpdateRoleRequest, UploadedFile, UserResponse,
};

pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let form = parse_register_form(multipart).await?;
    form.validate()?;

    if UserRepository::find_by_username(&state.pool, &form.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Username `{}` already registered.",
            form.username
        )));
    }
    if UserRepository::find_by_email(&state.pool, &form.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "Email `{}` already registered.",
            form.email
        )));
    }

    let password_hash = hash_password(&form.password)?;
    let user =
        UserRepository::create(&state.pool, &form.username, &form.email, &password_hash).await?;

    let avatar_file = match &form.avatar_file {
        Some(file) => Some(
            storage::save_image_file(
                &file.data,
                &file.file_name,
                &state.config.avatars_storage_path(),
                state.config.max_image_size_bytes,
            )
            .await?,
        ),
        None => None,
    };
    let profile = ProfileRepository::create(
        &state.pool,
        user.id,
        &form.display_name,
        avatar_file.as_deref(),
        form.bio.as_deref(),
    )
    .await?;

    tracing::info!("Registered user `{}`", user.username);
    Ok(Json(UserResponse::from_parts(user, Some(profile))))
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Unknown user and wrong password fail identically.
    let user = UserRepository::find_by_username(&state.pool, &req.username)
        .await?
        .filter(|user| verify_password(&req.password, &user.password_hash))
        .ok_or(AppError::Unauthenticated)?;

    let fingerprint = fingerprint_from_headers(&headers);
    let session =
        SessionRepository::create(&state.pool, user.id, &fingerprint, state.config.session_ttl())
            .await?;
    let profile = ProfileRepository::find_by_user_id(&state.pool, user.id).await?;

    tracing::info!("User `{}` logged in", user.username);
    let cookie = build_session_cookie(&session.access_token, &state.config);
    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(UserResponse::from_parts(user, profile)),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = extract_session_cookie(&headers).ok_or(AppError::Unauthenticated)?;
    SessionRepository::deactivate(&state.pool, &token).await?;

    Ok((
        [(header::SET_COOKIE, build_clear_session_cookie())],
        Json(json!({ "message": "Successfully logged out." })),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let profile = ProfileRepository::find_by_user_id(&state.pool, user.id).await?;
    Ok(Json(UserResponse::from_parts(user, profile)))
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    multipart: Multipart,
) -> Result<Json<UserResponse>, AppError> {
    let form = parse_profile_form(multipart).await?;
    form.validate()?;

    if let Some(username) = form.username.as_deref() {
        if username != user.username
            && UserRepository::find_by_username(&state.pool, username)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username `{}` already registered.",
                username
            )));
        }
    }
    if let Some(email) = form.email.as_deref() {
        if email != user.email
            && UserRepository::find_by_email(&state.pool, email)
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Email `{}` already registered.",
                email
            )));
        }
    }

    let password_hash = form.password.as_deref().map(hash_password).transpose()?;
    let avatar_file = match &form.avatar_file {
        Some(file) => Some(
            storage::save_image_file(
                &file.data,
                &file.file_name,
                &state.config.avatars_storage_path(),
                state.config.max_image_size_bytes,
            )
            .await?,
        ),
        None => None,
    };

    let user = UserRepository::update_account(
        &state.pool,
        user.id,
        form.username.as_deref(),
        form.email.as_deref(),
        password_hash.as_deref(),
    )
    .await?;
    let profile = ProfileRepository::update(
        &state.pool,
        user.id,
        form.display_name.as_deref(),
        form.bio.as_deref(),
        avatar_file.as_deref(),
    )
    .await?;

    Ok(Json(UserResponse::from_parts(user, Some(profile))))
}

pub async fn update_role(
    State(state): State<AppState>,
    CurrentUser(current): CurrentUser,
    Path(username): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    require_moderator(&current)?;

    let user = UserRepository::update_role(&state.pool, &username, req.new_role)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    let profile = ProfileRepository::find_by_user_id(&state.pool, user.id).await?;

    tracing::info!(
        "User `{}` set role of `{}` to {:?}",
        current.username,
        user.username,
        user.role
    );
    Ok(Json(UserResponse::from_parts(user, profile)))
}

async fn text_field(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::Validation(format!("Malformed form field: {err}")))
}

/// Reads the shared registration/update field set; all fields optional here,
/// `parse_register_form` layers the required ones on top.
async fn parse_profile_form(mut multipart: Multipart) -> Result<UpdateProfileForm, AppError> {
    let mut form = UpdateProfileForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("Malformed multipart body: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "username" => form.username = Some(text_field(field).await?),
            "email" => form.email = Some(text_field(field).await?),
            "password" => form.password = Some(text_field(field).await?),
            "display_name" => form.display_name = Some(text_field(field).await?),
            "bio" => form.bio = Some(text_field(field).await?),
            "avatar_file" => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| {
                        AppError::Validation("avatar_file must be a file part.".to_string())
                    })?;
                let data = field.bytes().await.map_err(|err| {
                    AppError::Validation(format!("Failed to read avatar_file: {err}"))
                })?;
                form.avatar_file = Some(UploadedFile { file_name, data });
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn parse_register_form(multipart: Multipart) -> Result<RegisterForm, AppError> {
    let form = parse_profile_form(multipart).await?;
    Ok(RegisterForm {
        username: required(form.username, "username")?,
        email: required(form.email, "email")?,
        password: required(form.password, "password")?,
        display_name: required(form.display_name, "display_name")?,
        bio: form.bio,
        avatar_file: form.avatar_file,
    })
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Field `{name}` is required.")))
}
