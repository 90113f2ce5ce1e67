pub mod image;
pub mod user;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};
use tower_http::services::ServeDir;

use crate::AppState;
use crate::middleware::log_errors;

/// Extra room on top of the image cap for the other multipart fields.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

/// The whole HTTP surface, shared by the binary and the integration tests.
/// CORS is deployment policy and stays in main.
pub fn router(state: AppState) -> Router {
    let media_dir = state.config.media_storage_path.clone();
    let body_limit = state.config.max_image_size_bytes as usize + BODY_LIMIT_SLACK;

    Router::new()
        .route("/users", post(user::handler::register))
        .route(
            "/users/me",
            get(user::handler::me).patch(user::handler::update_me),
        )
        .route("/users/{username}/role", patch(user::handler::update_role))
        .route("/login", post(user::handler::login))
        .route("/logout", post(user::handler::logout))
        .route(
            "/images",
            get(image::handler::list_images).post(image::handler::upload_image),
        )
        .route("/images/random", get(image::handler::random_images))
        .route(
            "/images/{image_id}",
            get(image::handler::read_image).delete(image::handler::delete_image),
        )
        .route("/images/{image_id}/rate", post(image::handler::rate_image))
        .nest_service("/media", ServeDir::new(media_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum::middleware::from_fn(log_errors))
        .with_state(state)
}
