mod auth;
mod error_handler;

pub use auth::{CurrentUser, require_moderator, require_role};
pub use error_handler::log_errors;
