use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::AppState;
use crate::database::models::{User, UserRole};
use crate::database::repositories::{SessionRepository, UserRepository};
use crate::error::AppError;
use crate::utils::{extract_session_cookie, fingerprint_from_headers};

/// The authenticated user behind the request's session cookie. Extracting it
/// runs the whole gate: cookie token + freshly computed fingerprint -> live
/// session -> owning user. Every failure mode collapses into the same
/// `Unauthenticated` so the response never reveals which check rejected the
/// request.
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = extract_session_cookie(&parts.headers).ok_or(AppError::Unauthenticated)?;
        let fingerprint = fingerprint_from_headers(&parts.headers);

        let session = SessionRepository::verify(&state.pool, &token, &fingerprint)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        // The user may have been deleted after the session was issued.
        let user = UserRepository::find_by_id(&state.pool, session.user_id)
            .await?
            .ok_or(AppError::Unauthenticated)?;

        Ok(CurrentUser(user))
    }
}

/// Role gate for handlers that need elevated privilege; composed after
/// `CurrentUser` extraction.
pub fn require_role(user: &User, allowed: &[UserRole]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only admins and moderators can perform this action.",
        ))
    }
}

pub fn require_moderator(user: &User) -> Result<(), AppError> {
    require_role(user, &[UserRole::Admin, UserRole::Moderator])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_role(role: UserRole) -> User {
        User {
            id: 1,
            username: "u".to_string(),
            email: "u@example.com".to_string(),
            password_hash: "h".to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn moderator_and_admin_pass_the_gate() {
        assert!(require_moderator(&user_with_role(UserRole::Admin)).is_ok());
        assert!(require_moderator(&user_with_role(UserRole::Moderator)).is_ok());
    }

    #[test]
    fn plain_users_are_forbidden() {
        let result = require_moderator(&user_with_role(UserRole::User));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn role_check_passes_the_exact_allowed_set() {
        let user = user_with_role(UserRole::User);
        assert!(require_role(&user, &[UserRole::User]).is_ok());
        assert!(require_role(&user, &[]).is_err());
    }
}
