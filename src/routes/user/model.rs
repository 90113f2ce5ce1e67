use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Profile, User, UserRole};
use crate::error::AppError;

/// A file part lifted out of a multipart form. Only the declared name's
/// extension survives ingestion; the bytes are stored verbatim.
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// Registration form (multipart). Field constraints mirror the column
/// widths; everything else about the account is server-assigned.
#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub avatar_file: Option<UploadedFile>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), AppError> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_display_name(&self.display_name)?;
        validate_bio(self.bio.as_deref())
    }
}

/// Profile update form (multipart); every field is optional and absent
/// fields stay untouched.
#[derive(Debug, Default)]
pub struct UpdateProfileForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub avatar_file: Option<UploadedFile>,
}

impl UpdateProfileForm {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        if let Some(display_name) = &self.display_name {
            validate_display_name(display_name)?;
        }
        validate_bio(self.bio.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub new_role: UserRole,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub display_name: String,
    pub avatar_file: String,
    pub bio: Option<String>,
    pub user_id: i64,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            id: profile.id,
            display_name: profile.display_name,
            avatar_file: profile.avatar_file,
            bio: profile.bio,
            user_id: profile.user_id,
        }
    }
}

/// Outward user shape; the password hash never leaves the row struct.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub profile: Option<ProfileResponse>,
}

impl UserResponse {
    pub fn from_parts(user: User, profile: Option<Profile>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            profile: profile.map(ProfileResponse::from),
        }
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn validate_username(username: &str) -> Result<(), AppError> {
    if !(3..=35).contains(&char_len(username)) {
        return Err(AppError::Validation(
            "Username must be between 3 and 35 characters.".to_string(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    if char_len(email) > 100 || !email.contains('@') || email.starts_with('@') || email.ends_with('@')
    {
        return Err(AppError::Validation("Invalid email address.".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if !(8..=65).contains(&char_len(password)) {
        return Err(AppError::Validation(
            "Password must be between 8 and 65 characters.".to_string(),
        ));
    }
    Ok(())
}

fn validate_display_name(display_name: &str) -> Result<(), AppError> {
    if !(3..=50).contains(&char_len(display_name)) {
        return Err(AppError::Validation(
            "Display name must be between 3 and 50 characters.".to_string(),
        ));
    }
    Ok(())
}

fn validate_bio(bio: Option<&str>) -> Result<(), AppError> {
    if bio.is_some_and(|b| char_len(b) > 300) {
        return Err(AppError::Validation(
            "Bio must be at most 300 characters.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> RegisterForm {
        RegisterForm {
            username: "johndoe".to_string(),
            email: "johndoe@example.com".to_string(),
            password: "password123".to_string(),
            display_name: "John Doe".to_string(),
            bio: None,
            avatar_file: None,
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut form = valid_form();
        form.password = "short".to_string();
        assert!(matches!(form.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn email_needs_an_at_sign_in_the_middle() {
        for bad in ["plainaddress", "@example.com", "john@"] {
            let mut form = valid_form();
            form.email = bad.to_string();
            assert!(form.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn update_form_with_no_fields_is_valid() {
        assert!(UpdateProfileForm::default().validate().is_ok());
    }
}
