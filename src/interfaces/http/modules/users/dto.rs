//! User DTOs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{SignupDto, UpdateAccountDto, User};

/// International phone pattern: optional '+', optional country '1', 9–15 digits.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("phone regex is valid"));

/// Public user representation. Password and refresh-token fields are never
/// part of any output body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserBody {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub is_email_verified: bool,
}

impl From<User> for UserBody {
    fn from(u: User) -> Self {
        Self {
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone_number: u.phone_number,
            is_email_verified: u.is_email_verified,
        }
    }
}

/// Signup request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 2, max = 150, message = "username must be 2–150 characters"))]
    pub username: String,
    #[validate(
        length(min = 6, max = 1000, message = "email must be 6–1000 characters"),
        email(message = "invalid email format")
    )]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 8, message = "password confirmation must be at least 8 characters"))]
    pub password_confirmation: String,
    #[validate(regex(path = *PHONE_REGEX, message = "Phone number must be entered in the format: +999999999. Up to 15 digits allowed."))]
    pub phone_number: String,
    #[validate(length(max = 100, message = "first name must be at most 100 characters"))]
    pub first_name: String,
    #[validate(length(max = 100, message = "last name must be at most 100 characters"))]
    pub last_name: String,
}

impl From<SignupRequest> for SignupDto {
    fn from(r: SignupRequest) -> Self {
        Self {
            username: r.username,
            email: r.email,
            password: r.password,
            password_confirmation: r.password_confirmation,
            first_name: r.first_name,
            last_name: r.last_name,
            phone_number: r.phone_number,
        }
    }
}

/// Verification request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct VerifyRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
}

/// Self-service account update. Email and the verification flag are
/// read-only here. The four password-change fields travel together.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 2, max = 150, message = "username must be 2–150 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 100, message = "first name must be at most 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "last name must be at most 100 characters"))]
    pub last_name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Phone number must be entered in the format: +999999999. Up to 15 digits allowed."))]
    pub phone_number: Option<String>,
    pub password: Option<String>,
    #[validate(length(min = 8, message = "new password must be at least 8 characters"))]
    pub new_password: Option<String>,
    pub new_password_confirmation: Option<String>,
    pub refresh_token: Option<String>,
}

impl From<UpdateUserRequest> for UpdateAccountDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            username: r.username,
            first_name: r.first_name,
            last_name: r.last_name,
            phone_number: r.phone_number,
            password: r.password,
            new_password: r.new_password,
            new_password_confirmation: r.new_password_confirmation,
            refresh_token: r.refresh_token,
        }
    }
}

/// Apply an email change with the token from the change-email email.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangeEmailRequest {
    #[validate(length(min = 1, message = "token is required"))]
    pub token: String,
    #[validate(
        length(min = 6, max = 1000, message = "email must be 6–1000 characters"),
        email(message = "invalid email format")
    )]
    pub new_email: String,
}
