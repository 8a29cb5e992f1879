//! User account API handlers
//!
//! Thin wrappers over `AccountService`. Owner-only handlers resolve the
//! target user from the path, run the owner check, then delegate.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ChangeEmailRequest, SignupRequest, UpdateUserRequest, UserBody, VerifyRequest};
use crate::application::accounts::AccountService;
use crate::domain::{DomainError, DomainResult, User};
use crate::interfaces::http::common::{domain_error, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::{ensure_account_owner, AuthenticatedUser};

/// User handler state
#[derive(Clone)]
pub struct UserHandlerState {
    pub accounts: Arc<AccountService>,
}

impl UserHandlerState {
    /// Fetch the user a path username points at, or 404.
    async fn target_user(&self, username: &str) -> DomainResult<User> {
        self.accounts
            .get_user_by_username(username)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "username",
                value: username.to_string(),
            })
    }
}

#[utoipa::path(
    post,
    path = "/users/signup",
    tag = "Users",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created, verification email sent", body = ApiResponse<UserBody>),
        (status = 400, description = "Validation error")
    )
)]
pub async fn signup(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserBody>>), (StatusCode, Json<ApiResponse<UserBody>>)> {
    let user = state
        .accounts
        .signup(request.into())
        .await
        .map_err(domain_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserBody::from(user))),
    ))
}

#[utoipa::path(
    post,
    path = "/users/verify",
    tag = "Users",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Email verified", body = ApiResponse<UserBody>),
        (status = 400, description = "Token invalid, expired or already consumed")
    )
)]
pub async fn verify(
    State(state): State<UserHandlerState>,
    ValidatedJson(request): ValidatedJson<VerifyRequest>,
) -> Result<Json<ApiResponse<UserBody>>, (StatusCode, Json<ApiResponse<UserBody>>)> {
    let user = state
        .accounts
        .verify(&request.token)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(UserBody::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/{username}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "User details", body = ApiResponse<UserBody>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn retrieve(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserBody>>, (StatusCode, Json<ApiResponse<UserBody>>)> {
    let user = state.target_user(&username).await.map_err(domain_error)?;
    ensure_account_owner(&auth, &user).map_err(domain_error)?;

    Ok(Json(ApiResponse::success(UserBody::from(user))))
}

#[utoipa::path(
    put,
    path = "/users/{username}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Account username")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<UserBody>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account owner")
    )
)]
pub async fn update(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserBody>>, (StatusCode, Json<ApiResponse<UserBody>>)> {
    let user = state.target_user(&username).await.map_err(domain_error)?;
    ensure_account_owner(&auth, &user).map_err(domain_error)?;

    let updated = state
        .accounts
        .update_account(&user, request.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(UserBody::from(updated))))
}

#[utoipa::path(
    delete,
    path = "/users/{username}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account owner")
    )
)]
pub async fn destroy(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ApiResponse<()>>)> {
    let user = state.target_user(&username).await.map_err(domain_error)?;
    ensure_account_owner(&auth, &user).map_err(domain_error)?;

    state
        .accounts
        .delete_account(&user)
        .await
        .map_err(domain_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/users/{username}/request-email-change",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Account username")),
    responses(
        (status = 200, description = "Change-email token sent to the current address"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account owner")
    )
)]
pub async fn request_email_change(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    let user = state.target_user(&username).await.map_err(domain_error)?;
    ensure_account_owner(&auth, &user).map_err(domain_error)?;

    state
        .accounts
        .request_email_change(&user)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    post,
    path = "/users/{username}/change-email",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Account username")),
    request_body = ChangeEmailRequest,
    responses(
        (status = 200, description = "Email changed, re-verification required", body = ApiResponse<UserBody>),
        (status = 400, description = "Token invalid or email taken"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account owner")
    )
)]
pub async fn change_email(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    ValidatedJson(request): ValidatedJson<ChangeEmailRequest>,
) -> Result<Json<ApiResponse<UserBody>>, (StatusCode, Json<ApiResponse<UserBody>>)> {
    let user = state.target_user(&username).await.map_err(domain_error)?;
    ensure_account_owner(&auth, &user).map_err(domain_error)?;

    let updated = state
        .accounts
        .change_email(&user, &request.token, &request.new_email)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(UserBody::from(updated))))
}
