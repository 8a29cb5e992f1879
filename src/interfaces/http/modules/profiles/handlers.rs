//! Profile API handlers
//!
//! Reading profiles and mutating the follow graph require authentication;
//! editing a profile's metadata is owner-only.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{ProfileBody, UpdateProfileRequest};
use crate::application::accounts::AccountService;
use crate::application::profiles::ProfileService;
use crate::domain::{DomainError, DomainResult, User};
use crate::interfaces::http::common::{domain_error, ApiResponse, ValidatedJson};
use crate::interfaces::http::middleware::{ensure_account_owner, AuthenticatedUser};

/// Profile handler state
#[derive(Clone)]
pub struct ProfileHandlerState {
    pub accounts: Arc<AccountService>,
    pub profiles: Arc<ProfileService>,
}

impl ProfileHandlerState {
    /// Resolve the acting principal back to its user record.
    async fn acting_user(&self, auth: &AuthenticatedUser) -> DomainResult<User> {
        self.accounts
            .get_user_by_id(&auth.user_id)
            .await?
            .ok_or_else(|| DomainError::Unauthorized("Invalid authentication token".into()))
    }
}

#[utoipa::path(
    get,
    path = "/profiles/{username}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Profile owner's username")),
    responses(
        (status = 200, description = "Profile details", body = ApiResponse<ProfileBody>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn get_profile(
    State(state): State<ProfileHandlerState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<ProfileBody>>, (StatusCode, Json<ApiResponse<ProfileBody>>)> {
    let (user, profile) = state
        .profiles
        .get_by_username(&username)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(ProfileBody::from_parts(
        user.username,
        profile,
    ))))
}

#[utoipa::path(
    put,
    path = "/profiles/{username}",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Profile owner's username")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<ProfileBody>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not the account owner")
    )
)]
pub async fn update_profile(
    State(state): State<ProfileHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<ProfileBody>>, (StatusCode, Json<ApiResponse<ProfileBody>>)> {
    let (user, _) = state
        .profiles
        .get_by_username(&username)
        .await
        .map_err(domain_error)?;
    ensure_account_owner(&auth, &user).map_err(domain_error)?;

    let profile = state
        .profiles
        .update_own(&user, request.into())
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(ProfileBody::from_parts(
        user.username,
        profile,
    ))))
}

#[utoipa::path(
    post,
    path = "/profiles/{username}/follow",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Username to follow")),
    responses(
        (status = 200, description = "Now following"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn follow(
    State(state): State<ProfileHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    let actor = state.acting_user(&auth).await.map_err(domain_error)?;
    state
        .profiles
        .follow(&actor, &username)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    post,
    path = "/profiles/{username}/unfollow",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Username to unfollow")),
    responses(
        (status = 200, description = "No longer following"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn unfollow(
    State(state): State<ProfileHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, Json<ApiResponse<()>>)> {
    let actor = state.acting_user(&auth).await.map_err(domain_error)?;
    state
        .profiles
        .unfollow(&actor, &username)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(())))
}

#[utoipa::path(
    get,
    path = "/profiles/{username}/followers",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Profile owner's username")),
    responses(
        (status = 200, description = "Profiles following this one", body = ApiResponse<Vec<ProfileBody>>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn followers(
    State(state): State<ProfileHandlerState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<ProfileBody>>>, (StatusCode, Json<ApiResponse<Vec<ProfileBody>>>)>
{
    let summaries = state
        .profiles
        .followers(&username)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(
        summaries.into_iter().map(ProfileBody::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/profiles/{username}/following",
    tag = "Profiles",
    security(("bearer_auth" = [])),
    params(("username" = String, Path, description = "Profile owner's username")),
    responses(
        (status = 200, description = "Profiles this one follows", body = ApiResponse<Vec<ProfileBody>>),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Unknown username")
    )
)]
pub async fn following(
    State(state): State<ProfileHandlerState>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<Vec<ProfileBody>>>, (StatusCode, Json<ApiResponse<Vec<ProfileBody>>>)>
{
    let summaries = state
        .profiles
        .following(&username)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(
        summaries.into_iter().map(ProfileBody::from).collect(),
    )))
}
