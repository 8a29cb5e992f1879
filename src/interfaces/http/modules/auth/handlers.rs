//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{LoginRequest, LoginResponse, RefreshTokenRequest, RefreshTokenResponse};
use crate::application::accounts::AccountService;
use crate::interfaces::http::common::{domain_error, ApiResponse, ValidatedJson};

/// Auth handler state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub accounts: Arc<AccountService>,
}

#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access/refresh token pair", body = ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, (StatusCode, Json<ApiResponse<LoginResponse>>)> {
    let tokens = state
        .accounts
        .login(&request.username, &request.password)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(LoginResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
    })))
}

#[utoipa::path(
    post,
    path = "/users/refresh-token",
    tag = "Authentication",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New access token", body = ApiResponse<RefreshTokenResponse>),
        (status = 401, description = "Refresh token invalid, expired or revoked")
    )
)]
pub async fn refresh_token(
    State(state): State<AuthHandlerState>,
    ValidatedJson(request): ValidatedJson<RefreshTokenRequest>,
) -> Result<
    Json<ApiResponse<RefreshTokenResponse>>,
    (StatusCode, Json<ApiResponse<RefreshTokenResponse>>),
> {
    let access = state
        .accounts
        .refresh_access_token(&request.refresh)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(RefreshTokenResponse { access })))
}
