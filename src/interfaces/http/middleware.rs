//! Authentication middleware for Axum
//!
//! Verifies the bearer access token and attaches an `AuthenticatedUser` to
//! the request. The owner check lives here too so every handler applies the
//! same rule the same way.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::{DomainError, User};
use crate::infrastructure::crypto::jwt::{verify_token, Claims, JwtConfig, TokenError, TokenKind};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

/// Authentication state shared by every protected route
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// The authenticated principal, taken from a verified access token.
/// Handlers receive it as a request extension and pass it on explicitly;
/// there is no ambient "current user".
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
        }
    }
}

/// Owner-only access: the requester must be the user the resource belongs
/// to. Identity is compared by stable id, not username, so a rename does not
/// lock the owner out mid-session.
pub fn ensure_account_owner(auth: &AuthenticatedUser, target: &User) -> Result<(), DomainError> {
    if auth.user_id != target.id {
        return Err(DomainError::Forbidden(
            "You are not the account owner.".into(),
        ));
    }
    Ok(())
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Bearer-JWT authentication middleware
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(String::from);
    let Some(auth_header) = auth_header else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(&auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, TokenKind::Access, &auth_state.jwt_config) {
        Ok(claims) => {
            let user = AuthenticatedUser::from_claims(claims);
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(TokenError::Expired) => auth_error_response(AuthError::ExpiredToken),
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
    };

    let body = Json(json!({
        "success": false,
        "error": message
    }));

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user_with_id(id: &str) -> User {
        User {
            id: id.to_string(),
            username: "luis".into(),
            email: "luis@gmail.com".into(),
            password_hash: "$2b$12$hash".into(),
            first_name: "Luis".into(),
            last_name: "Perez".into(),
            phone_number: "+14687897977".into(),
            is_email_verified: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_check_compares_ids() {
        let auth = AuthenticatedUser {
            user_id: "u-1".into(),
            username: "luis".into(),
        };

        assert!(ensure_account_owner(&auth, &user_with_id("u-1")).is_ok());

        let err = ensure_account_owner(&auth, &user_with_id("u-2")).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(err.to_string().contains("not the account owner"));
    }
}
