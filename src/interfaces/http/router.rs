//! API router with Swagger UI
//!
//! Route table doubles as the access-policy table:
//!
//! | routes | policy |
//! |---|---|
//! | signup, verify, login, refresh-token, health | anonymous |
//! | /users/{username} (+ email-change), profile update | authenticated + owner |
//! | profile get/follow/unfollow/followers/following | authenticated |
//!
//! The owner check itself runs inside the handlers, after the target user is
//! resolved; the middleware only authenticates.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::accounts::AccountService;
use crate::application::profiles::ProfileService;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::ApiResponse;
use crate::interfaces::http::middleware::{auth_middleware, AuthState};
use crate::interfaces::http::modules::{auth, health, profiles, users};

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer access token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::handlers::health_check,
        // Auth
        auth::handlers::login,
        auth::handlers::refresh_token,
        // Users
        users::handlers::signup,
        users::handlers::verify,
        users::handlers::retrieve,
        users::handlers::update,
        users::handlers::destroy,
        users::handlers::request_email_change,
        users::handlers::change_email,
        // Profiles
        profiles::handlers::get_profile,
        profiles::handlers::update_profile,
        profiles::handlers::follow,
        profiles::handlers::unfollow,
        profiles::handlers::followers,
        profiles::handlers::following,
    ),
    components(
        schemas(
            ApiResponse<String>,
            // Users
            users::dto::UserBody,
            users::dto::SignupRequest,
            users::dto::VerifyRequest,
            users::dto::UpdateUserRequest,
            users::dto::ChangeEmailRequest,
            // Auth
            auth::dto::LoginRequest,
            auth::dto::LoginResponse,
            auth::dto::RefreshTokenRequest,
            auth::dto::RefreshTokenResponse,
            // Profiles
            profiles::dto::ProfileBody,
            profiles::dto::UpdateProfileRequest,
            // Health
            health::handlers::HealthResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Login (JWT pair) and refresh-token exchange"),
        (name = "Users", description = "Signup, email verification, self-service account management"),
        (name = "Profiles", description = "Public profiles and the follow graph"),
    ),
    info(
        title = "Platzigram API",
        version = "1.0.0",
        description = "User-account backend for the Platzigram photo-sharing service",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(
    accounts: Arc<AccountService>,
    profile_service: Arc<ProfileService>,
    jwt_config: JwtConfig,
) -> Router {
    let auth_state = AuthState { jwt_config };

    let user_state = users::UserHandlerState {
        accounts: accounts.clone(),
    };
    let auth_handler_state = auth::AuthHandlerState {
        accounts: accounts.clone(),
    };
    let profile_state = profiles::ProfileHandlerState {
        accounts,
        profiles: profile_service,
    };

    // Anonymous account routes
    let public_user_routes = Router::new()
        .route("/signup", post(users::handlers::signup))
        .route("/verify", post(users::handlers::verify))
        .with_state(user_state.clone());

    // Anonymous token routes
    let token_routes = Router::new()
        .route("/login", post(auth::handlers::login))
        .route("/refresh-token", post(auth::handlers::refresh_token))
        .with_state(auth_handler_state);

    // Owner-only account routes
    let owner_user_routes = Router::new()
        .route(
            "/{username}",
            get(users::handlers::retrieve)
                .put(users::handlers::update)
                .patch(users::handlers::update)
                .delete(users::handlers::destroy),
        )
        .route(
            "/{username}/request-email-change",
            post(users::handlers::request_email_change),
        )
        .route(
            "/{username}/change-email",
            post(users::handlers::change_email),
        )
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(user_state);

    // Authenticated profile routes (metadata edit is owner-only, checked in
    // the handler)
    let profile_routes = Router::new()
        .route(
            "/{username}",
            get(profiles::handlers::get_profile).put(profiles::handlers::update_profile),
        )
        .route("/{username}/follow", post(profiles::handlers::follow))
        .route("/{username}/unfollow", post(profiles::handlers::unfollow))
        .route("/{username}/followers", get(profiles::handlers::followers))
        .route("/{username}/following", get(profiles::handlers::following))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(profile_state);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(swagger_routes)
        .route("/health", get(health::handlers::health_check))
        .nest("/users", public_user_routes)
        .nest("/users", token_routes)
        .nest("/users", owner_user_routes)
        .nest("/profiles", profile_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::application::test_fakes::{InMemoryStore, RecordingMailer};

    fn app() -> Router {
        let store = Arc::new(InMemoryStore::default());
        let jwt_config = JwtConfig::default();
        let accounts = Arc::new(AccountService::new(
            store.clone(),
            store.clone(),
            Arc::new(RecordingMailer::default()),
            jwt_config.clone(),
            "platzigram.com".to_string(),
        ));
        let profiles = Arc::new(ProfileService::new(store.clone(), store));
        create_api_router(accounts, profiles, jwt_config)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    fn authed_request(
        method: &str,
        uri: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    fn signup_body(username: &str) -> serde_json::Value {
        serde_json::json!({
            "username": username,
            "email": format!("{username}@gmail.com"),
            "password": "luis1234",
            "password_confirmation": "luis1234",
            "first_name": "Luis",
            "last_name": "Perez",
            "phone_number": "+14687897977"
        })
    }

    async fn body_json(resp: axum::http::Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup_and_login(app: &Router, username: &str) -> String {
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/users/signup", signup_body(username)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                serde_json::json!({"username": username, "password": "luis1234"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        json["data"]["access"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn signup_returns_201_with_public_body() {
        let app = app();
        let resp = app
            .oneshot(json_request("POST", "/users/signup", signup_body("luis")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["username"], "luis");
        assert_eq!(json["data"]["is_email_verified"], false);
        assert!(json["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn signup_validation_failure_is_400() {
        let app = app();
        let mut body = signup_body("luis");
        body["phone_number"] = serde_json::json!("not-a-phone");

        let resp = app
            .oneshot(json_request("POST", "/users/signup", body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn owner_only_routes_reject_anonymous_with_401() {
        let app = app();
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/users/luis")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn owner_only_routes_reject_non_owner_with_403() {
        let app = app();
        signup_and_login(&app, "luis").await;
        let pablo_token = signup_and_login(&app, "pablo").await;

        let resp = app
            .oneshot(authed_request("GET", "/users/luis", &pablo_token, None))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("not the account owner"));
    }

    #[tokio::test]
    async fn owner_can_retrieve_update_and_delete() {
        let app = app();
        let token = signup_and_login(&app, "luis").await;

        let resp = app
            .clone()
            .oneshot(authed_request("GET", "/users/luis", &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["email"], "luis@gmail.com");

        let resp = app
            .clone()
            .oneshot(authed_request(
                "PATCH",
                "/users/luis",
                &token,
                Some(serde_json::json!({"first_name": "Pablo"})),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"]["first_name"], "Pablo");

        let resp = app
            .clone()
            .oneshot(authed_request("DELETE", "/users/luis", &token, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn refresh_token_round_trip_and_revocation() {
        let app = app();
        let resp = app
            .clone()
            .oneshot(json_request("POST", "/users/signup", signup_body("luis")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/login",
                serde_json::json!({"username": "luis", "password": "luis1234"}),
            ))
            .await
            .unwrap();
        let login = body_json(resp).await;
        let access = login["data"]["access"].as_str().unwrap().to_string();
        let refresh = login["data"]["refresh"].as_str().unwrap().to_string();

        // The refresh token exchanges for a new access token
        let resp = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/users/refresh-token",
                serde_json::json!({"refresh": refresh}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // Change the password, submitting that refresh token
        let resp = app
            .clone()
            .oneshot(authed_request(
                "PATCH",
                "/users/luis",
                &access,
                Some(serde_json::json!({
                    "password": "luis1234",
                    "new_password": "holaxd1234",
                    "new_password_confirmation": "holaxd1234",
                    "refresh_token": refresh
                })),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        // The submitted refresh token no longer works
        let resp = app
            .oneshot(json_request(
                "POST",
                "/users/refresh-token",
                serde_json::json!({"refresh": refresh}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_401() {
        let app = app();
        signup_and_login(&app, "luis").await;

        let resp = app
            .oneshot(json_request(
                "POST",
                "/users/login",
                serde_json::json!({"username": "luis", "password": "wrong"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn follow_and_list_through_the_api() {
        let app = app();
        let luis_token = signup_and_login(&app, "luis").await;
        signup_and_login(&app, "pablo").await;

        let resp = app
            .clone()
            .oneshot(authed_request(
                "POST",
                "/profiles/pablo/follow",
                &luis_token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app
            .clone()
            .oneshot(authed_request(
                "GET",
                "/profiles/pablo/followers",
                &luis_token,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["data"][0]["username"], "luis");

        // Anonymous access to the follow graph is rejected
        let resp = app
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/profiles/pablo/followers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
