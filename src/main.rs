//! Platzigram account service entry point.
//!
//! Reads configuration from a TOML file (~/.config/platzigram/config.toml),
//! runs migrations, then serves the REST API.

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info};

use platzigram_api::application::accounts::AccountService;
use platzigram_api::application::profiles::ProfileService;
use platzigram_api::config::AppConfig;
use platzigram_api::infrastructure::crypto::jwt::JwtConfig;
use platzigram_api::infrastructure::database::migrator::Migrator;
use platzigram_api::infrastructure::database::repositories::{
    ProfileRepository, RevokedTokenRepository, UserRepository,
};
use platzigram_api::infrastructure::email::ResendMailer;
use platzigram_api::{create_api_router, default_config_path, init_database, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("PLATZIGRAM_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Platzigram account service...");

    let jwt_config = JwtConfig {
        secret: app_cfg.security.jwt_secret.clone(),
        issuer: "platzigram".to_string(),
        access_token_minutes: app_cfg.security.access_token_minutes,
        refresh_token_days: app_cfg.security.refresh_token_days,
        email_token_days: app_cfg.security.email_token_days,
    };
    info!(
        "JWT configured: {}m access tokens, {}d refresh tokens",
        jwt_config.access_token_minutes, jwt_config.refresh_token_days
    );

    // ── Database ───────────────────────────────────────────────
    let db_config = DatabaseConfig {
        url: app_cfg.database.url.clone(),
    };
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    // ── Repositories & services ────────────────────────────────
    let users = Arc::new(UserRepository::new(db.clone()));
    let profiles = Arc::new(ProfileRepository::new(db.clone()));
    let revoked_tokens = Arc::new(RevokedTokenRepository::new(db.clone()));
    let mailer = Arc::new(ResendMailer::new(&app_cfg.email));

    let accounts = Arc::new(AccountService::new(
        users.clone(),
        revoked_tokens,
        mailer,
        jwt_config.clone(),
        app_cfg.server.dns.clone(),
    ));
    let profile_service = Arc::new(ProfileService::new(users, profiles));

    // ── REST API ───────────────────────────────────────────────
    let api_router = create_api_router(accounts, profile_service, jwt_config);

    let addr = app_cfg.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("REST API server listening on http://{}", addr);
    info!("Swagger UI available at http://{}/docs/", addr);

    axum::serve(listener, api_router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown signal received");
        })
        .await?;

    if let Err(e) = db.close().await {
        error!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Platzigram account service shutdown complete");
    Ok(())
}
