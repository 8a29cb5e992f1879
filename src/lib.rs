//! # Platzigram API
//!
//! User-account backend for a photo-sharing service: signup with email
//! verification, JWT login/refresh with individual refresh-token
//! revocation, self-service account management, and profile follow graph.
//!
//! ## Architecture
//!
//! - **domain**: Entities, DTOs and repository traits
//! - **application**: Use-case services (account lifecycle, profiles)
//! - **infrastructure**: External concerns (database, crypto, email)
//! - **interfaces**: HTTP REST API with Swagger documentation
//! - **shared**: Error taxonomy

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::create_api_router;
