pub mod profile_repository;
pub mod revoked_token_repository;
pub mod user_repository;

pub use profile_repository::ProfileRepository;
pub use revoked_token_repository::RevokedTokenRepository;
pub use user_repository::UserRepository;
