//! Refresh-token revocation
//!
//! Refresh tokens are revoked individually by `jti`. A revoked token can
//! never be exchanged for a new access token again. Tokens that were never
//! submitted for revocation stay valid until they expire.

pub mod repository;

pub use repository::RevokedTokenRepositoryInterface;
