//! SeaORM entities

pub mod profile;
pub mod profile_follow;
pub mod revoked_token;
pub mod user;
