//! Account lifecycle use-cases

pub mod service;

pub use service::{AccountService, AuthTokens};
