//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod email;

pub use database::{init_database, DatabaseConfig};
pub use email::{EmailMessage, Mailer, ResendMailer};
