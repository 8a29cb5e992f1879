//! User aggregate
//!
//! Contains the User entity, DTOs, and repository interface.

pub mod model;
pub mod repository;

mod dto_create;
mod dto_update;

pub use model::User;

pub use dto_create::{CreateUserDto, SignupDto};
pub use dto_update::{UpdateAccountDto, UpdateUserDto};

pub use repository::UserRepositoryInterface;
