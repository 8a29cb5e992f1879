pub mod profile;
pub mod token;
pub mod user;

// Re-export commonly used types
pub use profile::{Profile, ProfileRepositoryInterface, ProfileSummary, UpdateProfileDto};
pub use token::RevokedTokenRepositoryInterface;
pub use user::{
    CreateUserDto, SignupDto, UpdateAccountDto, UpdateUserDto, User, UserRepositoryInterface,
};

// Re-export the error taxonomy for convenience
pub use crate::shared::{DomainError, DomainResult};
