use async_trait::async_trait;

use super::{CreateUserDto, UpdateUserDto, User};
use crate::domain::DomainResult;

#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// Create the user and its profile as one unit. If the profile insert
    /// fails the user insert must not survive.
    async fn create_user_with_profile(&self, dto: CreateUserDto) -> DomainResult<User>;

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>>;
    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>>;

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>>;
    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()>;
    /// Apply a new email address and reset `is_email_verified` to false.
    async fn update_user_email(&self, id: &str, email: &str) -> DomainResult<Option<User>>;
    async fn mark_email_verified(&self, id: &str) -> DomainResult<Option<User>>;
    async fn delete_user(&self, id: &str) -> DomainResult<()>;
}
