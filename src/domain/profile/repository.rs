use async_trait::async_trait;

use super::{Profile, ProfileSummary, UpdateProfileDto};
use crate::domain::DomainResult;

/// Repository over profiles and the directed follow-edge set.
///
/// An edge `(follower, followed)` means "follower follows followed".
/// `following` and `followers` are the two views of the same edge set, so
/// adding or removing an edge keeps both views consistent by construction.
#[async_trait]
pub trait ProfileRepositoryInterface: Send + Sync {
    async fn get_profile_by_user_id(&self, user_id: &str) -> DomainResult<Option<Profile>>;

    async fn update_profile(
        &self,
        user_id: &str,
        dto: UpdateProfileDto,
    ) -> DomainResult<Option<Profile>>;

    /// Insert the edge (follower, followed). Idempotent.
    async fn add_follow(&self, follower_id: &str, followed_id: &str) -> DomainResult<()>;

    /// Remove the edge (follower, followed). Removing an absent edge is a no-op.
    async fn remove_follow(&self, follower_id: &str, followed_id: &str) -> DomainResult<()>;

    async fn is_following(&self, follower_id: &str, followed_id: &str) -> DomainResult<bool>;

    /// Profiles this profile follows.
    async fn following(&self, profile_id: &str) -> DomainResult<Vec<ProfileSummary>>;

    /// Profiles following this profile.
    async fn followers(&self, profile_id: &str) -> DomainResult<Vec<ProfileSummary>>;
}
