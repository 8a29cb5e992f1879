//! Profile service — public metadata and follow graph orchestration
//!
//! Follow edges are directed: following someone never implies they follow
//! back. Both views of an edge (`following` and `followers`) read the same
//! edge set, so adding or removing a follow keeps them consistent.

use std::sync::Arc;

use tracing::info;

use crate::domain::{
    DomainError, DomainResult, Profile, ProfileRepositoryInterface, ProfileSummary,
    UpdateProfileDto, User, UserRepositoryInterface,
};

pub struct ProfileService {
    users: Arc<dyn UserRepositoryInterface>,
    profiles: Arc<dyn ProfileRepositoryInterface>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UserRepositoryInterface>,
        profiles: Arc<dyn ProfileRepositoryInterface>,
    ) -> Self {
        Self { users, profiles }
    }

    /// Resolve a username to its user and profile. Every user has exactly
    /// one profile, created alongside it, so a missing profile is a 404 on
    /// the username, not an internal inconsistency the caller can cause.
    pub async fn get_by_username(&self, username: &str) -> DomainResult<(User, Profile)> {
        let user = self
            .users
            .get_user_by_username(username)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "username",
                value: username.to_string(),
            })?;

        let profile = self
            .profiles
            .get_profile_by_user_id(&user.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Profile",
                field: "username",
                value: username.to_string(),
            })?;

        Ok((user, profile))
    }

    /// Update the acting user's own profile metadata.
    pub async fn update_own(&self, user: &User, dto: UpdateProfileDto) -> DomainResult<Profile> {
        self.profiles
            .update_profile(&user.id, dto)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Profile",
                field: "user_id",
                value: user.id.clone(),
            })
    }

    /// The acting user starts following `target_username`.
    pub async fn follow(&self, actor: &User, target_username: &str) -> DomainResult<()> {
        let (actor_profile, target_profile) =
            self.edge_endpoints(actor, target_username).await?;

        self.profiles
            .add_follow(&actor_profile.id, &target_profile.id)
            .await?;

        info!(follower = %actor.username, followed = %target_username, "Follow added");
        Ok(())
    }

    /// The acting user stops following `target_username`. Removes exactly
    /// the (actor, target) edge; the reverse edge, if any, is untouched.
    pub async fn unfollow(&self, actor: &User, target_username: &str) -> DomainResult<()> {
        let (actor_profile, target_profile) =
            self.edge_endpoints(actor, target_username).await?;

        self.profiles
            .remove_follow(&actor_profile.id, &target_profile.id)
            .await?;

        info!(follower = %actor.username, followed = %target_username, "Follow removed");
        Ok(())
    }

    pub async fn followers(&self, username: &str) -> DomainResult<Vec<ProfileSummary>> {
        let (_, profile) = self.get_by_username(username).await?;
        self.profiles.followers(&profile.id).await
    }

    pub async fn following(&self, username: &str) -> DomainResult<Vec<ProfileSummary>> {
        let (_, profile) = self.get_by_username(username).await?;
        self.profiles.following(&profile.id).await
    }

    async fn edge_endpoints(
        &self,
        actor: &User,
        target_username: &str,
    ) -> DomainResult<(Profile, Profile)> {
        let actor_profile = self
            .profiles
            .get_profile_by_user_id(&actor.id)
            .await?
            .ok_or(DomainError::NotFound {
                entity: "Profile",
                field: "user_id",
                value: actor.id.clone(),
            })?;

        let (_, target_profile) = self.get_by_username(target_username).await?;
        Ok((actor_profile, target_profile))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::accounts::AccountService;
    use crate::application::test_fakes::{InMemoryStore, RecordingMailer};
    use crate::domain::SignupDto;
    use crate::infrastructure::crypto::jwt::JwtConfig;

    struct Fixture {
        store: Arc<InMemoryStore>,
        accounts: AccountService,
        profiles: ProfileService,
    }

    fn setup() -> Fixture {
        let store = Arc::new(InMemoryStore::default());
        let accounts = AccountService::new(
            store.clone(),
            store.clone(),
            Arc::new(RecordingMailer::default()),
            JwtConfig::default(),
            "platzigram.com".to_string(),
        );
        let profiles = ProfileService::new(store.clone(), store.clone());
        Fixture {
            store,
            accounts,
            profiles,
        }
    }

    async fn signup(fixture: &Fixture, username: &str) -> User {
        fixture
            .accounts
            .signup(SignupDto {
                username: username.to_string(),
                email: format!("{username}@gmail.com"),
                password: "idkskere99".to_string(),
                password_confirmation: "idkskere99".to_string(),
                first_name: "Francisco".to_string(),
                last_name: "Ramirez".to_string(),
                phone_number: "+529581006329".to_string(),
            })
            .await
            .unwrap()
    }

    fn usernames(summaries: &[crate::domain::ProfileSummary]) -> Vec<&str> {
        summaries.iter().map(|s| s.username.as_str()).collect()
    }

    #[tokio::test]
    async fn follow_populates_both_views_of_the_edge() {
        let fx = setup();
        let cheke = signup(&fx, "cheke").await;
        signup(&fx, "hermabody").await;

        fx.profiles.follow(&cheke, "hermabody").await.unwrap();

        assert_eq!(usernames(&fx.profiles.following("cheke").await.unwrap()), ["hermabody"]);
        assert_eq!(usernames(&fx.profiles.followers("hermabody").await.unwrap()), ["cheke"]);

        // The relation is asymmetric: nothing appears in the reverse views
        assert!(fx.profiles.followers("cheke").await.unwrap().is_empty());
        assert!(fx.profiles.following("hermabody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unfollow_clears_both_views_of_the_edge() {
        let fx = setup();
        let cheke = signup(&fx, "cheke").await;
        signup(&fx, "hermabody").await;

        fx.profiles.follow(&cheke, "hermabody").await.unwrap();
        fx.profiles.unfollow(&cheke, "hermabody").await.unwrap();

        assert!(fx.profiles.following("cheke").await.unwrap().is_empty());
        assert!(fx.profiles.followers("hermabody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unfollow_leaves_the_reverse_edge_alone() {
        let fx = setup();
        let cheke = signup(&fx, "cheke").await;
        let herma = signup(&fx, "hermabody").await;

        fx.profiles.follow(&cheke, "hermabody").await.unwrap();
        fx.profiles.follow(&herma, "cheke").await.unwrap();

        fx.profiles.unfollow(&cheke, "hermabody").await.unwrap();

        // Only the (cheke -> hermabody) edge is gone
        assert!(fx.profiles.following("cheke").await.unwrap().is_empty());
        assert_eq!(usernames(&fx.profiles.followers("cheke").await.unwrap()), ["hermabody"]);
        assert_eq!(usernames(&fx.profiles.following("hermabody").await.unwrap()), ["cheke"]);
    }

    #[tokio::test]
    async fn follow_is_idempotent() {
        let fx = setup();
        let cheke = signup(&fx, "cheke").await;
        signup(&fx, "hermabody").await;

        fx.profiles.follow(&cheke, "hermabody").await.unwrap();
        fx.profiles.follow(&cheke, "hermabody").await.unwrap();

        assert_eq!(fx.profiles.followers("hermabody").await.unwrap().len(), 1);
        assert_eq!(fx.store.edges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn follow_unknown_target_is_not_found() {
        let fx = setup();
        let cheke = signup(&fx, "cheke").await;

        assert!(matches!(
            fx.profiles.follow(&cheke, "nobody").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_own_profile_metadata() {
        let fx = setup();
        let cheke = signup(&fx, "cheke").await;

        let profile = fx
            .profiles
            .update_own(
                &cheke,
                UpdateProfileDto {
                    website: Some("https://cheke.dev".to_string()),
                    biography: Some("I take pictures.".to_string()),
                    picture: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(profile.website, "https://cheke.dev");
        assert_eq!(profile.biography, "I take pictures.");
        assert!(profile.picture.is_none());
    }
}
