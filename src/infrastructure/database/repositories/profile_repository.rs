use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::domain::{
    DomainResult, Profile, ProfileRepositoryInterface, ProfileSummary, UpdateProfileDto,
};
use crate::infrastructure::database::entities::{profile, profile_follow, user};

pub struct ProfileRepository {
    db: DatabaseConnection,
}

impl ProfileRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolve a set of profile rows into summaries carrying the owner's
    /// username.
    async fn summaries_for(&self, models: Vec<profile::Model>) -> DomainResult<Vec<ProfileSummary>> {
        let user_ids: Vec<String> = models.iter().map(|p| p.user_id.clone()).collect();
        let users: HashMap<String, String> = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        Ok(models
            .into_iter()
            .filter_map(|p| {
                users.get(&p.user_id).map(|username| ProfileSummary {
                    username: username.clone(),
                    website: p.website,
                    biography: p.biography,
                    picture: p.picture,
                })
            })
            .collect())
    }
}

fn profile_model_to_domain(model: profile::Model) -> Profile {
    Profile {
        id: model.id,
        user_id: model.user_id,
        website: model.website,
        biography: model.biography,
        picture: model.picture,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl ProfileRepositoryInterface for ProfileRepository {
    async fn get_profile_by_user_id(&self, user_id: &str) -> DomainResult<Option<Profile>> {
        let model = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;
        Ok(model.map(profile_model_to_domain))
    }

    async fn update_profile(
        &self,
        user_id: &str,
        dto: UpdateProfileDto,
    ) -> DomainResult<Option<Profile>> {
        let Some(model) = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut active: profile::ActiveModel = model.into();
        if let Some(website) = dto.website {
            active.website = Set(website);
        }
        if let Some(biography) = dto.biography {
            active.biography = Set(biography);
        }
        if let Some(picture) = dto.picture {
            active.picture = Set(Some(picture));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(profile_model_to_domain(updated)))
    }

    async fn add_follow(&self, follower_id: &str, followed_id: &str) -> DomainResult<()> {
        if self.is_following(follower_id, followed_id).await? {
            return Ok(());
        }

        let edge = profile_follow::ActiveModel {
            follower_id: Set(follower_id.to_string()),
            followed_id: Set(followed_id.to_string()),
            created_at: Set(Utc::now()),
        };
        edge.insert(&self.db).await?;
        Ok(())
    }

    async fn remove_follow(&self, follower_id: &str, followed_id: &str) -> DomainResult<()> {
        profile_follow::Entity::delete_many()
            .filter(profile_follow::Column::FollowerId.eq(follower_id))
            .filter(profile_follow::Column::FollowedId.eq(followed_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn is_following(&self, follower_id: &str, followed_id: &str) -> DomainResult<bool> {
        let edge = profile_follow::Entity::find_by_id((
            follower_id.to_string(),
            followed_id.to_string(),
        ))
        .one(&self.db)
        .await?;
        Ok(edge.is_some())
    }

    async fn following(&self, profile_id: &str) -> DomainResult<Vec<ProfileSummary>> {
        let followed_ids: Vec<String> = profile_follow::Entity::find()
            .filter(profile_follow::Column::FollowerId.eq(profile_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.followed_id)
            .collect();

        let models = profile::Entity::find()
            .filter(profile::Column::Id.is_in(followed_ids))
            .all(&self.db)
            .await?;

        self.summaries_for(models).await
    }

    async fn followers(&self, profile_id: &str) -> DomainResult<Vec<ProfileSummary>> {
        let follower_ids: Vec<String> = profile_follow::Entity::find()
            .filter(profile_follow::Column::FollowedId.eq(profile_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|e| e.follower_id)
            .collect();

        let models = profile::Entity::find()
            .filter(profile::Column::Id.is_in(follower_ids))
            .all(&self.db)
            .await?;

        self.summaries_for(models).await
    }
}
