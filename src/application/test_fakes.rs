//! In-memory fakes used by service and router tests.
//!
//! `InMemoryStore` implements all three repository traits over plain maps so
//! the services can be exercised without a database. It mirrors the cascade
//! semantics of the real schema: deleting a user removes its profile and any
//! follow edges touching that profile.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, Profile, ProfileRepositoryInterface, ProfileSummary,
    RevokedTokenRepositoryInterface, UpdateProfileDto, UpdateUserDto, User,
    UserRepositoryInterface,
};
use crate::infrastructure::email::{EmailMessage, Mailer};

#[derive(Default)]
pub struct InMemoryStore {
    pub users: Mutex<Vec<User>>,
    pub profiles: Mutex<Vec<Profile>>,
    /// (follower profile id, followed profile id)
    pub edges: Mutex<HashSet<(String, String)>>,
    pub revoked: Mutex<HashSet<String>>,
}

impl InMemoryStore {
    pub fn profile_id_for_user(&self, user_id: &str) -> Option<String> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .map(|p| p.id.clone())
    }
}

#[async_trait]
impl UserRepositoryInterface for InMemoryStore {
    async fn create_user_with_profile(&self, dto: CreateUserDto) -> DomainResult<User> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.username == dto.username || u.email == dto.email)
        {
            return Err(DomainError::Conflict(
                "Username or email already exists".into(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: dto.username,
            email: dto.email,
            password_hash: dto.password_hash,
            first_name: dto.first_name,
            last_name: dto.last_name,
            phone_number: dto.phone_number,
            is_email_verified: false,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());

        self.profiles.lock().unwrap().push(Profile {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            website: String::new(),
            biography: String::new(),
            picture: None,
            created_at: now,
            updated_at: now,
        });

        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let mut users = self.users.lock().unwrap();

        if let Some(new_username) = dto.username.as_deref() {
            if users.iter().any(|u| u.username == new_username && u.id != id) {
                return Err(DomainError::Conflict(
                    "Username or email already exists".into(),
                ));
            }
        }

        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = dto.username {
            user.username = username;
        }
        if let Some(first_name) = dto.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = dto.last_name {
            user.last_name = last_name;
        }
        if let Some(phone_number) = dto.phone_number {
            user.phone_number = phone_number;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            })?;
        user.password_hash = new_password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_user_email(&self, id: &str, email: &str) -> DomainResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.email = email.to_string();
        user.is_email_verified = false;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn mark_email_verified(&self, id: &str) -> DomainResult<Option<User>> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        user.is_email_verified = true;
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let existed = {
            let mut users = self.users.lock().unwrap();
            let before = users.len();
            users.retain(|u| u.id != id);
            users.len() != before
        };
        if !existed {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        }

        // Cascade: profile and its follow edges go with the user
        let profile_id = self.profile_id_for_user(id);
        self.profiles.lock().unwrap().retain(|p| p.user_id != id);
        if let Some(pid) = profile_id {
            self.edges
                .lock()
                .unwrap()
                .retain(|(follower, followed)| follower != &pid && followed != &pid);
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileRepositoryInterface for InMemoryStore {
    async fn get_profile_by_user_id(&self, user_id: &str) -> DomainResult<Option<Profile>> {
        Ok(self
            .profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn update_profile(
        &self,
        user_id: &str,
        dto: UpdateProfileDto,
    ) -> DomainResult<Option<Profile>> {
        let mut profiles = self.profiles.lock().unwrap();
        let Some(profile) = profiles.iter_mut().find(|p| p.user_id == user_id) else {
            return Ok(None);
        };
        if let Some(website) = dto.website {
            profile.website = website;
        }
        if let Some(biography) = dto.biography {
            profile.biography = biography;
        }
        if let Some(picture) = dto.picture {
            profile.picture = Some(picture);
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }

    async fn add_follow(&self, follower_id: &str, followed_id: &str) -> DomainResult<()> {
        self.edges
            .lock()
            .unwrap()
            .insert((follower_id.to_string(), followed_id.to_string()));
        Ok(())
    }

    async fn remove_follow(&self, follower_id: &str, followed_id: &str) -> DomainResult<()> {
        self.edges
            .lock()
            .unwrap()
            .remove(&(follower_id.to_string(), followed_id.to_string()));
        Ok(())
    }

    async fn is_following(&self, follower_id: &str, followed_id: &str) -> DomainResult<bool> {
        Ok(self
            .edges
            .lock()
            .unwrap()
            .contains(&(follower_id.to_string(), followed_id.to_string())))
    }

    async fn following(&self, profile_id: &str) -> DomainResult<Vec<ProfileSummary>> {
        let peer_ids: Vec<String> = self
            .edges
            .lock()
            .unwrap()
            .iter()
            .filter(|(follower, _)| follower == profile_id)
            .map(|(_, followed)| followed.clone())
            .collect();
        Ok(self.summaries(&peer_ids))
    }

    async fn followers(&self, profile_id: &str) -> DomainResult<Vec<ProfileSummary>> {
        let peer_ids: Vec<String> = self
            .edges
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, followed)| followed == profile_id)
            .map(|(follower, _)| follower.clone())
            .collect();
        Ok(self.summaries(&peer_ids))
    }
}

impl InMemoryStore {
    fn summaries(&self, profile_ids: &[String]) -> Vec<ProfileSummary> {
        let profiles = self.profiles.lock().unwrap();
        let users = self.users.lock().unwrap();
        profile_ids
            .iter()
            .filter_map(|pid| {
                let profile = profiles.iter().find(|p| &p.id == pid)?;
                let user = users.iter().find(|u| u.id == profile.user_id)?;
                Some(ProfileSummary {
                    username: user.username.clone(),
                    website: profile.website.clone(),
                    biography: profile.biography.clone(),
                    picture: profile.picture.clone(),
                })
            })
            .collect()
    }
}

#[async_trait]
impl RevokedTokenRepositoryInterface for InMemoryStore {
    async fn revoke(
        &self,
        jti: &str,
        _user_id: &str,
        _expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.revoked.lock().unwrap().insert(jti.to_string());
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> DomainResult<bool> {
        Ok(self.revoked.lock().unwrap().contains(jti))
    }
}

/// Mailer that records instead of sending. Flip `fail` to simulate delivery
/// failures.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> DomainResult<()> {
        if self.fail {
            return Err(DomainError::Email("simulated delivery failure".into()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
