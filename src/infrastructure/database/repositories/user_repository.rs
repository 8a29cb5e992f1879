use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::domain::{
    CreateUserDto, DomainError, DomainResult, UpdateUserDto, User, UserRepositoryInterface,
};
use crate::infrastructure::database::entities::{profile, user};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        username: model.username,
        email: model.email,
        password_hash: model.password_hash,
        first_name: model.first_name,
        last_name: model.last_name,
        phone_number: model.phone_number,
        is_email_verified: model.is_email_verified,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

fn map_insert_err(e: sea_orm::DbErr) -> DomainError {
    if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
        DomainError::Conflict("Username or email already exists".to_string())
    } else {
        DomainError::Database(e)
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user_with_profile(&self, dto: CreateUserDto) -> DomainResult<User> {
        let now = Utc::now();
        let user_id = uuid::Uuid::new_v4().to_string();

        // Explicit two-step create in one transaction: the user row and its
        // profile row commit together or not at all.
        let txn = self.db.begin().await?;

        let new_user = user::ActiveModel {
            id: Set(user_id.clone()),
            username: Set(dto.username),
            email: Set(dto.email),
            password_hash: Set(dto.password_hash),
            first_name: Set(dto.first_name),
            last_name: Set(dto.last_name),
            phone_number: Set(dto.phone_number),
            is_email_verified: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let inserted = new_user.insert(&txn).await.map_err(map_insert_err)?;

        let new_profile = profile::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            user_id: Set(user_id),
            website: Set(String::new()),
            biography: Set(String::new()),
            picture: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        new_profile.insert(&txn).await?;

        txn.commit().await?;

        Ok(user_model_to_domain(inserted))
    }

    async fn get_user_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_id(&self, id: &str) -> DomainResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(user_model_to_domain))
    }

    async fn update_user(&self, id: &str, dto: UpdateUserDto) -> DomainResult<Option<User>> {
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = model.into();
        if let Some(username) = dto.username {
            active.username = Set(username);
        }
        if let Some(first_name) = dto.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = dto.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone_number) = dto.phone_number {
            active.phone_number = Set(phone_number);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(map_insert_err)?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn update_user_password(&self, id: &str, new_password_hash: &str) -> DomainResult<()> {
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        };

        let mut active: user::ActiveModel = model.into();
        active.password_hash = Set(new_password_hash.to_string());
        active.updated_at = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn update_user_email(&self, id: &str, email: &str) -> DomainResult<Option<User>> {
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = model.into();
        active.email = Set(email.to_string());
        active.is_email_verified = Set(false);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await.map_err(map_insert_err)?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn mark_email_verified(&self, id: &str) -> DomainResult<Option<User>> {
        let Some(model) = user::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: user::ActiveModel = model.into();
        active.is_email_verified = Set(true);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&self.db).await?;
        Ok(Some(user_model_to_domain(updated)))
    }

    async fn delete_user(&self, id: &str) -> DomainResult<()> {
        let result = user::Entity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(DomainError::NotFound {
                entity: "User",
                field: "id",
                value: id.to_string(),
            });
        }
        Ok(())
    }
}
