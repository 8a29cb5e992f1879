use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::{DomainResult, RevokedTokenRepositoryInterface};
use crate::infrastructure::database::entities::revoked_token;

pub struct RevokedTokenRepository {
    db: DatabaseConnection,
}

impl RevokedTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RevokedTokenRepositoryInterface for RevokedTokenRepository {
    async fn revoke(
        &self,
        jti: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        let entry = revoked_token::ActiveModel {
            jti: Set(jti.to_string()),
            user_id: Set(user_id.to_string()),
            expires_at: Set(expires_at),
            revoked_at: Set(Utc::now()),
        };

        // Revoking the same token twice is fine
        match entry.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn is_revoked(&self, jti: &str) -> DomainResult<bool> {
        let entry = revoked_token::Entity::find_by_id(jti).one(&self.db).await?;
        Ok(entry.is_some())
    }
}
