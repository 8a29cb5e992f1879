use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::DomainResult;

#[async_trait]
pub trait RevokedTokenRepositoryInterface: Send + Sync {
    /// Record a refresh token's `jti` as revoked. `expires_at` lets the
    /// store eventually prune entries that can no longer be replayed.
    async fn revoke(
        &self,
        jti: &str,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()>;

    async fn is_revoked(&self, jti: &str) -> DomainResult<bool>;
}
