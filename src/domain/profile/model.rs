use chrono::{DateTime, Utc};

/// Profile model — public data of a user.
#[derive(Clone, Debug)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub website: String,
    pub biography: String,
    pub picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile joined with its owner's username, for follower/following listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProfileSummary {
    pub username: String,
    pub website: String,
    pub biography: String,
    pub picture: Option<String>,
}
