use chrono::{DateTime, Utc};

/// User model
///
/// `is_email_verified` flips to true exactly once, through the verification
/// flow; there is no path back except an applied email change, which resets
/// it for the new address.
#[derive(Clone, Debug)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub is_email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
