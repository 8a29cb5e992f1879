//! Profile DTOs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{Profile, ProfileSummary, UpdateProfileDto};

/// Public profile representation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileBody {
    pub username: String,
    pub website: String,
    pub biography: String,
    pub picture: Option<String>,
}

impl ProfileBody {
    pub fn from_parts(username: String, profile: Profile) -> Self {
        Self {
            username,
            website: profile.website,
            biography: profile.biography,
            picture: profile.picture,
        }
    }
}

impl From<ProfileSummary> for ProfileBody {
    fn from(s: ProfileSummary) -> Self {
        Self {
            username: s.username,
            website: s.website,
            biography: s.biography,
            picture: s.picture,
        }
    }
}

/// Partial update of the profile's public metadata
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(
        length(max = 300, message = "website must be at most 300 characters"),
        url(message = "website must be a valid URL")
    )]
    pub website: Option<String>,
    pub biography: Option<String>,
    pub picture: Option<String>,
}

impl From<UpdateProfileRequest> for UpdateProfileDto {
    fn from(r: UpdateProfileRequest) -> Self {
        Self {
            website: r.website,
            biography: r.biography,
            picture: r.picture,
        }
    }
}
