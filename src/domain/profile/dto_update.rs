/// Partial update of a profile's public metadata.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileDto {
    pub website: Option<String>,
    pub biography: Option<String>,
    pub picture: Option<String>,
}
