/// Fields a user may change about their own account at any time.
/// Email is read-only here; it only moves through the change-email flow.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserDto {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
}

/// Full self-service account update, including the optional password-change
/// group. The four password-change fields travel together: if any is present
/// all must be.
#[derive(Debug, Clone, Default)]
pub struct UpdateAccountDto {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirmation: Option<String>,
    pub refresh_token: Option<String>,
}

impl UpdateAccountDto {
    /// Whether the request is attempting a password change at all.
    pub fn wants_password_change(&self) -> bool {
        self.password.is_some()
            || self.new_password.is_some()
            || self.new_password_confirmation.is_some()
            || self.refresh_token.is_some()
    }

    /// Names of the password-change fields missing from an attempted change.
    pub fn missing_password_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.password.is_none() {
            missing.push("password");
        }
        if self.new_password.is_none() {
            missing.push("new_password");
        }
        if self.new_password_confirmation.is_none() {
            missing.push("new_password_confirmation");
        }
        if self.refresh_token.is_none() {
            missing.push("refresh_token");
        }
        missing
    }

    pub fn profile_fields(&self) -> UpdateUserDto {
        UpdateUserDto {
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}
