/// Raw signup input, before cross-field validation.
#[derive(Debug, Clone)]
pub struct SignupDto {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

/// Persistence-level create payload. The password is already hashed here;
/// plaintext never crosses the repository boundary.
#[derive(Debug, Clone)]
pub struct CreateUserDto {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}
