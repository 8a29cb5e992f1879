//! Password hashing and strength checks

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a password using bcrypt
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, hash)
}

/// Generic strength policy applied to every new password.
///
/// Length is also enforced at the request-validation layer; it is repeated
/// here so the policy holds no matter which caller reaches it.
pub fn validate_password_strength(password: &str, username: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("password must be at least 8 characters");
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err("password cannot be entirely numeric");
    }
    if !username.is_empty() && password.eq_ignore_ascii_case(username) {
        return Err("password is too similar to the username");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("luis1234").unwrap();
        assert_ne!(hash, "luis1234");
        assert!(verify_password("luis1234", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn strength_policy() {
        assert!(validate_password_strength("luis1234", "luis").is_ok());
        assert!(validate_password_strength("short", "luis").is_err());
        assert!(validate_password_strength("123456789", "luis").is_err());
        assert!(validate_password_strength("Testuser1", "testuser1").is_err());
    }
}
