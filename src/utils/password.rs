use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Password policy: 6 to 128 characters.
pub fn validate_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LENGTH..=128).contains(&len) {
        return Err(AppError::ValidationError(format!(
            "Password must be between {MIN_PASSWORD_LENGTH} and 128 characters"
        )));
    }
    if password.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Password cannot be blank".to_string(),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abcdef").is_ok());
        assert!(validate_password("Şifre123").is_ok());
        assert!(validate_password("abcde").is_err()); // too short
        assert!(validate_password("      ").is_err());
        assert!(validate_password(&"a".repeat(129)).is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("abcdef").unwrap();
        assert_ne!(hashed, "abcdef");
        assert!(verify_password("abcdef", &hashed).unwrap());
        assert!(!verify_password("abcdeg", &hashed).unwrap());
    }
}
