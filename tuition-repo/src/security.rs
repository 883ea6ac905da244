//! Password hashing.
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).

use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use tuition_types::RepoError;

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, RepoError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RepoError::Database(format!("Failed to hash password: {e}")))
}

/// Checks a password against a stored PHC string. Malformed input never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hashing() {
        let stored = hash_password("s3cret").unwrap();

        assert!(stored.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &stored));
        assert!(!verify_password("wrong", &stored));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        assert_ne!(hash_password("abc").unwrap(), hash_password("abc").unwrap());
    }

    #[test]
    fn test_malformed_digest_never_verifies() {
        assert!(!verify_password("abc", "no-separator"));
        assert!(!verify_password("abc", "0011$deadbeef"));
    }
}
