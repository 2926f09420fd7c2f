//! Password hashing with Argon2

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use servorder_shared::constants::{MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Hash error: {0}")]
    HashError(String),
    #[error("Password is too short")]
    TooShort,
    #[error("Password is too long")]
    TooLong,
    #[error("Password too weak (score {score}, minimum {required})")]
    TooWeak { score: u8, required: u8 },
}

pub struct PasswordService;

impl PasswordService {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| PasswordError::HashError(e.to_string()))
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Enforces length bounds and a minimum zxcvbn score. `user_inputs` (name,
    /// email) are penalized when they appear in the password.
    pub fn check_strength(password: &str, min_score: u8, user_inputs: &[&str]) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < MIN_PASSWORD_LENGTH {
            return Err(PasswordError::TooShort);
        }
        if length > MAX_PASSWORD_LENGTH {
            return Err(PasswordError::TooLong);
        }

        let score = u8::from(zxcvbn::zxcvbn(password, user_inputs).score());
        if score < min_score {
            return Err(PasswordError::TooWeak { score, required: min_score });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(PasswordService::verify("correct horse battery staple", &hash).unwrap());
        assert!(!PasswordService::verify("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            PasswordService::verify("anything", "not-a-phc-string"),
            Err(PasswordError::HashError(_))
        ));
    }

    #[test]
    fn test_length_bounds() {
        assert_eq!(PasswordService::check_strength("short", 0, &[]), Err(PasswordError::TooShort));
        let long = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert_eq!(PasswordService::check_strength(&long, 0, &[]), Err(PasswordError::TooLong));
    }

    #[test]
    fn test_weak_password_rejected() {
        assert!(matches!(
            PasswordService::check_strength("password", 2, &[]),
            Err(PasswordError::TooWeak { .. })
        ));
        assert!(PasswordService::check_strength("vX9#tq!Lm2@wRz", 3, &[]).is_ok());
    }
}
