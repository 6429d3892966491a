//! Argon2 password hashing with a fresh random salt per call.
//!
//! Two hashes of the same password never match as strings; comparison
//! timing is handled by the primitive, not by hand.

use crate::AuthError;
use argon2::Argon2;
use argon2::PasswordHash;
use argon2::PasswordHasher;
use argon2::PasswordVerifier;
use argon2::password_hash::SaltString;
use rand::Rng;

/// Hashes a password into a PHC string for storage. Failures here are
/// internal faults, surfaced as [`AuthError::Store`] like any other
/// persistence-path breakage.
pub fn hash(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; 16];
    rand::rng().fill(&mut salt);
    let salt = SaltString::encode_b64(&salt)
        .map_err(|e| AuthError::Store(format!("salt encoding failed: {}", e)))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AuthError::Store(format!("password hashing failed: {}", e)))
}

/// A malformed stored hash verifies false rather than erroring; a login
/// against a corrupt row must look like any other credential failure.
pub fn verify(password: &str, hashword: &str) -> bool {
    match PasswordHash::new(hashword) {
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
    fn salted_hashes_never_collide_as_strings() {
        let a = hash("pw123456").unwrap();
        let b = hash("pw123456").unwrap();
        assert!(a != b);
    }

    #[test]
    fn verification_round_trips() {
        let hashword = hash("pw123456").unwrap();
        assert!(verify("pw123456", &hashword));
        assert!(!verify("pw1234567", &hashword));
    }

    #[test]
    fn garbage_hashes_verify_false() {
        assert!(!verify("pw123456", "not-a-phc-string"));
        assert!(!verify("pw123456", ""));
    }
}
