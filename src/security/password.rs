//! Password hashing and verification.
//!
//! One-way bcrypt hashes; a stored hash is only ever compared, never reversed.

pub use bcrypt::DEFAULT_COST;

/// Hash a password with the given bcrypt cost (4..=31).
pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Verify a password against a stored bcrypt hash.
///
/// A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("taco", 4).unwrap();

        assert_ne!(hash, "taco");
        assert!(hash.starts_with("$2"));
        assert!(verify_password("taco", &hash));
        assert!(!verify_password("burrito", &hash));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let a = hash_password("taco", 4).unwrap();
        let b = hash_password("taco", 4).unwrap();
        assert_ne!(a, b, "salt should differ");
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        assert!(!verify_password("taco", "plaintext"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_cost_out_of_range() {
        assert!(hash_password("taco", 2).is_err());
    }
}
