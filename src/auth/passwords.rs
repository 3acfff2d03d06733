//! Password hashing and verification (bcrypt).

use bcrypt::{hash, verify, DEFAULT_COST};

/// Hash a plaintext password with bcrypt.
pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    hash(password, DEFAULT_COST)
}

/// Check a plaintext password against a stored bcrypt hash.
///
/// bcrypt performs a constant-time comparison internally.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(password, password_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        // Minimum cost keeps the test fast
        let hashed = hash("password123", 4).unwrap();
        assert!(verify_password("password123", &hashed).unwrap());
        assert!(!verify_password("wrongpassword", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash("password123", 4).unwrap();
        let b = hash("password123", 4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("password123", "not-a-bcrypt-hash").is_err());
    }
}
