//! Credential hashing port.

use async_trait::async_trait;

/// Password hashing service.
///
/// Implementations must salt every hash and verify in constant time.
/// Hashing is CPU bound, so implementations keep it off the async workers.
#[async_trait]
pub trait PasswordService: Send + Sync {
    /// Hash a plain text password.
    async fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// Verify a password against a hash.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Hashing error: {0}")]
    HashingError(String),
}
