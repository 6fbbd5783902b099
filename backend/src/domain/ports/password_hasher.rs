//! Port for credential hashing.

use async_trait::async_trait;

use crate::domain::user::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password-hashing adapters.
    pub enum PasswordHasherError {
        /// Hashing or verification failed.
        Hashing { message: String } =>
            "password hashing failed: {message}",
    }
}

/// Port for hashing and verifying passwords.
///
/// Async because real implementations push the CPU-bound work onto a
/// blocking thread pool.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Verify a plaintext password against a stored hash.
    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError>;
}
