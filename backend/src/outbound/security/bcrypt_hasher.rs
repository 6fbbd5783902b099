//! bcrypt-backed [`PasswordHasher`] adapter.

use async_trait::async_trait;
use tokio::task;

use crate::domain::ports::{PasswordHasher, PasswordHasherError};
use crate::domain::user::PasswordHash;

/// Password hasher running bcrypt on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Hasher with the default work factor.
    pub fn new() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Hasher with an explicit work factor; lower values are only
    /// appropriate for tests.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

fn map_join_error(error: task::JoinError) -> PasswordHasherError {
    PasswordHasherError::hashing(format!("hashing task failed: {error}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let password = password.to_owned();
        let cost = self.cost;
        let hash = task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(map_join_error)?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(hash))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        let password = password.to_owned();
        let hash = hash.expose().to_owned();
        task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(map_join_error)?
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))
    }
}
