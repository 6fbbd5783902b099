//! Driving port for account use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! register, authenticate, and read profiles without knowing the backing
//! infrastructure, which keeps HTTP handler tests deterministic.

use async_trait::async_trait;

use crate::domain::auth::{LoginCredentials, RegistrationDetails};
use crate::domain::error::Error;
use crate::domain::user::{User, UserId};

/// Domain use-case port for account management.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Accounts: Send + Sync {
    /// Create a new account and return the stored user.
    ///
    /// Fails with an invalid-request error when the email is already
    /// registered.
    async fn register(&self, details: RegistrationDetails) -> Result<User, Error>;

    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Error>;

    /// Fetch a user profile with freshly recomputed streak state.
    ///
    /// Fails with a not-found error when the user no longer exists.
    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;
}
