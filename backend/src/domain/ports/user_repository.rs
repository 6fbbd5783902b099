//! Port for user persistence.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user repository adapters.
    pub enum UserRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user repository query failed: {message}",
        /// The email address is already registered (unique-index conflict).
        DuplicateEmail { email: String } =>
            "email {email} is already registered",
    }
}

/// Port for reading and writing user records.
///
/// The habit-state update is last-write-wins: no locking is held between a
/// read and the following [`UserRepository::update_habit_state`], so two
/// concurrent submissions for the same user may lose one update. Accepted
/// gap, not a guarantee.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a newly registered user.
    async fn insert(&self, user: &User) -> Result<(), UserRepositoryError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserRepositoryError>;

    /// Find a user by normalized email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserRepositoryError>;

    /// Persist the mutable habit state (score, streaks, last-brushing and
    /// last-completed-day markers) of an existing user.
    async fn update_habit_state(&self, user: &User) -> Result<(), UserRepositoryError>;
}
