//! Account domain service.
//!
//! Implements the [`Accounts`] driving port: registration, credential
//! verification, and profile reads with fresh streak state.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use crate::domain::auth::{LoginCredentials, RegistrationDetails};
use crate::domain::error::Error;
use crate::domain::ports::{
    Accounts, PasswordHasher, PasswordHasherError, SessionRepository, UserRepository,
    UserRepositoryError,
};
use crate::domain::streak::StreakEngine;
use crate::domain::user::{EmailAddress, User, UserId};

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::invalid_request("email is already registered")
        }
    }
}

fn map_hasher_error(error: PasswordHasherError) -> Error {
    match error {
        PasswordHasherError::Hashing { message } => {
            Error::internal(format!("password hashing error: {message}"))
        }
    }
}

/// Account service backed by the user repository and password hasher.
///
/// Profile reads recompute the streak through the same engine the session
/// write path uses, so a stale stored streak is corrected the next time the
/// profile is fetched.
#[derive(Clone)]
pub struct AccountService<U, S> {
    users: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    streaks: StreakEngine<S>,
    clock: Arc<dyn Clock>,
}

impl<U, S> AccountService<U, S> {
    /// Create the service over its driven ports.
    pub fn new(
        users: Arc<U>,
        sessions: Arc<S>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            hasher,
            streaks: StreakEngine::new(sessions),
            clock,
        }
    }
}

#[async_trait]
impl<U, S> Accounts for AccountService<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    async fn register(&self, details: RegistrationDetails) -> Result<User, Error> {
        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(map_hasher_error)?;

        let user = User::register(
            UserId::random(),
            details.name().clone(),
            details.email().clone(),
            password_hash,
            self.clock.utc(),
        );

        self.users.insert(&user).await.map_err(map_user_repo_error)?;

        Ok(user)
    }

    async fn authenticate(&self, credentials: LoginCredentials) -> Result<User, Error> {
        // A syntactically invalid email can never match a stored address;
        // report it the same way as a bad password.
        let Ok(email) = EmailAddress::new(credentials.email()) else {
            return Err(Error::unauthorized("invalid email or password"));
        };

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::unauthorized("invalid email or password"))?;

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(map_hasher_error)?;
        if !matches {
            return Err(Error::unauthorized("invalid email or password"));
        }

        Ok(user)
    }

    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        let mut user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        let today = self.clock.local().date_naive();
        let snapshot = self.streaks.recompute(&user, today).await;

        let stale = user.current_streak() != snapshot.current_streak
            || user.longest_streak() != snapshot.longest_streak
            || user.last_completed_day() != snapshot.last_completed_day;
        user.apply_streak(&snapshot);

        // Persisting the corrected streak is best effort on the read path;
        // the response carries the fresh values either way.
        if stale {
            if let Err(error) = self.users.update_habit_state(&user).await {
                warn!(%error, %user_id, "failed to persist recomputed streak");
            }
        }

        Ok(user)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
