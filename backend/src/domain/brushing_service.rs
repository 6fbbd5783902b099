//! Brushing session domain service.
//!
//! Implements the [`BrushingLog`] driving port: recording sessions with
//! scoring and streak recomputation, and listing recent history.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Timelike;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::brushing::{BrushingSession, SessionDuration, SessionType};
use crate::domain::error::Error;
use crate::domain::ports::{
    BrushingLog, RecentSessions, SessionLogged, SessionRepository, SessionRepositoryError,
    UserRepository, UserRepositoryError,
};
use crate::domain::scoring::score_for_duration;
use crate::domain::streak::StreakEngine;
use crate::domain::user::UserId;

/// Page size for the recent-session listing.
pub const RECENT_SESSIONS_LIMIT: i64 = 25;

fn map_user_repo_error(error: UserRepositoryError) -> Error {
    match error {
        UserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserRepositoryError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserRepositoryError::DuplicateEmail { .. } => {
            Error::internal("unexpected duplicate email on habit-state update")
        }
    }
}

fn map_session_repo_error(error: SessionRepositoryError) -> Error {
    match error {
        SessionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("session repository unavailable: {message}"))
        }
        SessionRepositoryError::Query { message } => {
            Error::internal(format!("session repository error: {message}"))
        }
    }
}

/// Brushing service backed by the user and session repositories.
#[derive(Clone)]
pub struct BrushingService<U, S> {
    users: Arc<U>,
    sessions: Arc<S>,
    streaks: StreakEngine<S>,
    clock: Arc<dyn Clock>,
}

impl<U, S> BrushingService<U, S> {
    /// Create the service over its driven ports.
    pub fn new(users: Arc<U>, sessions: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            streaks: StreakEngine::new(Arc::clone(&sessions)),
            sessions,
            clock,
        }
    }
}

#[async_trait]
impl<U, S> BrushingLog for BrushingService<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    async fn log_session(
        &self,
        user_id: &UserId,
        duration_secs: i64,
    ) -> Result<SessionLogged, Error> {
        let duration = SessionDuration::from_secs(duration_secs)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let mut user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_repo_error)?
            .ok_or_else(|| Error::not_found("user not found"))?;

        // Bucketing and day attribution use the server's local wall clock.
        let now_local = self.clock.local();
        let session_type = SessionType::for_hour(now_local.hour());
        let today = now_local.date_naive();
        let recorded_at = self.clock.utc();

        let session = BrushingSession::new(
            Uuid::new_v4(),
            user_id.clone(),
            session_type,
            recorded_at,
            duration,
        );
        self.sessions
            .insert(&session)
            .await
            .map_err(map_session_repo_error)?;

        let score_added = score_for_duration(duration);
        user.record_session(score_added, recorded_at);

        let snapshot = self.streaks.recompute(&user, today).await;
        user.apply_streak(&snapshot);

        // The session is already durable, so the habit-state write must
        // succeed for the response to reflect stored state.
        self.users
            .update_habit_state(&user)
            .await
            .map_err(map_user_repo_error)?;

        Ok(SessionLogged { score_added, user })
    }

    async fn recent_sessions(&self, user_id: &UserId) -> Result<RecentSessions, Error> {
        let sessions = self
            .sessions
            .recent_for_user(user_id, RECENT_SESSIONS_LIMIT)
            .await
            .map_err(map_session_repo_error)?;

        Ok(RecentSessions { sessions })
    }
}

#[cfg(test)]
#[path = "brushing_service_tests.rs"]
mod tests;
