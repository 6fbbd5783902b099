//! Port for brushing session persistence and day-completion reads.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::brushing::{BrushingSession, SessionType};
use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session repository adapters.
    pub enum SessionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "session repository query failed: {message}",
    }
}

/// Port for writing sessions and answering day-completion queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Append a brushing session.
    async fn insert(&self, session: &BrushingSession) -> Result<(), SessionRepositoryError>;

    /// Most recent sessions for a user, newest first, capped at `limit`.
    async fn recent_for_user(
        &self,
        user_id: &UserId,
        limit: i64,
    ) -> Result<Vec<BrushingSession>, SessionRepositoryError>;

    /// Whether at least one session of the given type exists for the user
    /// on the given local calendar day.
    async fn exists_on_day(
        &self,
        user_id: &UserId,
        day: NaiveDate,
        session_type: SessionType,
    ) -> Result<bool, SessionRepositoryError>;
}
