//! Driving port for brushing-session use-cases.

use async_trait::async_trait;

use crate::domain::brushing::BrushingSession;
use crate::domain::error::Error;
use crate::domain::user::{User, UserId};

/// Outcome of logging a session: the awarded points and the user snapshot
/// after score and streak updates.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionLogged {
    /// Points awarded for this session.
    pub score_added: u64,
    /// User record after the update.
    pub user: User,
}

/// Most recent sessions for a user, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentSessions {
    /// Sessions, capped at the configured page size.
    pub sessions: Vec<BrushingSession>,
}

/// Domain use-case port for recording and listing brushing sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrushingLog: Send + Sync {
    /// Record a session for the user.
    ///
    /// The server derives the time-of-day bucket from its own clock; the
    /// caller only supplies the raw duration in seconds, which is validated
    /// (non-negative) and clamped before scoring.
    async fn log_session(&self, user_id: &UserId, duration_secs: i64)
        -> Result<SessionLogged, Error>;

    /// List the most recent sessions for the user, newest first.
    async fn recent_sessions(&self, user_id: &UserId) -> Result<RecentSessions, Error>;
}
