//! Streak engine: the single authoritative recomputation path.
//!
//! Earlier revisions of this system kept two divergent views of the streak
//! (an incremental write-time update and a read-time rescan). Here the
//! backward scan is the only strategy, invoked both after a session write
//! and on every profile read, so the stored state can never drift from the
//! session history.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::warn;

use super::brushing::SessionType;
use super::ports::SessionRepository;
use super::user::{User, UserId};

/// Extra days scanned beyond the stored longest streak before the backward
/// walk gives up. Bounds the scan against pathological session histories.
pub const STREAK_SCAN_MARGIN: u32 = 10;

/// Result of a streak recomputation as of a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakSnapshot {
    /// Consecutive fully-completed days ending at `last_completed_day`.
    pub current_streak: u32,
    /// Best streak ever; never less than `current_streak`.
    pub longest_streak: u32,
    /// Most recent complete day, or the previously stored value when the
    /// scan found none.
    pub last_completed_day: Option<NaiveDate>,
}

/// Recomputes streak state from the session history.
#[derive(Clone)]
pub struct StreakEngine<S> {
    sessions: Arc<S>,
}

impl<S> StreakEngine<S> {
    /// Create an engine reading from the given session repository.
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }
}

impl<S> StreakEngine<S>
where
    S: SessionRepository,
{
    /// Whether `day` has both a morning and an evening session.
    ///
    /// The two existence queries run concurrently and are joined. Storage
    /// failures fail closed: the day reports as incomplete, because callers
    /// use this answer to decide streak resets.
    pub async fn day_complete(&self, user_id: &UserId, day: NaiveDate) -> bool {
        let (morning, evening) = tokio::join!(
            self.sessions.exists_on_day(user_id, day, SessionType::Morning),
            self.sessions.exists_on_day(user_id, day, SessionType::Evening),
        );

        let morning = morning.unwrap_or_else(|error| {
            warn!(%error, %user_id, %day, "morning lookup failed; treating day as incomplete");
            false
        });
        let evening = evening.unwrap_or_else(|error| {
            warn!(%error, %user_id, %day, "evening lookup failed; treating day as incomplete");
            false
        });

        morning && evening
    }

    /// Recompute the streak by walking backward day-by-day from `today`.
    ///
    /// Starts at `today` when today is already complete, otherwise at
    /// yesterday, and counts consecutive complete days until the first
    /// incomplete one or until `longest_streak +`
    /// [`STREAK_SCAN_MARGIN`] days have been examined.
    ///
    /// When no complete day is found the streak is zero and
    /// `last_completed_day` retains the value stored on the user, matching
    /// the original failsafe which reset the counter but left the marker in
    /// place.
    pub async fn recompute(&self, user: &User, today: NaiveDate) -> StreakSnapshot {
        let max_scan = user.longest_streak().saturating_add(STREAK_SCAN_MARGIN);

        let today_complete = self.day_complete(user.id(), today).await;
        let start = if today_complete {
            Some(today)
        } else {
            today.pred_opt()
        };

        let mut streak: u32 = 0;
        let mut last_completed = None;
        let mut cursor = start;
        let mut first = true;

        while streak < max_scan {
            let Some(day) = cursor else { break };
            let complete = if first && today_complete {
                true
            } else {
                self.day_complete(user.id(), day).await
            };
            first = false;
            if !complete {
                break;
            }
            if last_completed.is_none() {
                last_completed = Some(day);
            }
            streak += 1;
            cursor = day.pred_opt();
        }

        StreakSnapshot {
            current_streak: streak,
            longest_streak: user.longest_streak().max(streak),
            last_completed_day: last_completed.or_else(|| user.last_completed_day()),
        }
    }
}
