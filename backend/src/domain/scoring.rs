//! Score engine: maps a capped session duration to a point delta.
//!
//! The source history carried several mutually inconsistent tables; this
//! implementation canonicalizes on the highest-value one (see DESIGN.md).

use super::brushing::SessionDuration;

/// Step-function tiers: minimum duration in seconds and the points awarded.
/// Ordered highest threshold first.
pub const SCORE_TIERS: [(u32, u64); 3] = [(110, 20), (60, 10), (30, 5)];

/// Points awarded for a session of the given (already clamped) duration.
///
/// Durations below the lowest tier score zero; there is no upper bound on
/// the cumulative score, only on the per-session delta via the duration cap.
///
/// # Examples
/// ```
/// use backend::domain::brushing::SessionDuration;
/// use backend::domain::scoring::score_for_duration;
///
/// let duration = SessionDuration::from_secs(120).expect("non-negative");
/// assert_eq!(score_for_duration(duration), 20);
/// ```
pub fn score_for_duration(duration: SessionDuration) -> u64 {
    let secs = duration.secs();
    SCORE_TIERS
        .iter()
        .find(|(threshold, _)| secs >= *threshold)
        .map_or(0, |(_, points)| *points)
}
