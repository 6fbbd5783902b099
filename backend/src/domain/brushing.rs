//! Brushing session entity and its value objects.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Maximum session duration credited toward scoring, in seconds.
pub const DURATION_CAP_SECS: u32 = 130;

/// Time-of-day bucket a session falls into.
///
/// Derived from the server-local wall-clock hour at submission time, never
/// client-supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// 05:00–09:59 local time.
    Morning,
    /// 10:00–15:59 local time.
    Noon,
    /// 16:00–04:59 local time.
    Evening,
}

impl SessionType {
    /// Bucket a local wall-clock hour (0–23) into a session type.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=9 => Self::Morning,
            10..=15 => Self::Noon,
            _ => Self::Evening,
        }
    }
}

/// Error returned when parsing a session type from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSessionTypeError;

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Morning => f.write_str("morning"),
            Self::Noon => f.write_str("noon"),
            Self::Evening => f.write_str("evening"),
        }
    }
}

impl fmt::Display for ParseSessionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid session type")
    }
}

impl std::error::Error for ParseSessionTypeError {}

impl FromStr for SessionType {
    type Err = ParseSessionTypeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "morning" => Ok(Self::Morning),
            "noon" => Ok(Self::Noon),
            "evening" => Ok(Self::Evening),
            _ => Err(ParseSessionTypeError),
        }
    }
}

/// Validation errors for brushing session inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushingValidationError {
    /// Duration was negative.
    NegativeDuration {
        /// The rejected raw value.
        value: i64,
    },
}

impl fmt::Display for BrushingValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeDuration { value } => {
                write!(f, "duration must be non-negative, got {value}")
            }
        }
    }
}

impl std::error::Error for BrushingValidationError {}

/// Session duration in seconds, clamped to [`DURATION_CAP_SECS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SessionDuration(u32);

impl SessionDuration {
    /// Validate a raw duration, rejecting negatives and clamping values
    /// above the cap.
    pub fn from_secs(raw: i64) -> Result<Self, BrushingValidationError> {
        if raw < 0 {
            return Err(BrushingValidationError::NegativeDuration { value: raw });
        }
        let capped = u32::try_from(raw)
            .unwrap_or(DURATION_CAP_SECS)
            .min(DURATION_CAP_SECS);
        Ok(Self(capped))
    }

    /// Clamped duration in seconds.
    pub fn secs(self) -> u32 {
        self.0
    }
}

/// A single recorded brushing event.
///
/// Sessions are append-only: created once per submission, immutable
/// thereafter, never deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushingSession {
    id: Uuid,
    user_id: UserId,
    session_type: SessionType,
    recorded_at: DateTime<Utc>,
    duration: SessionDuration,
}

impl BrushingSession {
    /// Create a new session owned by `user_id`.
    pub fn new(
        id: Uuid,
        user_id: UserId,
        session_type: SessionType,
        recorded_at: DateTime<Utc>,
        duration: SessionDuration,
    ) -> Self {
        Self {
            id,
            user_id,
            session_type,
            recorded_at,
            duration,
        }
    }

    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Owning user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Time-of-day bucket.
    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    /// Creation instant.
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Clamped duration.
    pub fn duration(&self) -> SessionDuration {
        self.duration
    }
}
