//! User aggregate and its value objects.
//!
//! The user record carries the derived habit state (score, streaks, last
//! completed day) alongside identity fields. Password material only ever
//! appears here as an opaque hash.

use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use uuid::Uuid;

use super::streak::StreakSnapshot;

/// Validation errors returned by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// The id is not a valid UUID.
    InvalidId,
    /// Name was missing or blank once trimmed.
    EmptyName,
    /// Name exceeds the allowed length.
    NameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },
    /// Email does not look like an address.
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Display name supplied at registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

/// Maximum allowed length for a user name.
pub const USER_NAME_MAX: usize = 64;

impl UserName {
    /// Validate and construct a [`UserName`], trimming surrounding whitespace.
    pub fn new(name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalized email address used as the login identifier.
///
/// ## Invariants
/// - Stored lower-cased and trimmed so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalized = email.as_ref().trim().to_ascii_lowercase();
        if !email_regex().is_match(&normalized) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalized))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Opaque password hash produced by the hashing port.
///
/// Deliberately has no `Display` implementation so it cannot leak into logs
/// or response bodies by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap an already-hashed credential string.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Expose the hash for verification or persistence.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

/// Rehydration payload for [`User::hydrate`], used by persistence adapters.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub id: UserId,
    pub name: UserName,
    pub email: EmailAddress,
    pub password_hash: PasswordHash,
    pub current_score: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_brushing_at: Option<DateTime<Utc>>,
    pub last_completed_day: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// Application user aggregate.
///
/// ## Invariants
/// - `longest_streak >= current_streak` after any update.
/// - `current_score` is monotonically non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    name: UserName,
    email: EmailAddress,
    password_hash: PasswordHash,
    current_score: u64,
    current_streak: u32,
    longest_streak: u32,
    last_brushing_at: Option<DateTime<Utc>>,
    last_completed_day: Option<NaiveDate>,
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a freshly registered user with zeroed habit state.
    pub fn register(
        id: UserId,
        name: UserName,
        email: EmailAddress,
        password_hash: PasswordHash,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            email,
            password_hash,
            current_score: 0,
            current_streak: 0,
            longest_streak: 0,
            last_brushing_at: None,
            last_completed_day: None,
            created_at,
        }
    }

    /// Rehydrate a user from persisted state, restoring the streak
    /// invariant if the stored values drifted.
    pub fn hydrate(draft: UserDraft) -> Self {
        let UserDraft {
            id,
            name,
            email,
            password_hash,
            current_score,
            current_streak,
            longest_streak,
            last_brushing_at,
            last_completed_day,
            created_at,
        } = draft;
        Self {
            id,
            name,
            email,
            password_hash,
            current_score,
            current_streak,
            longest_streak: longest_streak.max(current_streak),
            last_brushing_at,
            last_completed_day,
            created_at,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Login email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Stored credential hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Cumulative point score.
    pub fn current_score(&self) -> u64 {
        self.current_score
    }

    /// Consecutive fully-completed days ending at [`Self::last_completed_day`].
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    /// Best streak ever recorded.
    pub fn longest_streak(&self) -> u32 {
        self.longest_streak
    }

    /// Instant of the most recent brushing session.
    pub fn last_brushing_at(&self) -> Option<DateTime<Utc>> {
        self.last_brushing_at
    }

    /// Most recent calendar day with both a morning and an evening session.
    pub fn last_completed_day(&self) -> Option<NaiveDate> {
        self.last_completed_day
    }

    /// Account creation instant.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Record a scored brushing session.
    pub fn record_session(&mut self, score_delta: u64, recorded_at: DateTime<Utc>) {
        self.current_score = self.current_score.saturating_add(score_delta);
        self.last_brushing_at = Some(recorded_at);
    }

    /// Apply a recomputed streak snapshot, preserving the
    /// `longest >= current` invariant.
    pub fn apply_streak(&mut self, snapshot: &StreakSnapshot) {
        self.current_streak = snapshot.current_streak;
        self.longest_streak = snapshot
            .longest_streak
            .max(self.longest_streak)
            .max(snapshot.current_streak);
        self.last_completed_day = snapshot.last_completed_day;
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn sample_user() -> User {
        User::register(
            UserId::random(),
            UserName::new("Ada").expect("valid name"),
            EmailAddress::new("ada@example.com").expect("valid email"),
            PasswordHash::new("$2b$10$abcdefghijklmnopqrstuv"),
            Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).single().expect("valid instant"),
        )
    }

    #[rstest]
    #[case("ada@example.com", true)]
    #[case("Ada.Lovelace@mail.example.org", true)]
    #[case("not-an-email", false)]
    #[case("@example.com", false)]
    #[case("ada@", false)]
    fn email_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(EmailAddress::new(raw).is_ok(), ok);
    }

    #[test]
    fn email_is_normalized_to_lower_case() {
        let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
        assert_eq!(email.as_ref(), "ada@example.com");
    }

    #[rstest]
    #[case("", false)]
    #[case("   ", false)]
    #[case("Ada", true)]
    fn name_validation(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(UserName::new(raw).is_ok(), ok);
    }

    #[test]
    fn record_session_accumulates_score() {
        let mut user = sample_user();
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).single().expect("valid instant");

        user.record_session(20, at);
        user.record_session(5, at);

        assert_eq!(user.current_score(), 25);
        assert_eq!(user.last_brushing_at(), Some(at));
    }

    #[test]
    fn apply_streak_never_lowers_longest() {
        let mut user = sample_user();
        user.apply_streak(&StreakSnapshot {
            current_streak: 4,
            longest_streak: 4,
            last_completed_day: NaiveDate::from_ymd_opt(2026, 3, 1),
        });
        user.apply_streak(&StreakSnapshot {
            current_streak: 1,
            longest_streak: 1,
            last_completed_day: NaiveDate::from_ymd_opt(2026, 3, 5),
        });

        assert_eq!(user.current_streak(), 1);
        assert_eq!(user.longest_streak(), 4);
    }

    #[test]
    fn hydrate_restores_streak_invariant() {
        let user = User::hydrate(UserDraft {
            id: UserId::random(),
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            password_hash: PasswordHash::new("hash"),
            current_score: 10,
            current_streak: 7,
            longest_streak: 3,
            last_brushing_at: None,
            last_completed_day: None,
            created_at: Utc::now(),
        });

        assert_eq!(user.longest_streak(), 7);
    }

    #[test]
    fn password_hash_debug_is_redacted() {
        let hash = PasswordHash::new("secret-hash");
        assert_eq!(format!("{hash:?}"), "PasswordHash(***)");
    }
}
