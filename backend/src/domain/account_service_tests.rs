//! Tests for the account service.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockSessionRepository, MockUserRepository};
use crate::domain::user::{PasswordHash, UserDraft, UserName};
use crate::domain::ErrorCode;

/// Clock pinned to a fixed instant with a zero local offset, so wall-clock
/// assertions do not depend on the host timezone.
struct FixtureClock {
    now_utc: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        DateTime::from_naive_utc_and_offset(
            self.now_utc.naive_utc(),
            FixedOffset::east_opt(0).expect("valid offset"),
        )
    }

    fn utc(&self) -> DateTime<Utc> {
        self.now_utc
    }
}

fn fixture_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        now_utc: fixture_instant(),
    })
}

fn stored_user(
    current_streak: u32,
    longest_streak: u32,
    last_completed_day: Option<NaiveDate>,
) -> User {
    User::hydrate(UserDraft {
        id: UserId::random(),
        name: UserName::new("Ada").expect("valid name"),
        email: EmailAddress::new("ada@example.com").expect("valid email"),
        password_hash: PasswordHash::new("$2b$10$stored"),
        current_score: 40,
        current_streak,
        longest_streak,
        last_brushing_at: None,
        last_completed_day,
        created_at: fixture_instant(),
    })
}

fn service(
    users: MockUserRepository,
    sessions: MockSessionRepository,
    hasher: MockPasswordHasher,
) -> AccountService<MockUserRepository, MockSessionRepository> {
    AccountService::new(
        Arc::new(users),
        Arc::new(sessions),
        Arc::new(hasher),
        fixture_clock(),
    )
}

#[tokio::test]
async fn register_hashes_password_and_persists_fresh_user() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .returning(|_| Ok(PasswordHash::new("$2b$10$fresh")));

    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .withf(|user: &User| {
            user.email().as_ref() == "ada@example.com"
                && user.current_score() == 0
                && user.current_streak() == 0
        })
        .times(1)
        .returning(|_| Ok(()));

    let details = RegistrationDetails::try_from_parts("Ada", "ada@example.com", "123456")
        .expect("valid registration");
    let user = service(users, MockSessionRepository::new(), hasher)
        .register(details)
        .await
        .expect("registration succeeds");

    assert_eq!(user.password_hash().expose(), "$2b$10$fresh");
    assert_eq!(user.created_at(), fixture_instant());
    assert!(user.last_completed_day().is_none());
}

#[tokio::test]
async fn register_reports_duplicate_email_as_invalid_request() {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|_| Ok(PasswordHash::new("$2b$10$fresh")));

    let mut users = MockUserRepository::new();
    users
        .expect_insert()
        .returning(|_| Err(UserRepositoryError::duplicate_email("ada@example.com")));

    let details = RegistrationDetails::try_from_parts("Ada", "ada@example.com", "123456")
        .expect("valid registration");
    let err = service(users, MockSessionRepository::new(), hasher)
        .register(details)
        .await
        .expect_err("duplicate email rejected");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn authenticate_returns_user_on_matching_password() {
    let stored = stored_user(0, 0, None);
    let expected = stored.clone();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .times(1)
        .return_once(move |_| Ok(Some(stored)));

    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().times(1).returning(|_, _| Ok(true));

    let credentials =
        LoginCredentials::try_from_parts("ada@example.com", "123456").expect("valid credentials");
    let user = service(users, MockSessionRepository::new(), hasher)
        .authenticate(credentials)
        .await
        .expect("authentication succeeds");

    assert_eq!(user, expected);
}

#[tokio::test]
async fn authenticate_rejects_wrong_password() {
    let stored = stored_user(0, 0, None);

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_email()
        .return_once(move |_| Ok(Some(stored)));

    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().returning(|_, _| Ok(false));

    let credentials =
        LoginCredentials::try_from_parts("ada@example.com", "wrong!").expect("valid credentials");
    let err = service(users, MockSessionRepository::new(), hasher)
        .authenticate(credentials)
        .await
        .expect_err("wrong password rejected");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticate_rejects_unknown_email_without_hashing() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_email().returning(|_| Ok(None));

    // No expectation on the hasher: a verify call would panic the mock.
    let credentials =
        LoginCredentials::try_from_parts("ghost@example.com", "123456").expect("valid credentials");
    let err = service(users, MockSessionRepository::new(), MockPasswordHasher::new())
        .authenticate(credentials)
        .await
        .expect_err("unknown email rejected");

    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn profile_recomputes_stale_streak_and_persists_best_effort() {
    // Stored streak of 3 but no sessions in storage: the read must reset the
    // streak to zero, keep the marker, and try to persist the correction.
    let last = NaiveDate::from_ymd_opt(2026, 3, 7);
    let stored = stored_user(3, 3, last);
    let user_id = stored.id().clone();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    users
        .expect_update_habit_state()
        .withf(|user: &User| user.current_streak() == 0 && user.longest_streak() == 3)
        .times(1)
        .returning(|_| Ok(()));

    let mut sessions = MockSessionRepository::new();
    sessions.expect_exists_on_day().returning(|_, _, _| Ok(false));

    let user = service(users, sessions, MockPasswordHasher::new())
        .profile(&user_id)
        .await
        .expect("profile read succeeds");

    assert_eq!(user.current_streak(), 0);
    assert_eq!(user.longest_streak(), 3);
    assert_eq!(user.last_completed_day(), last);
}

#[tokio::test]
async fn profile_still_succeeds_when_streak_persist_fails() {
    let stored = stored_user(3, 3, NaiveDate::from_ymd_opt(2026, 3, 7));
    let user_id = stored.id().clone();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    users
        .expect_update_habit_state()
        .returning(|_| Err(UserRepositoryError::query("write failed")));

    let mut sessions = MockSessionRepository::new();
    sessions.expect_exists_on_day().returning(|_, _, _| Ok(false));

    let user = service(users, sessions, MockPasswordHasher::new())
        .profile(&user_id)
        .await
        .expect("profile read still succeeds");

    assert_eq!(user.current_streak(), 0);
}

#[tokio::test]
async fn profile_skips_persisting_when_streak_is_unchanged() {
    let stored = stored_user(0, 0, None);
    let user_id = stored.id().clone();

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(stored)));
    // No update_habit_state expectation: a call would panic the mock.

    let mut sessions = MockSessionRepository::new();
    sessions.expect_exists_on_day().returning(|_, _, _| Ok(false));

    let user = service(users, sessions, MockPasswordHasher::new())
        .profile(&user_id)
        .await
        .expect("profile read succeeds");

    assert_eq!(user.current_streak(), 0);
}

#[tokio::test]
async fn profile_reports_missing_user_as_not_found() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let err = service(users, MockSessionRepository::new(), MockPasswordHasher::new())
        .profile(&UserId::random())
        .await
        .expect_err("missing user rejected");

    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn connection_failures_surface_as_service_unavailable() {
    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(|_| Err(UserRepositoryError::connection("no route to host")));

    let err = service(users, MockSessionRepository::new(), MockPasswordHasher::new())
        .profile(&UserId::random())
        .await
        .expect_err("connection failure surfaced");

    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}
