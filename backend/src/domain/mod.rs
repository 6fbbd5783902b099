//! Domain primitives, aggregates, and services.
//!
//! Purpose: Define strongly typed domain entities for accounts and brushing
//! sessions, the ports they are reached through, and the services that
//! implement the driving ports. Types document their invariants and serde
//! contracts in their own Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode — transport-agnostic error payload.
//! - User, UserId, EmailAddress, UserName, PasswordHash — account identity.
//! - BrushingSession, SessionType, SessionDuration — brushing history.
//! - StreakEngine / StreakSnapshot — streak recomputation.
//! - AccountService, BrushingService — driving-port implementations.

pub mod account_service;
pub mod auth;
pub mod brushing;
pub mod brushing_service;
pub mod error;
pub mod ports;
pub mod scoring;
pub mod streak;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{AuthValidationError, LoginCredentials, RegistrationDetails, PASSWORD_MIN};
pub use self::brushing::{
    BrushingSession, BrushingValidationError, SessionDuration, SessionType, DURATION_CAP_SECS,
};
pub use self::brushing_service::{BrushingService, RECENT_SESSIONS_LIMIT};
pub use self::error::{Error, ErrorCode};
pub use self::scoring::score_for_duration;
pub use self::streak::{StreakEngine, StreakSnapshot};
pub use self::user::{
    EmailAddress, PasswordHash, User, UserDraft, UserId, UserName, UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
