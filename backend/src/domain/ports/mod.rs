//! Domain ports.
//!
//! Driven ports (repositories, hashing, token issuance) are implemented by
//! outbound adapters; driving ports ([`Accounts`], [`BrushingLog`]) are
//! implemented by domain services and consumed by inbound adapters.

mod accounts;
mod brushing_log;
mod macros;
mod password_hasher;
mod session_repository;
mod token_issuer;
mod user_repository;

pub(crate) use macros::define_port_error;

pub use accounts::Accounts;
pub use brushing_log::{BrushingLog, RecentSessions, SessionLogged};
pub use password_hasher::{PasswordHasher, PasswordHasherError};
pub use session_repository::{SessionRepository, SessionRepositoryError};
pub use token_issuer::{FixtureTokenIssuer, TokenError, TokenIssuer};
pub use user_repository::{UserRepository, UserRepositoryError};

#[cfg(test)]
pub use accounts::MockAccounts;
#[cfg(test)]
pub use brushing_log::MockBrushingLog;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
#[cfg(test)]
pub use user_repository::MockUserRepository;
