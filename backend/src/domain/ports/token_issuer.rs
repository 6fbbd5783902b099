//! Port for bearer-token issuance and verification.

use crate::domain::user::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by token adapters.
    pub enum TokenError {
        /// Signing the token failed.
        Issuance { message: String } =>
            "token issuance failed: {message}",
        /// The presented token is malformed, expired, or has a bad signature.
        Invalid { message: String } =>
            "bearer token rejected: {message}",
    }
}

/// Port for issuing and verifying bearer tokens whose subject is a user id.
///
/// Synchronous: signing and verification are pure CPU work.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Issue a signed token for the given user.
    fn issue(&self, user_id: &UserId) -> Result<String, TokenError>;

    /// Verify a token and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}

/// Fixture issuer for handler tests: accepts exactly one token string and
/// maps it to a fixed user id.
#[derive(Debug, Clone)]
pub struct FixtureTokenIssuer {
    token: String,
    user_id: UserId,
}

impl FixtureTokenIssuer {
    /// Build a fixture accepting `token` for `user_id`.
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: token.into(),
            user_id,
        }
    }
}

impl TokenIssuer for FixtureTokenIssuer {
    fn issue(&self, _user_id: &UserId) -> Result<String, TokenError> {
        Ok(self.token.clone())
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        if token == self.token {
            Ok(self.user_id.clone())
        } else {
            Err(TokenError::invalid("unknown fixture token"))
        }
    }
}
