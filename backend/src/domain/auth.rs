//! Authentication primitives: registration details and login credentials.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{EmailAddress, UserName, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 6;

/// Domain error returned when auth payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Name or email failed user-level validation.
    User(UserValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::User(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AuthValidationError {}

impl From<UserValidationError> for AuthValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is trimmed and lower-cased so it matches stored addresses.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalized = email.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(AuthValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email string suitable for user lookups.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration payload.
#[derive(Debug, Clone)]
pub struct RegistrationDetails {
    name: UserName,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl RegistrationDetails {
    /// Construct registration details from raw inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        let name = UserName::new(name)?;
        let email = EmailAddress::new(email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if password.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }

        Ok(Self {
            name,
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Validated display name.
    pub fn name(&self) -> &UserName {
        &self.name
    }

    /// Validated, normalized email address.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn login_credentials_normalize_email() {
        let creds = LoginCredentials::try_from_parts("  Ada@Example.com ", "secret")
            .expect("valid credentials");
        assert_eq!(creds.email(), "ada@example.com");
        assert_eq!(creds.password(), "secret");
    }

    #[rstest]
    #[case("", "secret", AuthValidationError::EmptyEmail)]
    #[case("ada@example.com", "", AuthValidationError::EmptyPassword)]
    fn login_credentials_reject_blank_fields(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password).expect_err("invalid");
        assert_eq!(err, expected);
    }

    #[test]
    fn registration_rejects_short_passwords() {
        let err = RegistrationDetails::try_from_parts("Ada", "ada@example.com", "12345")
            .expect_err("too short");
        assert!(matches!(
            err,
            AuthValidationError::PasswordTooShort { min: PASSWORD_MIN }
        ));
    }

    #[test]
    fn registration_rejects_invalid_email() {
        let err = RegistrationDetails::try_from_parts("Ada", "not-an-email", "123456")
            .expect_err("invalid email");
        assert!(matches!(err, AuthValidationError::User(_)));
    }

    #[test]
    fn registration_accepts_valid_payload() {
        let details = RegistrationDetails::try_from_parts("Ada", "ada@example.com", "123456")
            .expect("valid payload");
        assert_eq!(details.name().as_ref(), "Ada");
        assert_eq!(details.email().as_ref(), "ada@example.com");
    }
}
