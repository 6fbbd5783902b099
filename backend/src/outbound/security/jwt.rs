//! JWT-backed [`TokenIssuer`] adapter.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenIssuer};
use crate::domain::user::UserId;

/// Registered claims carried by issued tokens; the subject is the user id.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HS256 bearer-token issuer.
///
/// Issuance timestamps come from the injected clock; expiry validation uses
/// the verifier's wall clock via `jsonwebtoken`.
pub struct JwtTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
}

impl JwtTokenIssuer {
    /// Build an issuer over a shared secret with the given token lifetime.
    pub fn new(secret: &[u8], ttl_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
            clock,
        }
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(&self, user_id: &UserId) -> Result<String, TokenError> {
        let iat = self.clock.utc().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat,
            exp: iat.saturating_add(self.ttl_secs),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| TokenError::issuance(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|err| TokenError::invalid(err.to_string()))?;
        UserId::new(&data.claims.sub)
            .map_err(|err| TokenError::invalid(format!("token subject invalid: {err}")))
    }
}
