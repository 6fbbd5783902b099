//! Security adapters: password hashing and bearer-token issuance.

mod bcrypt_hasher;
mod jwt;

pub use bcrypt_hasher::BcryptPasswordHasher;
pub use jwt::JwtTokenIssuer;
