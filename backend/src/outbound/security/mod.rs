//! Credential adapters: password hashing and bearer token signing.

mod bcrypt_hasher;
mod jwt_issuer;

pub use bcrypt_hasher::{BCRYPT_INPUT_LIMIT, BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
pub use jwt_issuer::JwtTokenIssuer;
