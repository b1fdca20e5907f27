//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- HS256 access tokens carrying a revocable `jti`.

pub mod jwt;
pub mod password;
