//! Authentication primitives.
//!
//! - [`identity`] -- the [`IdentityProvider`](identity::IdentityProvider) interface.
//! - [`local`] -- in-process provider backed by argon2 hashes and signed ID tokens.
//! - [`jwt`] -- ID token generation and validation.
//! - [`password`] -- Argon2id password hashing and verification.

pub mod identity;
pub mod jwt;
pub mod local;
pub mod password;
