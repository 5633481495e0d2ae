//! Port for one-way password hashing.
//!
//! Hashing is CPU-bound, so the trait is synchronous; services run it on the
//! blocking pool.

use crate::domain::{Password, PasswordHash};

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHasherError {
        /// The primitive rejected its parameters or input.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored digest could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Salted, adaptive password hashing.
///
/// `verify(p, &hash(p)?)` is always `true`, and `hash` is salted so two calls
/// with the same input produce different digests.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Produce a digest for `password`.
    fn hash(&self, password: &Password) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against a stored digest.
    fn verify(&self, password: &Password, hash: &PasswordHash)
    -> Result<bool, PasswordHasherError>;
}
