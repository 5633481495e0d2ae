//! Port abstraction for the credential store and its errors.
//!
//! Every mutation applies to a single user record atomically. Callers never
//! read-modify-write a user across two calls; compound changes such as
//! consuming a reset token are single operations on this port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    EmailAddress, PasswordHash, PostId, ResetToken, ResetTokenGrant, User, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already uses this e-mail address.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Atomic "swap password and clear token" request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenConsumption {
    /// Token presented by the caller.
    pub token: ResetToken,
    /// Grants issued before this instant are treated as expired.
    pub issued_after: Option<DateTime<Utc>>,
    /// Digest of the new password.
    pub new_hash: PasswordHash,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user, failing with
    /// [`UserPersistenceError::DuplicateEmail`] if the e-mail is taken.
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by exact (case-sensitive) e-mail.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch the user currently holding `token`.
    async fn find_by_reset_token(
        &self,
        token: &ResetToken,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Replace the password digest. Returns `false` when the user is missing.
    async fn update_password(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError>;

    /// Set or clear the pending reset token, overwriting any previous one.
    /// Returns `false` when the user is missing.
    async fn set_reset_token(
        &self,
        id: &UserId,
        grant: Option<ResetTokenGrant>,
    ) -> Result<bool, UserPersistenceError>;

    /// Atomically match the token, store the new digest and clear the token.
    ///
    /// Returns the affected user, or `None` when no user holds a matching,
    /// unexpired token. Of several concurrent calls with the same token at
    /// most one observes `Some`.
    async fn consume_reset_token(
        &self,
        consumption: &ResetTokenConsumption,
    ) -> Result<Option<UserId>, UserPersistenceError>;

    /// Add `post_id` to the owned set if absent. Returns `false` when the
    /// user is missing.
    async fn append_owned_post(
        &self,
        id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, UserPersistenceError>;

    /// Remove `post_id` from the owned set. Returns `false` when the user is
    /// missing or did not list the post.
    async fn remove_owned_post(
        &self,
        id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, UserPersistenceError>;
}
