//! Driving port for password recovery.

use async_trait::async_trait;

use crate::domain::{EmailAddress, Error, ResetPasswordRequest, User};

/// Outcome of a reset request that did not fail.
///
/// Adapters must render both variants identically so the response does not
/// reveal whether an account exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetIssueOutcome {
    /// A token was stored and the notification accepted.
    Sent,
    /// No account uses the address; nothing changed.
    UserNotFound,
}

/// Domain use-case port for issuing and redeeming reset tokens.
#[async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Issue a token for `email` and send the reset link.
    ///
    /// A notifier failure leaves the token in place and returns
    /// [`crate::domain::ErrorCode::ServiceUnavailable`].
    async fn issue(&self, email: &EmailAddress) -> Result<ResetIssueOutcome, Error>;

    /// Resolve the user holding `token`, or fail with
    /// [`crate::domain::ErrorCode::NotFound`].
    async fn validate(&self, token: &str) -> Result<User, Error>;

    /// Set the new password and clear the token in one step.
    ///
    /// A confirmation mismatch fails with
    /// [`crate::domain::ErrorCode::InvalidRequest`] before any state is read;
    /// an unknown or spent token fails with
    /// [`crate::domain::ErrorCode::NotFound`].
    async fn consume(&self, request: &ResetPasswordRequest) -> Result<(), Error>;
}
