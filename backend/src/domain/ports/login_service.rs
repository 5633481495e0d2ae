//! Driving port for login, logout and session gates.
//!
//! Inbound adapters call it to authenticate credentials and to check the
//! caller's session before an operation runs, without knowing how sessions
//! or users are stored.

use async_trait::async_trait;

use crate::domain::{Error, GateError, LoginCredentials, Session, SessionId, User, UserId};

/// Domain use-case port for sessions.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Verify credentials and open a session.
    ///
    /// Unknown e-mail and wrong password fail identically with
    /// [`crate::domain::ErrorCode::Unauthorized`].
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error>;

    /// Destroy the session. Idempotent.
    async fn logout(&self, session: &SessionId) -> Result<(), Error>;

    /// Resolve the current user or redirect to the login page.
    async fn require_authenticated(&self, session: Option<&SessionId>) -> Result<User, GateError>;

    /// Succeed for anonymous callers or redirect to the profile page.
    async fn require_guest(&self, session: Option<&SessionId>) -> Result<(), GateError>;

    /// Whether the session's user is `owner`.
    async fn is_owner(&self, session: Option<&SessionId>, owner: &UserId) -> Result<bool, Error>;
}
