//! Session authenticator: login, logout and the session gates.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::hashing::{hash_password, verify_password};
use crate::domain::port_errors::{map_session_error, map_user_error};
use crate::domain::ports::{LoginService, PasswordHasher, SessionStore, UserRepository};
use crate::domain::{
    Error, GateError, LoginCredentials, Password, PasswordHash, Redirect, Session, SessionId,
    SessionRecord, User, UserId,
};

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

/// Plaintext hashed once per authenticator to build the decoy digest.
const DECOY_PASSWORD: &str = "postnest-unknown-account";

/// Session service implementing [`LoginService`].
///
/// Sessions hold only the user id. Every gate re-reads the user, so a gate
/// never acts on a stale snapshot and a deleted user reads as anonymous.
///
/// Logins for unknown e-mails verify against a decoy digest produced by the
/// same hasher, so both rejection paths pay one verification.
#[derive(Clone)]
pub struct SessionAuthenticator<U, H, S> {
    users: Arc<U>,
    hasher: Arc<H>,
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    decoy: Arc<OnceCell<PasswordHash>>,
}

impl<U, H, S> SessionAuthenticator<U, H, S> {
    /// Create a new authenticator with the default seven-day lifetime.
    pub fn new(users: Arc<U>, hasher: Arc<H>, sessions: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            sessions,
            clock,
            ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            decoy: Arc::new(OnceCell::new()),
        }
    }

    /// Override the session lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

impl<U, H, S> SessionAuthenticator<U, H, S>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    S: SessionStore,
{
    async fn decoy_hash(&self) -> Result<&PasswordHash, Error> {
        self.decoy
            .get_or_try_init(|| async move {
                let password = Password::new(DECOY_PASSWORD)
                    .map_err(|err| Error::internal(format!("decoy password: {err}")))?;
                hash_password(&self.hasher, &password).await
            })
            .await
    }

    async fn current_user(&self, session: Option<&SessionId>) -> Result<Option<User>, Error> {
        let Some(session) = session else {
            return Ok(None);
        };
        let Some(record) = self.sessions.get(session).await.map_err(map_session_error)? else {
            return Ok(None);
        };
        let user = self
            .users
            .find_by_id(record.user_id())
            .await
            .map_err(map_user_error)?;
        if user.is_none() {
            debug!(user_id = %record.user_id(), "session refers to a missing user");
        }
        Ok(user)
    }
}

#[async_trait]
impl<U, H, S> LoginService for SessionAuthenticator<U, H, S>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
    S: SessionStore,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<Session, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            let decoy = self.decoy_hash().await?;
            verify_password(&self.hasher, credentials.password(), decoy).await?;
            debug!("login rejected: unknown email");
            return Err(invalid_credentials());
        };

        if !verify_password(&self.hasher, credentials.password(), user.password_hash()).await? {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            return Err(invalid_credentials());
        }

        let now = self.clock.utc();
        let record = SessionRecord::new(user.id().clone(), now, now + self.ttl);
        let id = SessionId::generate();
        self.sessions
            .put(&id, &record)
            .await
            .map_err(map_session_error)?;

        info!(user_id = %user.id(), "user logged in");
        Ok(Session::new(id, &record))
    }

    async fn logout(&self, session: &SessionId) -> Result<(), Error> {
        self.sessions
            .destroy(session)
            .await
            .map_err(map_session_error)
    }

    async fn require_authenticated(&self, session: Option<&SessionId>) -> Result<User, GateError> {
        self.current_user(session)
            .await?
            .ok_or(GateError::Redirect(Redirect::Login))
    }

    async fn require_guest(&self, session: Option<&SessionId>) -> Result<(), GateError> {
        match self.current_user(session).await? {
            Some(_) => Err(GateError::Redirect(Redirect::Profile)),
            None => Ok(()),
        }
    }

    async fn is_owner(&self, session: Option<&SessionId>, owner: &UserId) -> Result<bool, Error> {
        Ok(self
            .current_user(session)
            .await?
            .is_some_and(|user| user.id() == owner))
    }
}

#[cfg(test)]
#[path = "session_service_tests.rs"]
mod tests;
