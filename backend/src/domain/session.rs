//! Server-side session records and gate outcomes.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;

use super::Error;
use super::user::UserId;

const SESSION_ID_BYTES: usize = 32;

/// Error returned when a session key fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session id is malformed")]
pub struct InvalidSessionId;

/// Opaque session key carried by the client cookie.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Validate a key read back from a client.
    pub fn parse(raw: &str) -> Result<Self, InvalidSessionId> {
        let well_formed = !raw.is_empty()
            && raw
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
        if !well_formed {
            return Err(InvalidSessionId);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Encoded key.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionId(<redacted>)")
    }
}

/// What the session store keeps for each key: only the user reference, so
/// every gated request re-reads the current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    user_id: UserId,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Bind `user_id` for the window `[created_at, expires_at)`.
    pub fn new(user_id: UserId, created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            created_at,
            expires_at,
        }
    }

    /// Authenticated user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Login instant.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Passive expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the record has lapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Pair a key with the record it indexes.
    pub fn new(id: SessionId, record: &SessionRecord) -> Self {
        Self {
            id,
            user_id: record.user_id.clone(),
            expires_at: record.expires_at,
        }
    }

    /// Key to hand back to the client.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Authenticated user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Expiry instant.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

/// Where a failed gate sends the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// Anonymous caller hit a protected operation.
    Login,
    /// Authenticated caller hit a guest-only entry point.
    Profile,
}

impl Redirect {
    /// Path the caller should be sent to.
    pub fn location(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Profile => "/profile",
        }
    }
}

/// Failure of a session gate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GateError {
    /// The gate rejected the caller.
    #[error("redirect to {}", .0.location())]
    Redirect(Redirect),
    /// The gate could not be evaluated.
    #[error(transparent)]
    Dependency(#[from] Error),
}
