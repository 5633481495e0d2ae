//! Port for server-side session records.

use async_trait::async_trait;

use crate::domain::{SessionId, SessionRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// The backing medium is unreachable.
        Unavailable { message: String } => "session store unavailable: {message}",
    }
}

/// Key-value session persistence with passive expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a live record; expired records read as `None`.
    async fn get(&self, id: &SessionId) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Insert or replace the record for `id`.
    async fn put(&self, id: &SessionId, record: &SessionRecord) -> Result<(), SessionStoreError>;

    /// Remove the record for `id`. Removing a missing record succeeds.
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionStoreError>;
}
