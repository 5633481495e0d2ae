//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, PublicUser, RegistrationRequest};

/// Domain use-case port for creating accounts.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a new account. A taken e-mail fails with
    /// [`crate::domain::ErrorCode::Conflict`] and changes nothing.
    async fn register(&self, request: &RegistrationRequest) -> Result<PublicUser, Error>;
}
