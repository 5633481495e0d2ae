//! Account registration service.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::hashing::hash_password;
use crate::domain::port_errors::{email_taken, map_user_error};
use crate::domain::ports::{AccountService, PasswordHasher, UserRepository};
use crate::domain::{Error, PublicUser, RegistrationRequest, User, UserId};

/// Registration service implementing [`AccountService`].
#[derive(Clone)]
pub struct AccountServiceImpl<U, H> {
    users: Arc<U>,
    hasher: Arc<H>,
    clock: Arc<dyn Clock>,
}

impl<U, H> AccountServiceImpl<U, H> {
    /// Create a new service with the given collaborators.
    pub fn new(users: Arc<U>, hasher: Arc<H>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            clock,
        }
    }
}

#[async_trait]
impl<U, H> AccountService for AccountServiceImpl<U, H>
where
    U: UserRepository,
    H: PasswordHasher + 'static,
{
    async fn register(&self, request: &RegistrationRequest) -> Result<PublicUser, Error> {
        let existing = self
            .users
            .find_by_email(request.email())
            .await
            .map_err(map_user_error)?;
        if existing.is_some() {
            return Err(email_taken());
        }

        let hash = hash_password(&self.hasher, request.password()).await?;
        let user = User::new(
            UserId::random(),
            request.email().clone(),
            request.name().clone(),
            hash,
            self.clock.utc(),
        );
        // The repository re-checks uniqueness, which covers two concurrent
        // registrations for the same address.
        self.users.create(&user).await.map_err(map_user_error)?;

        info!(user_id = %user.id(), "account registered");
        Ok(user.to_public())
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
