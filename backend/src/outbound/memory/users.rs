//! In-memory credential store.
//!
//! Every port method takes the lock once, so each mutation is a single
//! critical section over one user record.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{ResetTokenConsumption, UserPersistenceError, UserRepository};
use crate::domain::{
    EmailAddress, PasswordHash, PostId, ResetToken, ResetTokenGrant, User, UserId,
};

#[derive(Default)]
struct UserTable {
    by_id: HashMap<UserId, User>,
    by_email: HashMap<EmailAddress, UserId>,
}

impl UserTable {
    fn holder_of(&mut self, token: &ResetToken) -> Option<&mut User> {
        self.by_id.values_mut().find(|user| {
            user.reset_token()
                .is_some_and(|grant| grant.token() == token)
        })
    }
}

/// [`UserRepository`] backed by a process-local map.
#[derive(Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UserTable>, UserPersistenceError> {
        self.table
            .read()
            .map_err(|_| UserPersistenceError::query("user table lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UserTable>, UserPersistenceError> {
        self.table
            .write()
            .map_err(|_| UserPersistenceError::query("user table lock poisoned"))
    }

    fn modify<T>(
        &self,
        id: &UserId,
        change: impl FnOnce(&mut User) -> T,
    ) -> Result<Option<T>, UserPersistenceError> {
        let mut table = self.write()?;
        Ok(table.by_id.get_mut(id).map(change))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut table = self.write()?;
        if table.by_email.contains_key(user.email()) {
            return Err(UserPersistenceError::duplicate_email(
                user.email().as_ref(),
            ));
        }
        table
            .by_email
            .insert(user.email().clone(), user.id().clone());
        table.by_id.insert(user.id().clone(), user.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let table = self.read()?;
        Ok(table
            .by_email
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read()?.by_id.get(id).cloned())
    }

    async fn find_by_reset_token(
        &self,
        token: &ResetToken,
    ) -> Result<Option<User>, UserPersistenceError> {
        let table = self.read()?;
        Ok(table
            .by_id
            .values()
            .find(|user| {
                user.reset_token()
                    .is_some_and(|grant| grant.token() == token)
            })
            .cloned())
    }

    async fn update_password(
        &self,
        id: &UserId,
        hash: &PasswordHash,
    ) -> Result<bool, UserPersistenceError> {
        let updated = self.modify(id, |user| user.set_password_hash(hash.clone()))?;
        Ok(updated.is_some())
    }

    async fn set_reset_token(
        &self,
        id: &UserId,
        grant: Option<ResetTokenGrant>,
    ) -> Result<bool, UserPersistenceError> {
        let updated = self.modify(id, |user| user.set_reset_token(grant))?;
        Ok(updated.is_some())
    }

    async fn consume_reset_token(
        &self,
        consumption: &ResetTokenConsumption,
    ) -> Result<Option<UserId>, UserPersistenceError> {
        let mut table = self.write()?;
        let Some(user) = table.holder_of(&consumption.token) else {
            return Ok(None);
        };
        let fresh = match (user.reset_token(), consumption.issued_after) {
            (Some(grant), Some(cutoff)) => grant.issued_at() > cutoff,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !fresh {
            return Ok(None);
        }
        user.set_password_hash(consumption.new_hash.clone());
        user.set_reset_token(None);
        Ok(Some(user.id().clone()))
    }

    async fn append_owned_post(
        &self,
        id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, UserPersistenceError> {
        let updated = self.modify(id, |user| {
            user.add_owned_post(post_id.clone());
        })?;
        Ok(updated.is_some())
    }

    async fn remove_owned_post(
        &self,
        id: &UserId,
        post_id: &PostId,
    ) -> Result<bool, UserPersistenceError> {
        let removed = self.modify(id, |user| user.remove_owned_post(post_id))?;
        Ok(removed.unwrap_or(false))
    }
}
