//! Run the CPU-bound password hasher off the async executor.

use std::sync::Arc;

use tokio::task;

use crate::domain::Error;
use crate::domain::port_errors::map_hasher_error;
use crate::domain::ports::PasswordHasher;
use crate::domain::{Password, PasswordHash};

pub(crate) async fn hash_password<H>(hasher: &Arc<H>, password: &Password) -> Result<PasswordHash, Error>
where
    H: PasswordHasher + 'static,
{
    let hasher = Arc::clone(hasher);
    let password = password.clone();
    task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
        .map_err(map_hasher_error)
}

pub(crate) async fn verify_password<H>(
    hasher: &Arc<H>,
    password: &Password,
    hash: &PasswordHash,
) -> Result<bool, Error>
where
    H: PasswordHasher + 'static,
{
    let hasher = Arc::clone(hasher);
    let password = password.clone();
    let hash = hash.clone();
    task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|err| Error::internal(format!("password verification task failed: {err}")))?
        .map_err(map_hasher_error)
}
