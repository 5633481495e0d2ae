//! Translation of driven-port errors into domain errors.
//!
//! Connection-level failures become `ServiceUnavailable`; anything else a
//! service did not anticipate becomes `InternalError`. Services handle the
//! variants they expect (duplicate e-mail, slug collisions) before falling
//! back to these.

use crate::domain::Error;
use crate::domain::ports::{
    AssetStoreError, PasswordHasherError, PostRepositoryError, SessionStoreError,
    UserPersistenceError,
};

pub(crate) fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => email_taken(),
    }
}

/// Conflict raised when registering an address that is already in use. The
/// address itself is not echoed back.
pub(crate) fn email_taken() -> Error {
    Error::conflict("email already registered")
        .with_details(serde_json::json!({ "field": "email", "code": "email_taken" }))
}

pub(crate) fn map_post_error(error: PostRepositoryError) -> Error {
    match error {
        PostRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("post repository unavailable: {message}"))
        }
        PostRepositoryError::Query { message } => {
            Error::internal(format!("post repository error: {message}"))
        }
        PostRepositoryError::SlugTaken { slug } => {
            Error::conflict(format!("slug already in use: {slug}"))
        }
    }
}

pub(crate) fn map_asset_error(error: AssetStoreError) -> Error {
    match error {
        AssetStoreError::Io { message } => {
            Error::service_unavailable(format!("asset store unavailable: {message}"))
        }
        AssetStoreError::NotFound { handle } => Error::not_found(format!("asset not found: {handle}")),
    }
}

pub(crate) fn map_hasher_error(error: PasswordHasherError) -> Error {
    Error::internal(error.to_string())
}

pub(crate) fn map_session_error(error: SessionStoreError) -> Error {
    match error {
        SessionStoreError::Unavailable { message } => {
            Error::service_unavailable(format!("session store unavailable: {message}"))
        }
    }
}
