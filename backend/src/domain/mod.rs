//! Domain primitives, aggregates, ports and services.
//!
//! Purpose: define strongly typed entities for accounts, sessions and owned
//! posts, the ports through which the core talks to the outside, and the
//! services that keep users, posts and assets consistent.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - User, PublicUser, Post, PostView: aggregates and their public views.
//! - AccountServiceImpl, SessionAuthenticator, PasswordResetServiceImpl,
//!   PostLifecycleService: implementations of the driving ports.

pub mod asset;
mod asset_lifecycle;
pub mod auth;
pub mod error;
pub mod ports;
pub mod post;
pub mod session;
pub mod slug;
pub mod user;

mod account_service;
mod hashing;
mod password_reset_service;
mod port_errors;
mod post_service;
mod session_service;
#[cfg(test)]
mod test_fixtures;

pub use self::account_service::AccountServiceImpl;
pub use self::asset::{AssetHandle, AssetUpload, AssetValidationError};
pub use self::auth::{
    AuthValidationError, LoginCredentials, Password, PasswordHash, RegistrationRequest,
    ResetPasswordRequest, ResetToken, ResetTokenGrant,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password_reset_service::PasswordResetServiceImpl;
pub use self::post::{
    CreatePostRequest, NewPost, Post, PostBody, PostId, PostSlug, PostTitle,
    PostValidationError, PostView, UpdatePostRequest,
};
pub use self::post_service::PostLifecycleService;
pub use self::session::{
    GateError, InvalidSessionId, Redirect, Session, SessionId, SessionRecord,
};
pub use self::session_service::SessionAuthenticator;
pub use self::user::{DisplayName, EmailAddress, PublicUser, User, UserId, UserValidationError};
