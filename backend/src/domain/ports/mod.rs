//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Service`, `PostCommand`, `PostQuery`) are what inbound
//! adapters call. Driven ports (repositories, stores, hasher, notifier) are
//! what domain services call and outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod asset_store;
mod login_service;
mod notifier;
mod password_hasher;
mod password_reset_service;
mod post_command;
mod post_query;
mod post_repository;
mod session_store;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use asset_store::MockAssetStore;
pub use asset_store::{AssetStore, AssetStoreError};
pub use login_service::LoginService;
#[cfg(test)]
pub use notifier::MockNotifier;
pub use notifier::{Notifier, NotifierError, OutboundMessage};
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
pub use password_reset_service::{PasswordResetService, ResetIssueOutcome};
pub use post_command::PostCommand;
pub use post_query::PostQuery;
#[cfg(test)]
pub use post_repository::MockPostRepository;
pub use post_repository::{PostRepository, PostRepositoryError, RevisionOutcome};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{ResetTokenConsumption, UserPersistenceError, UserRepository};
