//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **memory**: process-local user, post and session stores
//! - **assets**: uploads written to a capability-scoped directory
//! - **crypto**: Argon2id password hashing
//! - **notify**: log-backed notification delivery
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod assets;
pub mod crypto;
pub mod memory;
pub mod notify;
