//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountService, LoginService, PasswordResetService, PostCommand, PostQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub accounts: Arc<dyn AccountService>,
    pub password_resets: Arc<dyn PasswordResetService>,
    pub posts: Arc<dyn PostCommand>,
    pub posts_query: Arc<dyn PostQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    ///
    /// `posts` and `posts_query` are commonly the same service viewed through
    /// both ports.
    pub fn new(
        login: Arc<dyn LoginService>,
        accounts: Arc<dyn AccountService>,
        password_resets: Arc<dyn PasswordResetService>,
        posts: Arc<dyn PostCommand>,
        posts_query: Arc<dyn PostQuery>,
    ) -> Self {
        Self {
            login,
            accounts,
            password_resets,
            posts,
            posts_query,
        }
    }
}
