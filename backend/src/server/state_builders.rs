//! Builders wiring the production adapters into the HTTP state.

use std::io;
use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use postnest::domain::{
    AccountServiceImpl, PasswordResetServiceImpl, PostLifecycleService, SessionAuthenticator,
};
use postnest::inbound::http::state::HttpState;
use postnest::outbound::assets::FsAssetStore;
use postnest::outbound::crypto::Argon2PasswordHasher;
use postnest::outbound::memory::{
    InMemoryPostRepository, InMemorySessionStore, InMemoryUserRepository,
};
use postnest::outbound::notify::TracingNotifier;

use super::ServiceSettings;

/// Build the HTTP state from in-memory stores, the upload directory and an
/// Argon2 hasher.
///
/// # Errors
/// Returns [`io::Error`] when the upload directory cannot be opened or the
/// hash cost is rejected.
pub(super) fn build_http_state(settings: &ServiceSettings) -> io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let users = Arc::new(InMemoryUserRepository::new());
    let posts = Arc::new(InMemoryPostRepository::new());
    let sessions = Arc::new(InMemorySessionStore::new(Arc::clone(&clock)));
    let assets = Arc::new(FsAssetStore::open(
        &settings.uploads_dir,
        Arc::clone(&clock),
    )?);
    let hasher = Arc::new(
        Argon2PasswordHasher::new(settings.hash_cost)
            .map_err(|err| io::Error::other(format!("password hasher: {err}")))?,
    );

    let login = SessionAuthenticator::new(
        Arc::clone(&users),
        Arc::clone(&hasher),
        sessions,
        Arc::clone(&clock),
    )
    .with_ttl(settings.session_ttl);
    let accounts = AccountServiceImpl::new(Arc::clone(&users), Arc::clone(&hasher), Arc::clone(&clock));
    let resets = PasswordResetServiceImpl::new(
        Arc::clone(&users),
        hasher,
        Arc::new(TracingNotifier),
        Arc::clone(&clock),
        settings.reset_link_base.clone(),
    )
    .with_token_ttl(settings.reset_token_ttl);
    let post_service = Arc::new(PostLifecycleService::new(
        users,
        posts,
        assets,
        clock,
        settings.page_size,
    ));

    Ok(web::Data::new(HttpState::new(
        Arc::new(login),
        Arc::new(accounts),
        Arc::new(resets),
        post_service.clone(),
        post_service,
    )))
}
