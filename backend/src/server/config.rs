//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use chrono::Duration;
use pagination::PageSize;
use postnest::outbound::crypto::HashCost;
use url::Url;

/// Settings the domain services are built from.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub(crate) uploads_dir: PathBuf,
    pub(crate) page_size: PageSize,
    pub(crate) session_ttl: Duration,
    pub(crate) reset_link_base: Url,
    pub(crate) reset_token_ttl: Option<Duration>,
    pub(crate) hash_cost: HashCost,
}

impl ServiceSettings {
    /// Collect service settings; reset tokens never expire and hashing uses
    /// the recommended cost until overridden.
    #[must_use]
    pub fn new(
        uploads_dir: PathBuf,
        page_size: PageSize,
        session_ttl: Duration,
        reset_link_base: Url,
    ) -> Self {
        Self {
            uploads_dir,
            page_size,
            session_ttl,
            reset_link_base,
            reset_token_ttl: None,
            hash_cost: HashCost::default(),
        }
    }

    /// Expire reset tokens after `ttl`.
    #[must_use]
    pub fn with_reset_token_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.reset_token_ttl = ttl;
        self
    }

    /// Override the Argon2 cost.
    #[must_use]
    pub fn with_hash_cost(mut self, cost: HashCost) -> Self {
        self.hash_cost = cost;
        self
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) services: ServiceSettings,
}

impl ServerConfig {
    /// Construct a server configuration from validated settings.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        services: ServiceSettings,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            services,
        }
    }

    /// Cookie lifetime matching the server-side session lifetime.
    pub(crate) fn cookie_ttl(&self) -> actix_web::cookie::time::Duration {
        actix_web::cookie::time::Duration::seconds(self.services.session_ttl.num_seconds())
    }
}
