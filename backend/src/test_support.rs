//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests or
//! with the `test-support` feature.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

/// Clock whose instant only moves when a test says so.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// A clock pinned to 2026-01-01T12:00:00Z.
    pub fn fixed() -> Self {
        match Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0) {
            chrono::LocalResult::Single(now) => Self::new(now),
            _ => panic!("fixed test instant is unambiguous"),
        }
    }

    pub fn advance(&self, delta: Duration) {
        let delta = match TimeDelta::from_std(delta) {
            Ok(delta) => delta,
            Err(error) => {
                panic!("failed to convert Duration to TimeDelta: {error}; delta={delta:?}",)
            }
        };
        *self.lock_clock() += delta;
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod notifier {
    //! Notifier double that keeps every accepted message.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;

    use crate::domain::ports::{Notifier, NotifierError, OutboundMessage};

    const RESET_PATH: &str = "/reset-password/";

    /// Records delivered messages and can be switched into a failing mode.
    #[derive(Default)]
    pub struct RecordingNotifier {
        sent: Mutex<Vec<OutboundMessage>>,
        failing: AtomicBool,
    }

    impl RecordingNotifier {
        /// Make subsequent deliveries fail (or succeed again).
        pub fn fail_deliveries(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Messages accepted so far, oldest first.
        pub fn sent(&self) -> Vec<OutboundMessage> {
            self.lock().clone()
        }

        /// Token embedded in the most recent reset link, if any.
        pub fn last_reset_token(&self) -> Option<String> {
            let sent = self.lock();
            let body = sent.last()?.body_html.as_str();
            let start = body.find(RESET_PATH)? + RESET_PATH.len();
            let token: String = body[start..]
                .chars()
                .take_while(|ch| ch.is_ascii_alphanumeric() || *ch == '-' || *ch == '_')
                .collect();
            (!token.is_empty()).then_some(token)
        }

        fn lock(&self) -> std::sync::MutexGuard<'_, Vec<OutboundMessage>> {
            match self.sent.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("notifier mutex"),
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, message: &OutboundMessage) -> Result<(), NotifierError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(NotifierError::delivery("recording notifier set to fail"));
            }
            self.lock().push(message.clone());
            Ok(())
        }
    }
}

pub mod stack {
    //! Fully wired in-memory service stack for handler and end-to-end tests.

    use std::sync::Arc;

    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::{App, web};
    use chrono::Duration;
    use mockable::Clock;
    use pagination::PageSize;
    use tempfile::TempDir;
    use url::Url;

    use super::MutableClock;
    use super::notifier::RecordingNotifier;
    use crate::domain::{
        AccountServiceImpl, PasswordResetServiceImpl, PostLifecycleService, SessionAuthenticator,
    };
    use crate::inbound::http::configure;
    use crate::inbound::http::state::HttpState;
    use crate::inbound::http::test_utils::test_session_middleware;
    use crate::outbound::assets::FsAssetStore;
    use crate::outbound::crypto::{Argon2PasswordHasher, HashCost};
    use crate::outbound::memory::{
        InMemoryPostRepository, InMemorySessionStore, InMemoryUserRepository,
    };

    /// Argon2 cost small enough to keep tests fast.
    pub const CHEAP_HASH_COST: HashCost = HashCost {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };

    /// Base URL used for reset links.
    pub const LINK_BASE: &str = "http://postnest.test";

    /// Knobs a test may turn before the stack is wired.
    #[derive(Debug, Clone, Copy)]
    pub struct StackOptions {
        pub page_size: PageSize,
        pub token_ttl: Option<Duration>,
    }

    impl Default for StackOptions {
        fn default() -> Self {
            Self {
                page_size: PageSize::DEFAULT,
                token_ttl: None,
            }
        }
    }

    /// Adapters plus the driving ports built on top of them.
    ///
    /// Uploaded assets live in a temporary directory removed on drop.
    pub struct TestStack {
        pub users: Arc<InMemoryUserRepository>,
        pub posts: Arc<InMemoryPostRepository>,
        pub sessions: Arc<InMemorySessionStore>,
        pub assets: Arc<FsAssetStore>,
        pub hasher: Arc<Argon2PasswordHasher>,
        pub notifier: Arc<RecordingNotifier>,
        pub clock: Arc<MutableClock>,
        pub state: HttpState,
        _uploads: TempDir,
    }

    impl TestStack {
        pub fn new() -> Self {
            Self::with_options(StackOptions::default())
        }

        pub fn with_options(options: StackOptions) -> Self {
            let uploads = match TempDir::new() {
                Ok(dir) => dir,
                Err(error) => panic!("create uploads dir: {error}"),
            };
            let clock = Arc::new(MutableClock::fixed());
            let shared_clock: Arc<dyn Clock> = clock.clone();

            let users = Arc::new(InMemoryUserRepository::new());
            let posts = Arc::new(InMemoryPostRepository::new());
            let sessions = Arc::new(InMemorySessionStore::new(Arc::clone(&shared_clock)));
            let assets = match FsAssetStore::open(uploads.path(), Arc::clone(&shared_clock)) {
                Ok(store) => Arc::new(store),
                Err(error) => panic!("open asset store: {error}"),
            };
            let hasher = match Argon2PasswordHasher::new(CHEAP_HASH_COST) {
                Ok(hasher) => Arc::new(hasher),
                Err(error) => panic!("build hasher: {error}"),
            };
            let notifier = Arc::new(RecordingNotifier::default());
            let link_base = match Url::parse(LINK_BASE) {
                Ok(url) => url,
                Err(error) => panic!("parse link base: {error}"),
            };

            let login = SessionAuthenticator::new(
                Arc::clone(&users),
                Arc::clone(&hasher),
                Arc::clone(&sessions),
                Arc::clone(&shared_clock),
            );
            let accounts = AccountServiceImpl::new(
                Arc::clone(&users),
                Arc::clone(&hasher),
                Arc::clone(&shared_clock),
            );
            let resets = PasswordResetServiceImpl::new(
                Arc::clone(&users),
                Arc::clone(&hasher),
                Arc::clone(&notifier),
                Arc::clone(&shared_clock),
                link_base,
            )
            .with_token_ttl(options.token_ttl);
            let post_service = Arc::new(PostLifecycleService::new(
                Arc::clone(&users),
                Arc::clone(&posts),
                Arc::clone(&assets),
                shared_clock,
                options.page_size,
            ));

            let state = HttpState::new(
                Arc::new(login),
                Arc::new(accounts),
                Arc::new(resets),
                post_service.clone(),
                post_service,
            );

            Self {
                users,
                posts,
                sessions,
                assets,
                hasher,
                notifier,
                clock,
                state,
                _uploads: uploads,
            }
        }

        /// An Actix app serving every route against this stack.
        pub fn app(
            &self,
        ) -> App<
            impl ServiceFactory<
                ServiceRequest,
                Config = (),
                Response = ServiceResponse,
                Error = actix_web::Error,
                InitError = (),
            > + use<>,
        > {
            App::new()
                .app_data(web::Data::new(self.state.clone()))
                .wrap(test_session_middleware())
                .configure(configure)
        }
    }

    impl Default for TestStack {
        fn default() -> Self {
            Self::new()
        }
    }
}
