//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{ServerConfig, ServiceSettings};

use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite, time::Duration as CookieDuration};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use postnest::Trace;
#[cfg(debug_assertions)]
use postnest::doc::ApiDoc;
use postnest::inbound::http::configure;
use postnest::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    cookie_ttl: CookieDuration,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
        cookie_ttl,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(PersistentSession::default().session_ttl(cookie_ttl))
        .build();

    let app = App::new()
        .app_data(http_state)
        .wrap(session)
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when the services cannot be built or the
/// socket cannot be bound.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config.services)?;
    let cookie_ttl = config.cookie_ttl();
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        services,
    } = config;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            cookie_ttl,
        })
    })
    .bind(bind_addr)?
    .run();

    info!(
        %bind_addr,
        uploads_dir = %services.uploads_dir.display(),
        "server listening"
    );
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::Duration;
    use pagination::PageSize;
    use postnest::outbound::crypto::HashCost;
    use serde_json::json;
    use tempfile::TempDir;
    use url::Url;

    fn deps(dir: &TempDir) -> AppDependencies {
        let services = ServiceSettings::new(
            dir.path().to_path_buf(),
            PageSize::DEFAULT,
            Duration::days(1),
            Url::parse("http://localhost:3000").expect("url"),
        )
        .with_hash_cost(HashCost {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        });
        AppDependencies {
            http_state: build_http_state(&services).expect("state"),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
            cookie_ttl: CookieDuration::days(1),
        }
    }

    #[actix_web::test]
    async fn wired_app_serves_the_feed_with_a_trace_header() {
        let dir = TempDir::new().expect("temp dir");
        let app = actix_test::init_service(build_app(deps(&dir))).await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/").to_request())
                .await;

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[actix_web::test]
    async fn login_issues_a_private_persistent_cookie() {
        let dir = TempDir::new().expect("temp dir");
        let app = actix_test::init_service(build_app(deps(&dir))).await;

        let register = actix_test::TestRequest::post()
            .uri("/register")
            .set_json(json!({"email": "a@x.com", "name": "Ada", "password": "pw"}))
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, register).await.status(),
            StatusCode::CREATED
        );

        let login = actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({"email": "a@x.com", "password": "pw"}))
            .to_request();
        let res = actix_test::call_service(&app, login).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = res
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .expect("session cookie");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::days(1)));
    }
}
