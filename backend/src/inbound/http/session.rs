//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! The cookie carries only an opaque [`SessionId`]; the record it points at
//! lives in the server-side session store behind the login service.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionId};

pub(crate) const SESSION_ID_KEY: &str = "sid";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Bind the cookie to a freshly created server-side session.
    pub fn persist(&self, id: &SessionId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(SESSION_ID_KEY, id.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The session id carried by the cookie, if any.
    ///
    /// A malformed value is treated as absent.
    pub fn id(&self) -> Option<SessionId> {
        let raw = match self.0.get::<String>(SESSION_ID_KEY) {
            Ok(raw) => raw?,
            Err(error) => {
                warn!(%error, "unreadable session cookie");
                return None;
            }
        };
        match SessionId::parse(&raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid session id in cookie");
                None
            }
        }
    }

    /// Drop the cookie state.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test, web};

    use super::*;
    use crate::inbound::http::test_utils::{session_cookie, test_session_middleware};

    fn session_test_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/get",
                web::get().to(|session: SessionContext| async move {
                    match session.id() {
                        Some(id) => HttpResponse::Ok().body(id.as_str().to_owned()),
                        None => HttpResponse::NoContent().finish(),
                    }
                }),
            )
            .route(
                "/clear",
                web::get().to(|session: SessionContext| async move {
                    session.clear();
                    HttpResponse::Ok().finish()
                }),
            )
    }

    #[actix_web::test]
    async fn round_trips_session_id() {
        let expected = SessionId::generate();
        let stored = expected.clone();
        let app = test::init_service(session_test_app().route(
            "/set",
            web::get().to(move |session: SessionContext| {
                let id = stored.clone();
                async move {
                    session.persist(&id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }
            }),
        ))
        .await;

        let set_res =
            test::call_service(&app, test::TestRequest::get().uri("/set").to_request()).await;
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let get_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(get_res.status(), StatusCode::OK);
        let body = test::read_body(get_res).await;
        assert_eq!(body, expected.as_str().as_bytes());
    }

    #[actix_web::test]
    async fn tampered_session_id_reads_as_absent() {
        let app = test::init_service(session_test_app().route(
            "/set-invalid",
            web::get().to(|session: Session| async move {
                session
                    .insert(SESSION_ID_KEY, "not a session id!")
                    .expect("set invalid session id");
                HttpResponse::Ok()
            }),
        ))
        .await;

        let set_res = test::call_service(
            &app,
            test::TestRequest::get().uri("/set-invalid").to_request(),
        )
        .await;
        let cookie = session_cookie(&set_res).expect("session cookie set");

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/get").cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn missing_cookie_reads_as_absent() {
        let app = test::init_service(session_test_app()).await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/get").to_request()).await;

        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }
}
