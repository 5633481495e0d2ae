//! HTTP adapter mapping for domain errors and session gates.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and
//! gate rejections into `303 See Other` redirects.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use tracing::error;

use crate::domain::{Error, ErrorCode, GateError};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Result alias for handlers behind a session gate.
///
/// Domain errors convert into [`GateError::Dependency`] through `?`, so gated
/// handlers can mix gate checks and service calls freely.
pub type GatedResult<T> = Result<T, GateError>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        error!(message = error.message(), details = ?error.details(), "internal error");
        Error::internal("Internal server error")
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl ResponseError for GateError {
    fn status_code(&self) -> StatusCode {
        match self {
            GateError::Redirect(_) => StatusCode::SEE_OTHER,
            GateError::Dependency(error) => error.status_code(),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            GateError::Redirect(target) => HttpResponse::SeeOther()
                .insert_header((header::LOCATION, target.location()))
                .finish(),
            GateError::Dependency(error) => error.error_response(),
        }
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::Redirect;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("who"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("no"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("gone"), StatusCode::NOT_FOUND)]
    #[case(Error::conflict("taken"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_codes_to_statuses(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(error.status_code(), status);
    }

    #[actix_web::test]
    async fn internal_messages_are_redacted() {
        let response = Error::internal("db password leaked")
            .with_details(json!({ "secret": true }))
            .error_response();

        let body = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["message"], "Internal server error");
        assert!(value.get("details").is_none());
    }

    #[actix_web::test]
    async fn client_errors_keep_details() {
        let response = Error::conflict("email already registered")
            .with_details(json!({ "field": "email", "code": "email_taken" }))
            .error_response();

        let body = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(value["code"], "conflict");
        assert_eq!(value["details"]["code"], "email_taken");
    }

    #[rstest]
    #[case(Redirect::Login, "/login")]
    #[case(Redirect::Profile, "/profile")]
    fn redirects_become_see_other(#[case] target: Redirect, #[case] location: &str) {
        let response = GateError::Redirect(target).error_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok()),
            Some(location)
        );
    }

    #[test]
    fn gate_dependency_failures_keep_their_status() {
        let gate = GateError::from(Error::service_unavailable("session store down"));

        assert_eq!(gate.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
