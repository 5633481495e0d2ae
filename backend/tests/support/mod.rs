//! Shared HTTP helpers for the end-to-end suites.

#![allow(dead_code, reason = "each suite uses a different subset of helpers")]

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use postnest::inbound::http::test_utils::session_cookie;
use serde_json::{Value, json};

/// Base64 for a tiny PNG header; enough for the asset store.
pub const PNG_BASE64: &str = "iVBORw==";

pub async fn send(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
) -> ServiceResponse {
    actix_test::call_service(app, request.to_request()).await
}

pub async fn send_json(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
) -> (StatusCode, Value) {
    let res = send(app, request).await;
    let status = res.status();
    let bytes = actix_test::read_body(res).await;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

pub fn location(res: &ServiceResponse) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("location header")
        .to_str()
        .expect("ascii location")
}

pub async fn register(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
    name: &str,
    password: &str,
) -> Value {
    let (status, body) = send_json(
        app,
        actix_test::TestRequest::post()
            .uri("/register")
            .set_json(json!({ "email": email, "name": name, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register {email}: {body}");
    body
}

/// Log in and return the session cookie.
pub async fn sign_in(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> Cookie<'static> {
    let res = send(
        app,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/profile");
    session_cookie(&res).expect("session cookie")
}

pub fn post_form(title: &str, body: &str, image: Option<&str>) -> Value {
    match image {
        Some(filename) => json!({
            "title": title,
            "body": body,
            "image": { "filename": filename, "data": PNG_BASE64 },
        }),
        None => json!({ "title": title, "body": body }),
    }
}
