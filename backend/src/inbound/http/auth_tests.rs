//! Tests for account, session and password recovery handlers.

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::session_cookie;
use crate::test_support::stack::TestStack;

fn location(response: &ServiceResponse) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}

async fn register_user(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> ServiceResponse {
    let request = actix_test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "email": email, "name": "Ada", "password": password }))
        .to_request();
    actix_test::call_service(app, request).await
}

async fn login_user(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> ServiceResponse {
    let request = actix_test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    actix_test::call_service(app, request).await
}

async fn signed_in_cookie(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let registered = register_user(app, "a@x.com", "pw1").await;
    assert_eq!(registered.status(), StatusCode::CREATED);
    let response = login_user(app, "a@x.com", "pw1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    session_cookie(&response).expect("session cookie")
}

async fn get_with(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    uri: &str,
    cookie: Option<Cookie<'static>>,
) -> ServiceResponse {
    let mut request = actix_test::TestRequest::get().uri(uri);
    if let Some(cookie) = cookie {
        request = request.cookie(cookie);
    }
    actix_test::call_service(app, request.to_request()).await
}

#[actix_web::test]
async fn register_returns_public_profile() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;

    let response = register_user(&app, "a@x.com", "pw1").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["name"], "Ada");
    assert!(body.get("passwordHash").is_none());
}

#[actix_web::test]
async fn duplicate_registration_conflicts() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    register_user(&app, "a@x.com", "pw1").await;

    let response = register_user(&app, "a@x.com", "other").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "email_taken");
}

#[rstest]
#[case(json!({ "email": "no-at-sign", "name": "Ada", "password": "pw" }), "email")]
#[case(json!({ "email": "a@x.com", "name": "  ", "password": "pw" }), "name")]
#[case(json!({ "email": "a@x.com", "name": "Ada", "password": "" }), "password")]
#[actix_web::test]
async fn register_rejects_invalid_fields(#[case] payload: Value, #[case] field: &str) {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/register")
            .set_json(payload)
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["field"], field);
}

#[actix_web::test]
async fn login_redirects_to_profile_and_profile_shows_user() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    let cookie = signed_in_cookie(&app).await;

    let response = get_with(&app, "/profile", Some(cookie)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["email"], "a@x.com");
}

#[actix_web::test]
async fn login_response_points_at_profile() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    register_user(&app, "a@x.com", "pw1").await;

    let response = login_user(&app, "a@x.com", "pw1").await;

    assert_eq!(location(&response), Some("/profile"));
}

#[rstest]
#[case("a@x.com", "wrong")]
#[case("nobody@x.com", "pw1")]
#[actix_web::test]
async fn failed_logins_look_identical(#[case] email: &str, #[case] password: &str) {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    register_user(&app, "a@x.com", "pw1").await;

    let response = login_user(&app, email, password).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["message"], "invalid email or password");
}

#[actix_web::test]
async fn profile_redirects_anonymous_callers_to_login() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;

    let response = get_with(&app, "/profile", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));
}

#[rstest]
#[case("/login")]
#[case("/register")]
#[case("/forgot-password")]
#[actix_web::test]
async fn guest_pages_admit_anonymous_callers(#[case] uri: &str) {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;

    let response = get_with(&app, uri, None).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[rstest]
#[case("/login")]
#[case("/register")]
#[case("/forgot-password")]
#[case("/reset-password/anything")]
#[actix_web::test]
async fn guest_pages_redirect_signed_in_callers(#[case] uri: &str) {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    let cookie = signed_in_cookie(&app).await;

    let response = get_with(&app, uri, Some(cookie)).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/profile"));
}

#[actix_web::test]
async fn logout_destroys_the_server_side_session() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    let cookie = signed_in_cookie(&app).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/logout")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    // Replaying the old cookie must not resurrect the session.
    let replay = get_with(&app, "/profile", Some(cookie)).await;
    assert_eq!(replay.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&replay), Some("/login"));
}

#[actix_web::test]
async fn logout_without_session_still_redirects() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post().uri("/logout").to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn forgot_password_answers_alike_for_known_and_unknown_addresses() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    register_user(&app, "a@x.com", "pw1").await;

    let mut bodies = Vec::new();
    for email in ["a@x.com", "nobody@x.com"] {
        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/forgot-password")
                .set_json(json!({ "email": email }))
                .to_request(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        bodies.push(actix_test::read_body(response).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(stack.notifier.sent().len(), 1);
}

#[actix_web::test]
async fn forgot_password_reports_delivery_failure() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    register_user(&app, "a@x.com", "pw1").await;
    stack.notifier.fail_deliveries(true);

    let response = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/forgot-password")
            .set_json(json!({ "email": "a@x.com" }))
            .to_request(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[actix_web::test]
async fn reset_flow_changes_password_once() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;
    register_user(&app, "a@x.com", "pw1").await;
    actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/forgot-password")
            .set_json(json!({ "email": "a@x.com" }))
            .to_request(),
    )
    .await;
    let token = stack.notifier.last_reset_token().expect("token mailed");

    let page = get_with(&app, &format!("/reset-password/{token}"), None).await;
    assert_eq!(page.status(), StatusCode::NO_CONTENT);

    let reset = |confirm: &'static str| {
        actix_test::TestRequest::post()
            .uri("/reset-password")
            .set_json(json!({ "token": token, "password": "pw2", "confirmPassword": confirm }))
            .to_request()
    };

    let mismatch = actix_test::call_service(&app, reset("pw3")).await;
    assert_eq!(mismatch.status(), StatusCode::BAD_REQUEST);

    let done = actix_test::call_service(&app, reset("pw2")).await;
    assert_eq!(done.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&done), Some("/login"));

    let replay = actix_test::call_service(&app, reset("pw2")).await;
    assert_eq!(replay.status(), StatusCode::NOT_FOUND);

    let old = login_user(&app, "a@x.com", "pw1").await;
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);
    let new = login_user(&app, "a@x.com", "pw2").await;
    assert_eq!(new.status(), StatusCode::SEE_OTHER);
}

#[actix_web::test]
async fn reset_page_rejects_unknown_token() {
    let stack = TestStack::new();
    let app = actix_test::init_service(stack.app()).await;

    let response = get_with(&app, "/reset-password/not-issued", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["details"]["code"], "invalid_token");
}
