//! End-to-end journeys through the HTTP surface against the in-memory stack.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use postnest::domain::EmailAddress;
use postnest::domain::ports::UserRepository;
use postnest::test_support::stack::TestStack;
use rstest::{fixture, rstest};
use serde_json::json;

mod support;

use support::{location, post_form, register, send, send_json, sign_in};

#[fixture]
fn stack() -> TestStack {
    TestStack::new()
}

#[rstest]
#[actix_web::test]
async fn author_publishes_edits_and_retires_a_post(stack: TestStack) {
    let app = actix_test::init_service(stack.app()).await;
    register(&app, "ada@example.com", "Ada", "first-pass").await;
    let cookie = sign_in(&app, "ada@example.com", "first-pass").await;

    let (status, profile) = send_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/profile")
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["name"], "Ada");

    let (status, created) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/create-post")
            .cookie(cookie.clone())
            .set_json(post_form("Hello World", "First body", Some("cover.png"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["slug"], "hello-world");
    let id = created["id"].as_str().expect("post id").to_owned();
    let first_asset = created["asset"].as_str().expect("asset").to_owned();

    let (status, feed) = send_json(&app, actix_test::TestRequest::get().uri("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feed["items"][0]["slug"], "hello-world");
    assert_eq!(feed["items"][0]["author"]["email"], "ada@example.com");
    assert_eq!(feed["totalPages"], 1);

    let (status, detail) = send_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/post/hello-world")
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["editable"], true);

    let (status, updated) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/update-post/{id}"))
            .cookie(cookie.clone())
            .set_json(post_form("Hello Again", "Second body", Some("new.png"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["slug"], "hello-again");
    assert_ne!(updated["asset"], first_asset.as_str());

    let (status, _) = send_json(&app, actix_test::TestRequest::get().uri("/post/hello-world")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let res = send(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/delete-post/{id}"))
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/my-posts");

    let (status, mine) = send_json(
        &app,
        actix_test::TestRequest::get()
            .uri("/my-posts")
            .cookie(cookie.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().map(Vec::len), Some(0));

    let (_, feed) = send_json(&app, actix_test::TestRequest::get().uri("/")).await;
    assert_eq!(feed["items"].as_array().map(Vec::len), Some(0));

    let res = send(
        &app,
        actix_test::TestRequest::post().uri("/logout").cookie(cookie.clone()),
    )
    .await;
    assert_eq!(location(&res), "/login");
    let res = send(
        &app,
        actix_test::TestRequest::get().uri("/create-post").cookie(cookie),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");
}

#[rstest]
#[actix_web::test]
async fn forgotten_password_is_recovered_by_mail(stack: TestStack) {
    let app = actix_test::init_service(stack.app()).await;
    register(&app, "grace@example.com", "Grace", "old-secret").await;

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/forgot-password")
            .set_json(json!({ "email": "grace@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].is_string());

    let sent = stack.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to.to_string(), "grace@example.com");
    let token = stack.notifier.last_reset_token().expect("token in mail");

    let res = send(
        &app,
        actix_test::TestRequest::get().uri(&format!("/reset-password/{token}")),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = send(
        &app,
        actix_test::TestRequest::post().uri("/reset-password").set_json(json!({
            "token": token,
            "password": "new-secret",
            "confirmPassword": "new-secret",
        })),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/login");

    let email = EmailAddress::new("grace@example.com").expect("email");
    let stored = stack
        .users
        .find_by_email(&email)
        .await
        .expect("lookup")
        .expect("user");
    assert!(stored.reset_token().is_none());

    let (status, _) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "email": "grace@example.com", "password": "old-secret" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    sign_in(&app, "grace@example.com", "new-secret").await;
}

#[rstest]
#[actix_web::test]
async fn strangers_cannot_touch_someone_elses_post(stack: TestStack) {
    let app = actix_test::init_service(stack.app()).await;
    register(&app, "owner@example.com", "Owner", "pw-owner").await;
    register(&app, "other@example.com", "Other", "pw-other").await;
    let owner = sign_in(&app, "owner@example.com", "pw-owner").await;
    let other = sign_in(&app, "other@example.com", "pw-other").await;

    let (_, created) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri("/create-post")
            .cookie(owner)
            .set_json(post_form("Mine", "Hands off", Some("a.png"))),
    )
    .await;
    let id = created["id"].as_str().expect("id").to_owned();

    let (status, body) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/update-post/{id}"))
            .cookie(other.clone())
            .set_json(post_form("Theirs", "Taken", None)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "forbidden");

    let (status, _) = send_json(
        &app,
        actix_test::TestRequest::post()
            .uri(&format!("/delete-post/{id}"))
            .cookie(other),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, detail) = send_json(&app, actix_test::TestRequest::get().uri("/post/mine")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["title"], "Mine");
    assert_eq!(detail["editable"], false);
}
