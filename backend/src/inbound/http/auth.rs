//! Account, session and password recovery handlers.
//!
//! ```text
//! GET  /login | /register | /forgot-password | /reset-password/{token}
//! GET  /profile
//! POST /register {"email":"a@x.com","name":"Ada","password":"pw1"}
//! POST /login {"email":"a@x.com","password":"pw1"}
//! POST /logout
//! POST /forgot-password {"email":"a@x.com"}
//! POST /reset-password {"token":"...","password":"pw2","confirmPassword":"pw2"}
//! ```
//!
//! Entry points for anonymous visitors redirect signed-in callers to
//! `/profile`; the profile redirects anonymous callers to `/login`.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::domain::ports::ResetIssueOutcome;
use crate::domain::{
    EmailAddress, LoginCredentials, PublicUser, Redirect, RegistrationRequest,
    ResetPasswordRequest,
};
use crate::inbound::http::error::{ApiResult, GatedResult};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{auth_validation_error, user_validation_error};

/// Body for `POST /register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    #[schema(example = "a@x.com")]
    pub email: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    pub password: String,
}

/// Body for `POST /login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    #[schema(example = "a@x.com")]
    pub email: String,
    pub password: String,
}

/// Body for `POST /forgot-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequestBody {
    #[schema(example = "a@x.com")]
    pub email: String,
}

/// Body for `POST /reset-password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequestBody {
    pub token: String,
    pub password: String,
    pub confirm_password: String,
}

/// Acknowledgement returned by `POST /forgot-password`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequestedResponse {
    pub message: String,
}

const RESET_REQUESTED: &str = "If the address is registered, a reset link is on its way.";

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

async fn guest_only(state: &HttpState, session: &SessionContext) -> GatedResult<()> {
    state.login.require_guest(session.id().as_ref()).await
}

/// Login page entry point.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 204, description = "Caller may log in"),
        (status = 303, description = "Already signed in; redirect to /profile")
    ),
    tags = ["auth"],
    operation_id = "loginPage"
)]
#[get("/login")]
pub async fn login_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Registration page entry point.
#[utoipa::path(
    get,
    path = "/register",
    responses(
        (status = 204, description = "Caller may register"),
        (status = 303, description = "Already signed in; redirect to /profile")
    ),
    tags = ["auth"],
    operation_id = "registerPage"
)]
#[get("/register")]
pub async fn register_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Forgotten-password page entry point.
#[utoipa::path(
    get,
    path = "/forgot-password",
    responses(
        (status = 204, description = "Caller may request a reset"),
        (status = 303, description = "Already signed in; redirect to /profile")
    ),
    tags = ["auth"],
    operation_id = "forgotPasswordPage"
)]
#[get("/forgot-password")]
pub async fn forgot_password_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Reset page entry point; checks the token before the form is shown.
#[utoipa::path(
    get,
    path = "/reset-password/{token}",
    params(("token" = String, Path, description = "Reset token from the e-mail link")),
    responses(
        (status = 204, description = "Token is valid"),
        (status = 303, description = "Already signed in; redirect to /profile"),
        (status = 404, description = "Token is invalid or spent", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "resetPasswordPage"
)]
#[get("/reset-password/{token}")]
pub async fn reset_password_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    token: web::Path<String>,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    state.password_resets.validate(token.as_str()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Current user's public profile.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Signed-in user", body = PublicUser),
        (status = 303, description = "Not signed in; redirect to /login")
    ),
    tags = ["auth"],
    operation_id = "profile",
    security(("SessionCookie" = []))
)]
#[get("/profile")]
pub async fn profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> GatedResult<web::Json<PublicUser>> {
    let user = state
        .login
        .require_authenticated(session.id().as_ref())
        .await?;
    Ok(web::Json(user.to_public()))
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequestBody,
    responses(
        (status = 201, description = "Account created", body = PublicUser),
        (status = 303, description = "Already signed in; redirect to /profile"),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 409, description = "E-mail already registered", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequestBody>,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    let body = payload.into_inner();
    let request = RegistrationRequest::try_from_parts(&body.email, &body.name, &body.password)
        .map_err(auth_validation_error)?;
    let user = state.accounts.register(&request).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Authenticate and open a session.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequestBody,
    responses(
        (status = 303, description = "Signed in; redirect to /profile", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 401, description = "Invalid credentials", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequestBody>,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(auth_validation_error)?;
    let opened = state.login.login(&credentials).await?;
    session.persist(opened.id())?;
    Ok(see_other(Redirect::Profile.location()))
}

/// End the session. Available to any caller.
#[utoipa::path(
    post,
    path = "/logout",
    responses((status = 303, description = "Signed out; redirect to /login")),
    tags = ["auth"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(state: web::Data<HttpState>, session: SessionContext) -> ApiResult<HttpResponse> {
    if let Some(id) = session.id() {
        state.login.logout(&id).await?;
    }
    session.clear();
    Ok(see_other(Redirect::Login.location()))
}

/// Request a password reset link.
///
/// Known and unknown addresses receive the same response.
#[utoipa::path(
    post,
    path = "/forgot-password",
    request_body = ForgotPasswordRequestBody,
    responses(
        (status = 202, description = "Request accepted", body = ResetRequestedResponse),
        (status = 303, description = "Already signed in; redirect to /profile"),
        (status = 400, description = "Invalid request", body = crate::domain::Error),
        (status = 503, description = "E-mail delivery unavailable", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "forgotPassword",
    security([])
)]
#[post("/forgot-password")]
pub async fn forgot_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ForgotPasswordRequestBody>,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    let email = EmailAddress::new(&payload.email).map_err(user_validation_error)?;
    let outcome = state.password_resets.issue(&email).await?;
    if outcome == ResetIssueOutcome::UserNotFound {
        debug!("reset requested for unregistered address");
    }
    Ok(HttpResponse::Accepted().json(ResetRequestedResponse {
        message: RESET_REQUESTED.to_owned(),
    }))
}

/// Set a new password with a reset token.
#[utoipa::path(
    post,
    path = "/reset-password",
    request_body = ResetPasswordRequestBody,
    responses(
        (status = 303, description = "Password changed; redirect to /login"),
        (status = 400, description = "Passwords do not match", body = crate::domain::Error),
        (status = 404, description = "Token is invalid or spent", body = crate::domain::Error)
    ),
    tags = ["auth"],
    operation_id = "resetPassword",
    security([])
)]
#[post("/reset-password")]
pub async fn reset_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ResetPasswordRequestBody>,
) -> GatedResult<HttpResponse> {
    guest_only(&state, &session).await?;
    let body = payload.into_inner();
    let request = ResetPasswordRequest::new(body.token, body.password, body.confirm_password);
    state.password_resets.consume(&request).await?;
    Ok(see_other(Redirect::Login.location()))
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
