//! HTTP inbound adapter exposing the JSON endpoints.

pub mod auth;
pub mod error;
pub mod posts;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod validation;

use actix_web::web;

pub use error::{ApiResult, GatedResult};

/// Register every route on `cfg`.
///
/// Callers supply `web::Data<HttpState>` and the session middleware.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use postnest::inbound::http::configure;
///
/// let app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login_page)
        .service(auth::register_page)
        .service(auth::forgot_password_page)
        .service(auth::reset_password_page)
        .service(auth::profile)
        .service(auth::register)
        .service(auth::login)
        .service(auth::logout)
        .service(auth::forgot_password)
        .service(auth::reset_password)
        .service(posts::feed)
        .service(posts::get_post)
        .service(posts::my_posts)
        .service(posts::create_post_page)
        .service(posts::create_post)
        .service(posts::edit_post_page)
        .service(posts::update_post)
        .service(posts::delete_post);
}
