//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer, the
//! domain payloads they exchange, and the session cookie security scheme.
//! The generated document backs Swagger UI in debug builds.

use crate::domain::{Error, ErrorCode, Post, PostView, PublicUser};
use crate::inbound::http::auth::{
    ForgotPasswordRequestBody, LoginRequestBody, RegisterRequestBody, ResetPasswordRequestBody,
    ResetRequestedResponse,
};
use crate::inbound::http::posts::{ImageBody, PostDetailResponse, PostFormBody};
use crate::inbound::http::schemas::{PageWindowSchema, PostPageSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the PostNest API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "PostNest API",
        description = "Accounts, cookie sessions and image-backed posts."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login_page,
        crate::inbound::http::auth::register_page,
        crate::inbound::http::auth::forgot_password_page,
        crate::inbound::http::auth::reset_password_page,
        crate::inbound::http::auth::profile,
        crate::inbound::http::auth::register,
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::forgot_password,
        crate::inbound::http::auth::reset_password,
        crate::inbound::http::posts::feed,
        crate::inbound::http::posts::get_post,
        crate::inbound::http::posts::my_posts,
        crate::inbound::http::posts::create_post_page,
        crate::inbound::http::posts::create_post,
        crate::inbound::http::posts::edit_post_page,
        crate::inbound::http::posts::update_post,
        crate::inbound::http::posts::delete_post,
    ),
    components(schemas(
        Error,
        ErrorCode,
        PublicUser,
        Post,
        PostView,
        PostDetailResponse,
        PostPageSchema,
        PageWindowSchema,
        RegisterRequestBody,
        LoginRequestBody,
        ForgotPasswordRequestBody,
        ResetPasswordRequestBody,
        ResetRequestedResponse,
        PostFormBody,
        ImageBody,
    )),
    tags(
        (name = "auth", description = "Registration, sessions and password resets"),
        (name = "posts", description = "Feed and owner-managed posts")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    fn schema(name: &str) -> RefOr<Schema> {
        let doc = ApiDoc::openapi();
        let schemas = doc.components.expect("components").schemas;
        schemas
            .get(name)
            .cloned()
            .unwrap_or_else(|| panic!("{name} schema registered"))
    }

    #[rstest]
    #[case("Error", "code")]
    #[case("Error", "message")]
    #[case("PublicUser", "email")]
    #[case("PublicUser", "name")]
    #[case("Post", "slug")]
    #[case("Post", "asset")]
    #[case("ResetPasswordRequestBody", "confirmPassword")]
    fn schemas_expose_camel_case_fields(#[case] name: &str, #[case] field: &str) {
        assert_object_schema_has_field(&schema(name), field);
    }

    #[rstest]
    fn public_user_never_documents_password_hash() {
        match schema("PublicUser") {
            RefOr::T(Schema::Object(obj)) => {
                assert!(!obj.properties.contains_key("passwordHash"));
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("/login")]
    #[case("/register")]
    #[case("/forgot-password")]
    #[case("/reset-password/{token}")]
    #[case("/reset-password")]
    #[case("/profile")]
    #[case("/logout")]
    #[case("/")]
    #[case("/post/{slug}")]
    #[case("/my-posts")]
    #[case("/create-post")]
    #[case("/edit-post/{id}")]
    #[case("/update-post/{id}")]
    #[case("/delete-post/{id}")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
