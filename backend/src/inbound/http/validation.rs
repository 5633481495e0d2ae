//! Shared validation helpers for inbound HTTP adapters.
//!
//! Value-object constructors report typed errors; these helpers turn them
//! into `invalid_request` responses carrying `{ field, code }` details.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::json;

use crate::domain::{
    AssetUpload, AssetValidationError, AuthValidationError, Error, PostId, PostValidationError,
    UserValidationError,
};

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const NAME: FieldName = FieldName::new("name");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const TOKEN: FieldName = FieldName::new("token");
pub(crate) const TITLE: FieldName = FieldName::new("title");
pub(crate) const BODY: FieldName = FieldName::new("body");
pub(crate) const IMAGE: FieldName = FieldName::new("image");
pub(crate) const POST_ID: FieldName = FieldName::new("id");

fn invalid(field: FieldName, code: &str, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

fn user_code(err: &UserValidationError) -> (FieldName, &'static str) {
    match err {
        UserValidationError::EmptyId | UserValidationError::InvalidId => {
            (FieldName::new("userId"), "invalid_id")
        }
        UserValidationError::EmptyDisplayName => (NAME, "empty_name"),
        UserValidationError::DisplayNameTooLong { .. } => (NAME, "name_too_long"),
        UserValidationError::DisplayNameControlCharacters => (NAME, "invalid_name"),
        UserValidationError::EmptyEmail => (EMAIL, "empty_email"),
        UserValidationError::EmailMissingSeparator => (EMAIL, "invalid_email"),
        UserValidationError::EmailTooLong { .. } => (EMAIL, "email_too_long"),
    }
}

pub(crate) fn user_validation_error(err: UserValidationError) -> Error {
    let (field, code) = user_code(&err);
    invalid(field, code, err.to_string())
}

pub(crate) fn auth_validation_error(err: AuthValidationError) -> Error {
    match err {
        AuthValidationError::User(inner) => user_validation_error(inner),
        AuthValidationError::EmptyPassword => invalid(PASSWORD, "empty_password", err.to_string()),
        AuthValidationError::EmptyToken | AuthValidationError::InvalidToken => {
            invalid(TOKEN, "invalid_token", err.to_string())
        }
    }
}

pub(crate) fn post_validation_error(err: PostValidationError) -> Error {
    let (field, code) = match &err {
        PostValidationError::EmptyId | PostValidationError::InvalidId => (POST_ID, "invalid_id"),
        PostValidationError::EmptyTitle => (TITLE, "empty_title"),
        PostValidationError::TitleTooLong { .. } => (TITLE, "title_too_long"),
        PostValidationError::EmptyBody => (BODY, "empty_body"),
        PostValidationError::EmptySlug | PostValidationError::InvalidSlug => {
            (TITLE, "invalid_slug")
        }
    };
    invalid(field, code, err.to_string())
}

pub(crate) fn asset_validation_error(err: AssetValidationError) -> Error {
    invalid(IMAGE, "invalid_image", err.to_string())
}

pub(crate) fn parse_post_id(raw: &str) -> Result<PostId, Error> {
    PostId::new(raw).map_err(post_validation_error)
}

/// Decode a base64 image payload into an upload.
pub(crate) fn decode_upload(filename: &str, data: &str) -> Result<AssetUpload, Error> {
    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|_| invalid(IMAGE, "invalid_encoding", "image data must be base64"))?;
    AssetUpload::new(bytes, filename).map_err(asset_validation_error)
}
