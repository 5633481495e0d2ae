//! Post aggregate and its value objects.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::asset::{AssetHandle, AssetUpload};
use super::slug::{is_valid_slug, slugify_title, with_suffix};
use super::user::{PublicUser, UserId};

/// Maximum title length in characters.
pub const TITLE_MAX: usize = 200;

/// Validation errors for post value objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostValidationError {
    EmptyId,
    InvalidId,
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyBody,
    /// The title produced no usable slug characters.
    EmptySlug,
    InvalidSlug,
}

impl fmt::Display for PostValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "post id must not be empty"),
            Self::InvalidId => write!(f, "post id must be a valid UUID"),
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::EmptyBody => write!(f, "body must not be empty"),
            Self::EmptySlug => write!(f, "title must contain at least one URL-safe character"),
            Self::InvalidSlug => write!(f, "slug is malformed"),
        }
    }
}

impl std::error::Error for PostValidationError {}

/// Time-ordered post identifier (UUID v7).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(Uuid, String);

impl PostId {
    /// Validate and construct a [`PostId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(PostValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| PostValidationError::InvalidId)?;
        Ok(Self(parsed, parsed.to_string()))
    }

    /// Generate a new time-ordered identifier.
    pub fn random() -> Self {
        let uuid = Uuid::now_v7();
        Self(uuid, uuid.to_string())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PostId> for String {
    fn from(value: PostId) -> Self {
        let PostId(_, raw) = value;
        raw
    }
}

impl TryFrom<String> for PostId {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Post title, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostTitle(String);

impl PostTitle {
    /// Validate and construct a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, PostValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(PostValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > TITLE_MAX {
            return Err(PostValidationError::TitleTooLong { max: TITLE_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for PostTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostTitle> for String {
    fn from(value: PostTitle) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostTitle {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Post body text. Stored verbatim; rendering is an adapter concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostBody(String);

impl PostBody {
    /// Validate and construct a body.
    pub fn new(raw: impl Into<String>) -> Result<Self, PostValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(PostValidationError::EmptyBody);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for PostBody {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<PostBody> for String {
    fn from(value: PostBody) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostBody {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// URL slug of a post. Unique across posts once persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostSlug(String);

impl PostSlug {
    /// Derive the slug for `title` at the given collision `attempt`
    /// (`1` for the bare slug).
    ///
    /// # Examples
    /// ```
    /// use postnest::domain::{PostSlug, PostTitle};
    ///
    /// let title = PostTitle::new("Hello World").expect("title");
    /// assert_eq!(PostSlug::from_title(&title, 1).expect("slug").as_ref(), "hello-world");
    /// assert_eq!(PostSlug::from_title(&title, 2).expect("slug").as_ref(), "hello-world-2");
    /// ```
    pub fn from_title(title: &PostTitle, attempt: u32) -> Result<Self, PostValidationError> {
        let base = slugify_title(title.as_ref());
        if base.is_empty() {
            return Err(PostValidationError::EmptySlug);
        }
        Ok(Self(with_suffix(&base, attempt)))
    }

    /// Validate a slug received from a caller.
    pub fn parse(raw: impl Into<String>) -> Result<Self, PostValidationError> {
        let raw = raw.into();
        if !is_valid_slug(&raw) {
            return Err(PostValidationError::InvalidSlug);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for PostSlug {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PostSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<PostSlug> for String {
    fn from(value: PostSlug) -> Self {
        value.0
    }
}

impl TryFrom<String> for PostSlug {
    type Error = PostValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Persisted post.
///
/// ## Invariants
/// - `owner` never changes after creation.
/// - `asset` always names exactly one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[schema(value_type = String, example = "01890a5d-ac96-774b-bcce-b302099a8057")]
    id: PostId,
    #[schema(value_type = String, example = "hello-world")]
    slug: PostSlug,
    #[schema(value_type = String, example = "Hello World")]
    title: PostTitle,
    #[schema(value_type = String)]
    body: PostBody,
    #[schema(value_type = String, example = "1700000000000-0.png")]
    asset: AssetHandle,
    #[schema(value_type = String)]
    owner: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Field values for a newly created [`Post`].
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Identifier assigned by the service.
    pub id: PostId,
    /// Slug derived from the title.
    pub slug: PostSlug,
    /// Post title.
    pub title: PostTitle,
    /// Post body.
    pub body: PostBody,
    /// Handle of the stored asset.
    pub asset: AssetHandle,
    /// Creating user.
    pub owner: UserId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Build a post from creation fields.
    pub fn new(fields: NewPost) -> Self {
        let NewPost {
            id,
            slug,
            title,
            body,
            asset,
            owner,
            created_at,
        } = fields;
        Self {
            id,
            slug,
            title,
            body,
            asset,
            owner,
            created_at,
            updated_at: created_at,
        }
    }

    /// Stable identifier.
    pub fn id(&self) -> &PostId {
        &self.id
    }

    /// URL slug.
    pub fn slug(&self) -> &PostSlug {
        &self.slug
    }

    /// Title.
    pub fn title(&self) -> &PostTitle {
        &self.title
    }

    /// Body text.
    pub fn body(&self) -> &PostBody {
        &self.body
    }

    /// Handle of the attached asset.
    pub fn asset(&self) -> &AssetHandle {
        &self.asset
    }

    /// Owning user.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Creation instant.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification instant.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Copy of this post with edited content. Identity, owner and creation
    /// time are preserved.
    pub fn revised(
        &self,
        slug: PostSlug,
        title: PostTitle,
        body: PostBody,
        asset: AssetHandle,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: self.id.clone(),
            slug,
            title,
            body,
            asset,
            owner: self.owner.clone(),
            created_at: self.created_at,
            updated_at,
        }
    }
}

/// A post together with its public author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    post: Post,
    author: PublicUser,
}

impl PostView {
    /// Pair a post with its resolved owner.
    pub fn new(post: Post, author: PublicUser) -> Self {
        Self { post, author }
    }

    /// The post.
    pub fn post(&self) -> &Post {
        &self.post
    }

    /// Public projection of the owner.
    pub fn author(&self) -> &PublicUser {
        &self.author
    }
}

/// Input for creating a post.
#[derive(Debug, Clone)]
pub struct CreatePostRequest {
    owner: UserId,
    title: PostTitle,
    body: PostBody,
    asset: Option<AssetUpload>,
}

impl CreatePostRequest {
    /// Capture validated fields. A missing asset is rejected by the service.
    pub fn new(
        owner: UserId,
        title: PostTitle,
        body: PostBody,
        asset: Option<AssetUpload>,
    ) -> Self {
        Self {
            owner,
            title,
            body,
            asset,
        }
    }

    /// Requesting user.
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    /// Title.
    pub fn title(&self) -> &PostTitle {
        &self.title
    }

    /// Body.
    pub fn body(&self) -> &PostBody {
        &self.body
    }

    /// Uploaded file, if supplied.
    pub fn asset(&self) -> Option<&AssetUpload> {
        self.asset.as_ref()
    }
}

/// Input for editing a post.
#[derive(Debug, Clone)]
pub struct UpdatePostRequest {
    post_id: PostId,
    editor: UserId,
    title: PostTitle,
    body: PostBody,
    asset: Option<AssetUpload>,
}

impl UpdatePostRequest {
    /// Capture validated fields. Without an asset the current one is kept.
    pub fn new(
        post_id: PostId,
        editor: UserId,
        title: PostTitle,
        body: PostBody,
        asset: Option<AssetUpload>,
    ) -> Self {
        Self {
            post_id,
            editor,
            title,
            body,
            asset,
        }
    }

    /// Target post.
    pub fn post_id(&self) -> &PostId {
        &self.post_id
    }

    /// Requesting user.
    pub fn editor(&self) -> &UserId {
        &self.editor
    }

    /// New title.
    pub fn title(&self) -> &PostTitle {
        &self.title
    }

    /// New body.
    pub fn body(&self) -> &PostBody {
        &self.body
    }

    /// Replacement file, if supplied.
    pub fn asset(&self) -> Option<&AssetUpload> {
        self.asset.as_ref()
    }
}
