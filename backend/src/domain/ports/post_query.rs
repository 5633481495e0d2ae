//! Driving port for post reads.
//!
//! Reads filter out posts whose owner does not list them, so a half-finished
//! create or delete is never shown.

use async_trait::async_trait;
use pagination::Page;

use crate::domain::{Error, Post, PostId, PostView, UserId};

/// Domain use-case port for public and owner-scoped post reads.
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// Public lookup by slug, with the author's public profile.
    async fn get_by_slug(&self, slug: &str) -> Result<PostView, Error>;

    /// Posts owned by `owner`, most recent first.
    async fn list_owned(&self, owner: &UserId) -> Result<Vec<Post>, Error>;

    /// A post for its owner to edit; other users get
    /// [`crate::domain::ErrorCode::Forbidden`].
    async fn get_for_edit(&self, post_id: &PostId, requester: &UserId) -> Result<Post, Error>;

    /// Home feed page. `page` is used as given; callers clamp it to `>= 1`.
    async fn list_recent(&self, page: i64) -> Result<Page<PostView>, Error>;
}
