//! Port for post persistence.

use async_trait::async_trait;

use crate::domain::{AssetHandle, Post, PostId, PostSlug};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "post repository query failed: {message}",
        /// Another post already uses this slug.
        SlugTaken { slug: String } => "slug already in use: {slug}",
    }
}

/// Result of a conditional post update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionOutcome {
    /// The stored post matched and now holds the revision.
    Applied,
    /// No post with that id exists.
    Missing,
    /// The stored post references a different asset than expected; nothing
    /// was written.
    AssetChanged,
}

/// Port for storing posts and running recency-ordered window queries.
///
/// Recency order is `created_at` descending with ties broken by id
/// descending, so windows are stable across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a new post. Fails with [`PostRepositoryError::SlugTaken`] when
    /// another post holds the slug.
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError>;

    /// Replace a post's fields, provided the stored post still references
    /// `expected_asset`. Fails with [`PostRepositoryError::SlugTaken`] when
    /// another post holds the new slug.
    async fn update(
        &self,
        post: &Post,
        expected_asset: &AssetHandle,
    ) -> Result<RevisionOutcome, PostRepositoryError>;

    /// Remove a post and return the record as it was at removal. Returns
    /// `None` when it was already gone.
    async fn delete(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Fetch a post by id.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError>;

    /// Fetch a post by slug.
    async fn find_by_slug(&self, slug: &PostSlug) -> Result<Option<Post>, PostRepositoryError>;

    /// Fetch every listed post that exists, in recency order.
    async fn find_many(&self, ids: &[PostId]) -> Result<Vec<Post>, PostRepositoryError>;

    /// Total number of posts.
    async fn count(&self) -> Result<u64, PostRepositoryError>;

    /// Window of posts in recency order. A negative `offset` yields an empty
    /// window.
    async fn list_recent(&self, offset: i64, limit: u64)
    -> Result<Vec<Post>, PostRepositoryError>;
}
