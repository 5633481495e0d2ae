//! Driving port for post mutations.

use async_trait::async_trait;

use crate::domain::{CreatePostRequest, Error, Post, PostId, UpdatePostRequest, UserId};

/// Domain use-case port for creating, editing and deleting owned posts.
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Create a post owned by the requesting user. An asset is mandatory.
    async fn create(&self, request: &CreatePostRequest) -> Result<Post, Error>;

    /// Edit a post. Only its owner may do so.
    async fn update(&self, request: &UpdatePostRequest) -> Result<Post, Error>;

    /// Delete a post and its asset. Only its owner may do so.
    async fn delete(&self, post_id: &PostId, requester: &UserId) -> Result<(), Error>;
}
