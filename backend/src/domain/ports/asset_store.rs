//! Port for binary asset storage.

use async_trait::async_trait;

use crate::domain::{AssetHandle, AssetUpload};

use super::define_port_error;

define_port_error! {
    /// Errors raised by asset store adapters.
    pub enum AssetStoreError {
        /// Reading or writing the backing medium failed.
        Io { message: String } => "asset store I/O failed: {message}",
        /// No asset exists for the handle.
        NotFound { handle: String } => "asset not found: {handle}",
    }
}

/// Stores uploaded files under collision-resistant handles.
///
/// A handle returned by [`AssetStore::store`] never collides with another
/// live handle and is not reused after deletion within the process lifetime.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Persist the upload and return its handle.
    async fn store(&self, upload: &AssetUpload) -> Result<AssetHandle, AssetStoreError>;

    /// Remove the backing data for `handle`.
    async fn delete(&self, handle: &AssetHandle) -> Result<(), AssetStoreError>;

    /// Whether `handle` currently resolves to stored data.
    async fn exists(&self, handle: &AssetHandle) -> Result<bool, AssetStoreError>;
}
