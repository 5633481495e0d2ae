//! Asset store-on-create, replace-on-update and delete-on-delete.
//!
//! Deletion is best effort: a failed delete is logged and swallowed, so it
//! never fails the post operation that triggered it.

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use crate::domain::port_errors::map_asset_error;
use crate::domain::ports::AssetStore;
use crate::domain::{AssetHandle, AssetUpload, Error};

pub(crate) struct AssetLifecycle<A> {
    assets: Arc<A>,
}

impl<A> Clone for AssetLifecycle<A> {
    fn clone(&self) -> Self {
        Self {
            assets: Arc::clone(&self.assets),
        }
    }
}

impl<A: AssetStore> AssetLifecycle<A> {
    pub(crate) fn new(assets: Arc<A>) -> Self {
        Self { assets }
    }

    pub(crate) async fn store(&self, upload: &AssetUpload) -> Result<AssetHandle, Error> {
        self.assets.store(upload).await.map_err(map_asset_error)
    }

    /// Attempt to delete `handle` exactly once.
    pub(crate) async fn discard(&self, handle: &AssetHandle) {
        if let Err(err) = self.assets.delete(handle).await {
            warn!(
                asset = %handle,
                kind = err.kind(),
                error = %err,
                "asset deletion failed; stale file left behind"
            );
        }
    }

    /// Store `upload`, then run `persist` with the new handle.
    ///
    /// On success the `old` asset is discarded; on failure the new asset is
    /// discarded and the old one stays referenced.
    pub(crate) async fn replace_with<T, F, Fut>(
        &self,
        old: &AssetHandle,
        upload: &AssetUpload,
        persist: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(AssetHandle) -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let fresh = self.store(upload).await?;
        match persist(fresh.clone()).await {
            Ok(value) => {
                self.discard(old).await;
                Ok(value)
            }
            Err(err) => {
                self.discard(&fresh).await;
                Err(err)
            }
        }
    }
}
