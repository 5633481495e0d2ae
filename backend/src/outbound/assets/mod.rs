//! Filesystem asset store rooted in a capability-scoped directory.
//!
//! Handles are `{unix_millis}-{sequence}[.{ext}]`. The sequence is a process
//! wide counter, and files are opened with `create_new`, so a handle is never
//! handed out twice while the process runs.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use mockable::Clock;
use tokio::task;
use tracing::debug;

use crate::domain::ports::{AssetStore, AssetStoreError};
use crate::domain::{AssetHandle, AssetUpload};

const MAX_NAME_ATTEMPTS: u32 = 8;

/// [`AssetStore`] writing uploads into a single directory.
pub struct FsAssetStore {
    dir: Arc<Dir>,
    sequence: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl FsAssetStore {
    /// Open (creating if needed) the upload directory at `root`.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(root: &Path, clock: Arc<dyn Clock>) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            dir: Arc::new(dir),
            sequence: AtomicU64::new(0),
            clock,
        })
    }

    fn next_name(&self, extension: Option<&str>) -> String {
        let millis = self.clock.utc().timestamp_millis();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        match extension {
            Some(ext) => format!("{millis}-{seq}.{ext}"),
            None => format!("{millis}-{seq}"),
        }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, AssetStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, AssetStoreError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| AssetStoreError::io(format!("asset task failed: {err}")))?
    }
}

fn write_new(dir: &Dir, name: &str, bytes: &[u8]) -> io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(name, &options)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[async_trait]
impl AssetStore for FsAssetStore {
    async fn store(&self, upload: &AssetUpload) -> Result<AssetHandle, AssetStoreError> {
        let extension = upload.extension();
        for _ in 0..MAX_NAME_ATTEMPTS {
            let name = self.next_name(extension.as_deref());
            let bytes = upload.bytes().to_vec();
            let candidate = name.clone();
            let written = self
                .blocking(move |dir| match write_new(dir, &candidate, &bytes) {
                    Ok(()) => Ok(true),
                    Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
                    Err(err) => Err(AssetStoreError::io(err.to_string())),
                })
                .await?;
            if written {
                debug!(asset = %name, size = upload.bytes().len(), "asset stored");
                return AssetHandle::new(name)
                    .map_err(|err| AssetStoreError::io(format!("generated bad handle: {err}")));
            }
        }
        Err(AssetStoreError::io("could not allocate a unique asset name"))
    }

    async fn delete(&self, handle: &AssetHandle) -> Result<(), AssetStoreError> {
        let name = handle.as_ref().to_owned();
        self.blocking(move |dir| {
            dir.remove_file(&name).map_err(|err| {
                if err.kind() == io::ErrorKind::NotFound {
                    AssetStoreError::not_found(name.clone())
                } else {
                    AssetStoreError::io(err.to_string())
                }
            })
        })
        .await
    }

    async fn exists(&self, handle: &AssetHandle) -> Result<bool, AssetStoreError> {
        let name = handle.as_ref().to_owned();
        self.blocking(move |dir| Ok(dir.is_file(&name))).await
    }
}
