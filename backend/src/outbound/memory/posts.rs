//! In-memory post store with a unique slug index.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::domain::ports::{PostRepository, PostRepositoryError, RevisionOutcome};
use crate::domain::{AssetHandle, Post, PostId, PostSlug};

#[derive(Default)]
struct PostTable {
    by_id: HashMap<PostId, Post>,
    by_slug: HashMap<String, PostId>,
}

impl PostTable {
    fn slug_holder(&self, slug: &PostSlug) -> Option<&PostId> {
        self.by_slug.get(slug.as_ref())
    }
}

fn recency(a: &Post, b: &Post) -> Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}

/// [`PostRepository`] backed by a process-local map.
#[derive(Default)]
pub struct InMemoryPostRepository {
    table: RwLock<PostTable>,
}

impl InMemoryPostRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, PostTable>, PostRepositoryError> {
        self.table
            .read()
            .map_err(|_| PostRepositoryError::query("post table lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, PostTable>, PostRepositoryError> {
        self.table
            .write()
            .map_err(|_| PostRepositoryError::query("post table lock poisoned"))
    }

    fn sorted(table: &PostTable) -> Vec<Post> {
        let mut posts: Vec<Post> = table.by_id.values().cloned().collect();
        posts.sort_by(recency);
        posts
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, post: &Post) -> Result<(), PostRepositoryError> {
        let mut table = self.write()?;
        if table.slug_holder(post.slug()).is_some() {
            return Err(PostRepositoryError::slug_taken(post.slug().as_ref()));
        }
        table
            .by_slug
            .insert(post.slug().as_ref().to_owned(), post.id().clone());
        table.by_id.insert(post.id().clone(), post.clone());
        Ok(())
    }

    async fn update(
        &self,
        post: &Post,
        expected_asset: &AssetHandle,
    ) -> Result<RevisionOutcome, PostRepositoryError> {
        let mut table = self.write()?;
        let Some(existing) = table.by_id.get(post.id()) else {
            return Ok(RevisionOutcome::Missing);
        };
        if existing.asset() != expected_asset {
            return Ok(RevisionOutcome::AssetChanged);
        }
        let previous_slug = existing.slug().as_ref().to_owned();
        if table
            .slug_holder(post.slug())
            .is_some_and(|holder| holder != post.id())
        {
            return Err(PostRepositoryError::slug_taken(post.slug().as_ref()));
        }
        table.by_slug.remove(&previous_slug);
        table
            .by_slug
            .insert(post.slug().as_ref().to_owned(), post.id().clone());
        table.by_id.insert(post.id().clone(), post.clone());
        Ok(RevisionOutcome::Applied)
    }

    async fn delete(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        let mut table = self.write()?;
        let Some(removed) = table.by_id.remove(id) else {
            return Ok(None);
        };
        table.by_slug.remove(removed.slug().as_ref());
        Ok(Some(removed))
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostRepositoryError> {
        Ok(self.read()?.by_id.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &PostSlug) -> Result<Option<Post>, PostRepositoryError> {
        let table = self.read()?;
        Ok(table
            .slug_holder(slug)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_many(&self, ids: &[PostId]) -> Result<Vec<Post>, PostRepositoryError> {
        let table = self.read()?;
        let mut posts: Vec<Post> = ids
            .iter()
            .filter_map(|id| table.by_id.get(id))
            .cloned()
            .collect();
        posts.sort_by(recency);
        posts.dedup_by(|a, b| a.id() == b.id());
        Ok(posts)
    }

    async fn count(&self) -> Result<u64, PostRepositoryError> {
        let len = self.read()?.by_id.len();
        u64::try_from(len).map_err(|_| PostRepositoryError::query("post count overflow"))
    }

    async fn list_recent(
        &self,
        offset: i64,
        limit: u64,
    ) -> Result<Vec<Post>, PostRepositoryError> {
        let (Ok(offset), Ok(limit)) = (usize::try_from(offset), usize::try_from(limit)) else {
            return Ok(Vec::new());
        };
        let table = self.read()?;
        Ok(Self::sorted(&table)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }
}
