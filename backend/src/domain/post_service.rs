//! Post lifecycle service.
//!
//! Keeps three things in step across create, update and delete: the post
//! record, the owner's owned-post list and the stored asset. Storage offers
//! no cross-record transactions, so effects are ordered to keep the
//! inconsistency window small:
//!
//! - create: resolve owner, store asset, insert record, append owner entry.
//! - delete: remove owner entry, delete record, delete asset.
//!
//! Record updates are conditional on the asset the caller last saw, and
//! deletes discard the asset of the record actually removed, so interleaved
//! edits never strand an image.
//!
//! Readers treat a record whose owner does not list it as not yet (or no
//! longer) visible.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageSize, paginate};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::asset_lifecycle::AssetLifecycle;
use crate::domain::port_errors::{map_post_error, map_user_error};
use crate::domain::ports::{
    AssetStore, PostCommand, PostQuery, PostRepository, PostRepositoryError, RevisionOutcome,
    UserRepository,
};
use crate::domain::{
    AssetHandle, CreatePostRequest, Error, NewPost, Post, PostId, PostSlug, PostTitle,
    PostValidationError, PostView, PublicUser, UpdatePostRequest, User, UserId,
};

/// Upper bound on slug suffixes tried before giving up.
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Attempts made to append the owner entry after a post is inserted.
const OWNER_APPEND_ATTEMPTS: u32 = 2;

/// Post service implementing [`PostCommand`] and [`PostQuery`].
pub struct PostLifecycleService<U, P, A> {
    users: Arc<U>,
    posts: Arc<P>,
    assets: AssetLifecycle<A>,
    clock: Arc<dyn Clock>,
    page_size: PageSize,
}

impl<U, P, A> Clone for PostLifecycleService<U, P, A> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            posts: Arc::clone(&self.posts),
            assets: self.assets.clone(),
            clock: Arc::clone(&self.clock),
            page_size: self.page_size,
        }
    }
}

impl<U, P, A: AssetStore> PostLifecycleService<U, P, A> {
    /// Create a new service with the given collaborators.
    pub fn new(
        users: Arc<U>,
        posts: Arc<P>,
        assets: Arc<A>,
        clock: Arc<dyn Clock>,
        page_size: PageSize,
    ) -> Self {
        Self {
            users,
            posts,
            assets: AssetLifecycle::new(assets),
            clock,
            page_size,
        }
    }
}

fn map_validation_error(err: &PostValidationError) -> Error {
    let field = match err {
        PostValidationError::EmptyTitle
        | PostValidationError::TitleTooLong { .. }
        | PostValidationError::EmptySlug => "title",
        PostValidationError::EmptyBody => "body",
        PostValidationError::EmptyId | PostValidationError::InvalidId => "id",
        PostValidationError::InvalidSlug => "slug",
    };
    Error::invalid_request(err.to_string()).with_details(json!({ "field": field }))
}

fn post_not_found() -> Error {
    Error::not_found("post not found")
}

fn not_owner() -> Error {
    Error::forbidden("only the owner may change this post")
        .with_details(json!({ "code": "not_owner" }))
}

fn concurrent_edit() -> Error {
    Error::conflict("the post changed while it was being edited; reload and retry")
        .with_details(json!({ "code": "concurrent_edit" }))
}

fn slug_exhausted(title: &PostTitle) -> Error {
    Error::conflict(format!(
        "no free slug for title after {MAX_SLUG_ATTEMPTS} attempts"
    ))
    .with_details(json!({ "field": "title", "title": title.as_ref() }))
}

fn by_recency(a: &Post, b: &Post) -> std::cmp::Ordering {
    b.created_at()
        .cmp(&a.created_at())
        .then_with(|| b.id().cmp(a.id()))
}

impl<U, P, A> PostLifecycleService<U, P, A>
where
    U: UserRepository,
    P: PostRepository,
    A: AssetStore,
{
    async fn find_post(&self, id: &PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(post_not_found)
    }

    async fn find_user(&self, id: &UserId) -> Result<Option<User>, Error> {
        self.users.find_by_id(id).await.map_err(map_user_error)
    }

    /// Insert `build(slug)` under the first free slug for `title`.
    async fn insert_with_free_slug<F>(&self, title: &PostTitle, build: F) -> Result<Post, Error>
    where
        F: Fn(PostSlug) -> Post + Send + Sync,
    {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let slug = PostSlug::from_title(title, attempt).map_err(|e| map_validation_error(&e))?;
            let post = build(slug);
            match self.posts.insert(&post).await {
                Ok(()) => return Ok(post),
                Err(PostRepositoryError::SlugTaken { slug }) => {
                    debug!(%slug, attempt, "slug taken; trying next suffix");
                }
                Err(err) => return Err(map_post_error(err)),
            }
        }
        Err(slug_exhausted(title))
    }

    async fn append_owner_entry(&self, post: &Post) -> Result<(), Error> {
        for attempt in 1..=OWNER_APPEND_ATTEMPTS {
            match self
                .users
                .append_owned_post(post.owner(), post.id())
                .await
            {
                Ok(true) => return Ok(()),
                Ok(false) => {
                    warn!(post_id = %post.id(), attempt, "owner vanished before post could be listed");
                }
                Err(err) => {
                    warn!(
                        post_id = %post.id(),
                        attempt,
                        kind = err.kind(),
                        error = %err,
                        "owner list append failed"
                    );
                }
            }
        }
        error!(
            post_id = %post.id(),
            owner = %post.owner(),
            asset = %post.asset(),
            "post stored but not listed by its owner; manual reconciliation required"
        );
        Err(
            Error::internal("post created but could not be linked to its owner").with_details(
                json!({
                    "postId": post.id(),
                    "asset": post.asset(),
                    "reconciliation": "required",
                }),
            ),
        )
    }

    /// Persist the revised post, allocating a new slug when the title changed.
    async fn persist_revision(
        &self,
        current: &Post,
        request: &UpdatePostRequest,
        asset: AssetHandle,
    ) -> Result<Post, Error> {
        let now = self.clock.utc();
        let title_changed = request.title() != current.title();
        let attempts = if title_changed { MAX_SLUG_ATTEMPTS } else { 1 };

        for attempt in 1..=attempts {
            let slug = if title_changed {
                PostSlug::from_title(request.title(), attempt)
                    .map_err(|e| map_validation_error(&e))?
            } else {
                current.slug().clone()
            };
            let revised = current.revised(
                slug,
                request.title().clone(),
                request.body().clone(),
                asset.clone(),
                now,
            );
            match self.posts.update(&revised, current.asset()).await {
                Ok(RevisionOutcome::Applied) => return Ok(revised),
                Ok(RevisionOutcome::Missing) => return Err(post_not_found()),
                Ok(RevisionOutcome::AssetChanged) => {
                    debug!(post_id = %current.id(), "post changed under a concurrent edit");
                    return Err(concurrent_edit());
                }
                Err(PostRepositoryError::SlugTaken { slug }) if title_changed => {
                    debug!(%slug, attempt, "slug taken; trying next suffix");
                }
                Err(err) => return Err(map_post_error(err)),
            }
        }
        Err(slug_exhausted(request.title()))
    }

    /// Pair each post with its author, dropping posts the author does not
    /// list. Authors are looked up once per distinct owner.
    async fn visible(&self, posts: Vec<Post>) -> Result<Vec<PostView>, Error> {
        let mut authors: HashMap<UserId, Option<User>> = HashMap::new();
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            if !authors.contains_key(post.owner()) {
                let owner = self.find_user(post.owner()).await?;
                authors.insert(post.owner().clone(), owner);
            }
            let author = authors
                .get(post.owner())
                .and_then(Option::as_ref)
                .filter(|owner| owner.owns(post.id()))
                .map(PublicUser::from);
            match author {
                Some(author) => views.push(PostView::new(post, author)),
                None => debug!(post_id = %post.id(), "hiding post not listed by its owner"),
            }
        }
        Ok(views)
    }
}

#[async_trait]
impl<U, P, A> PostCommand for PostLifecycleService<U, P, A>
where
    U: UserRepository,
    P: PostRepository,
    A: AssetStore,
{
    async fn create(&self, request: &CreatePostRequest) -> Result<Post, Error> {
        let Some(upload) = request.asset() else {
            return Err(Error::invalid_request("an image is required")
                .with_details(json!({ "field": "image", "code": "missing_asset" })));
        };
        // Reject titles without slug characters before touching storage.
        PostSlug::from_title(request.title(), 1).map_err(|e| map_validation_error(&e))?;

        if self.find_user(request.owner()).await?.is_none() {
            return Err(Error::not_found("owner not found"));
        }

        let handle = self.assets.store(upload).await?;
        let id = PostId::random();
        let created_at = self.clock.utc();
        let inserted = self
            .insert_with_free_slug(request.title(), |slug| {
                Post::new(NewPost {
                    id: id.clone(),
                    slug,
                    title: request.title().clone(),
                    body: request.body().clone(),
                    asset: handle.clone(),
                    owner: request.owner().clone(),
                    created_at,
                })
            })
            .await;
        let post = match inserted {
            Ok(post) => post,
            Err(err) => {
                self.assets.discard(&handle).await;
                return Err(err);
            }
        };

        self.append_owner_entry(&post).await?;
        info!(post_id = %post.id(), slug = %post.slug(), owner = %post.owner(), "post created");
        Ok(post)
    }

    async fn update(&self, request: &UpdatePostRequest) -> Result<Post, Error> {
        let current = self.find_post(request.post_id()).await?;
        if current.owner() != request.editor() {
            return Err(not_owner());
        }
        PostSlug::from_title(request.title(), 1).map_err(|e| map_validation_error(&e))?;

        let post = match request.asset() {
            Some(upload) => {
                self.assets
                    .replace_with(current.asset(), upload, |handle| {
                        self.persist_revision(&current, request, handle)
                    })
                    .await?
            }
            None => {
                self.persist_revision(&current, request, current.asset().clone())
                    .await?
            }
        };

        info!(post_id = %post.id(), slug = %post.slug(), "post updated");
        Ok(post)
    }

    async fn delete(&self, post_id: &PostId, requester: &UserId) -> Result<(), Error> {
        let post = self.find_post(post_id).await?;
        if post.owner() != requester {
            return Err(not_owner());
        }

        let listed = self
            .users
            .remove_owned_post(post.owner(), post.id())
            .await
            .map_err(map_user_error)?;
        if !listed {
            warn!(post_id = %post.id(), "deleting post that its owner did not list");
        }

        let removed = self.posts.delete(post.id()).await.map_err(|err| {
            error!(
                post_id = %post.id(),
                error = %err,
                "post unlisted but record deletion failed; post stays hidden"
            );
            map_post_error(err)
        })?;
        let Some(removed) = removed else {
            // A concurrent delete won the race and owns the asset cleanup.
            return Err(post_not_found());
        };

        self.assets.discard(removed.asset()).await;
        info!(post_id = %removed.id(), owner = %removed.owner(), "post deleted");
        Ok(())
    }
}

#[async_trait]
impl<U, P, A> PostQuery for PostLifecycleService<U, P, A>
where
    U: UserRepository,
    P: PostRepository,
    A: AssetStore,
{
    async fn get_by_slug(&self, slug: &str) -> Result<PostView, Error> {
        let Ok(slug) = PostSlug::parse(slug) else {
            return Err(post_not_found());
        };
        let post = self
            .posts
            .find_by_slug(&slug)
            .await
            .map_err(map_post_error)?
            .ok_or_else(post_not_found)?;
        self.visible(vec![post])
            .await?
            .into_iter()
            .next()
            .ok_or_else(post_not_found)
    }

    async fn list_owned(&self, owner: &UserId) -> Result<Vec<Post>, Error> {
        let Some(user) = self.find_user(owner).await? else {
            return Err(Error::not_found("user not found"));
        };
        let mut posts = self
            .posts
            .find_many(user.owned_posts())
            .await
            .map_err(map_post_error)?;
        posts.retain(|post| post.owner() == owner);
        posts.sort_by(by_recency);
        Ok(posts)
    }

    async fn get_for_edit(&self, post_id: &PostId, requester: &UserId) -> Result<Post, Error> {
        let post = self.find_post(post_id).await?;
        if post.owner() != requester {
            return Err(not_owner());
        }
        let listed = self
            .find_user(requester)
            .await?
            .is_some_and(|user| user.owns(post.id()));
        if !listed {
            return Err(post_not_found());
        }
        Ok(post)
    }

    async fn list_recent(&self, page: i64) -> Result<Page<PostView>, Error> {
        let count = self.posts.count().await.map_err(map_post_error)?;
        let window = paginate(count, page, self.page_size);
        let posts = if window.usable_offset().is_some() {
            self.posts
                .list_recent(window.offset, window.limit)
                .await
                .map_err(map_post_error)?
        } else {
            Vec::new()
        };
        Ok(Page::new(self.visible(posts).await?, window))
    }
}

#[cfg(test)]
#[path = "post_service_tests.rs"]
mod tests;
