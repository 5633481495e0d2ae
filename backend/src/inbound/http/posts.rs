//! Post HTTP handlers.
//!
//! ```text
//! GET  /?page=1
//! GET  /post/{slug}
//! GET  /my-posts
//! GET  /create-post
//! POST /create-post {"title":"Hello World","body":"...","image":{"filename":"a.png","data":"<base64>"}}
//! GET  /edit-post/{id}
//! POST /update-post/{id}
//! POST /delete-post/{id}
//! ```
//!
//! Everything except the feed and single-post reads requires a session;
//! anonymous callers are redirected to `/login`.

use actix_web::{HttpResponse, get, post, web};
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AssetUpload, CreatePostRequest, Error, Post, PostBody, PostTitle, PostView,
    UpdatePostRequest, User,
};
use crate::inbound::http::auth::see_other;
use crate::inbound::http::error::{ApiResult, GatedResult};
use crate::inbound::http::schemas::PostPageSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{decode_upload, parse_post_id, post_validation_error};

const MY_POSTS: &str = "/my-posts";

/// Image attached to a post, as base64.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageBody {
    /// Client file name; only its extension is kept.
    #[schema(example = "photo.png")]
    pub filename: String,
    /// Standard base64 of the file content.
    pub data: String,
}

/// Body for `POST /create-post` and `POST /update-post/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostFormBody {
    #[schema(example = "Hello World")]
    pub title: String,
    pub body: String,
    /// Required on create; on update, omit to keep the current image.
    pub image: Option<ImageBody>,
}

/// Query string for the home feed.
#[derive(Debug, Deserialize, IntoParams)]
pub struct FeedQuery {
    /// One-based page number; values below one read as one.
    pub page: Option<i64>,
}

/// A single post with its author and whether the caller may edit it.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDetailResponse {
    #[serde(flatten)]
    pub view: PostView,
    pub editable: bool,
}

struct PostFields {
    title: PostTitle,
    body: PostBody,
    image: Option<AssetUpload>,
}

fn parse_form(form: PostFormBody) -> Result<PostFields, Error> {
    let title = PostTitle::new(&form.title).map_err(post_validation_error)?;
    let body = PostBody::new(form.body).map_err(post_validation_error)?;
    let image = form
        .image
        .map(|image| decode_upload(&image.filename, &image.data))
        .transpose()?;
    Ok(PostFields { title, body, image })
}

async fn signed_in(state: &HttpState, session: &SessionContext) -> GatedResult<User> {
    state
        .login
        .require_authenticated(session.id().as_ref())
        .await
}

/// Home feed, most recent first.
#[utoipa::path(
    get,
    path = "/",
    params(FeedQuery),
    responses(
        (status = 200, description = "Feed page", body = PostPageSchema),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["posts"],
    operation_id = "feed"
)]
#[get("/")]
pub async fn feed(
    state: web::Data<HttpState>,
    query: web::Query<FeedQuery>,
) -> ApiResult<web::Json<Page<PostView>>> {
    let page = query.page.unwrap_or(1).max(1);
    let listing = state.posts_query.list_recent(page).await?;
    Ok(web::Json(listing))
}

/// A single post by slug.
#[utoipa::path(
    get,
    path = "/post/{slug}",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = PostDetailResponse),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/post/{slug}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    slug: web::Path<String>,
) -> ApiResult<web::Json<PostDetailResponse>> {
    let view = state.posts_query.get_by_slug(slug.as_str()).await?;
    let editable = state
        .login
        .is_owner(session.id().as_ref(), view.post().owner())
        .await?;
    Ok(web::Json(PostDetailResponse { view, editable }))
}

/// Posts owned by the signed-in user.
#[utoipa::path(
    get,
    path = "/my-posts",
    responses(
        (status = 200, description = "Owned posts, most recent first", body = [Post]),
        (status = 303, description = "Not signed in; redirect to /login")
    ),
    tags = ["posts"],
    operation_id = "myPosts",
    security(("SessionCookie" = []))
)]
#[get("/my-posts")]
pub async fn my_posts(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> GatedResult<web::Json<Vec<Post>>> {
    let user = signed_in(&state, &session).await?;
    let posts = state.posts_query.list_owned(user.id()).await?;
    Ok(web::Json(posts))
}

/// Post creation page entry point.
#[utoipa::path(
    get,
    path = "/create-post",
    responses(
        (status = 204, description = "Caller may create posts"),
        (status = 303, description = "Not signed in; redirect to /login")
    ),
    tags = ["posts"],
    operation_id = "createPostPage",
    security(("SessionCookie" = []))
)]
#[get("/create-post")]
pub async fn create_post_page(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> GatedResult<HttpResponse> {
    signed_in(&state, &session).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Publish a post owned by the signed-in user.
#[utoipa::path(
    post,
    path = "/create-post",
    request_body = PostFormBody,
    responses(
        (status = 201, description = "Post created", body = Post),
        (status = 303, description = "Not signed in; redirect to /login"),
        (status = 400, description = "Invalid request or missing image", body = Error),
        (status = 500, description = "Created but needs reconciliation", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost",
    security(("SessionCookie" = []))
)]
#[post("/create-post")]
pub async fn create_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PostFormBody>,
) -> GatedResult<HttpResponse> {
    let user = signed_in(&state, &session).await?;
    let fields = parse_form(payload.into_inner())?;
    let request = CreatePostRequest::new(user.id().clone(), fields.title, fields.body, fields.image);
    let post = state.posts.create(&request).await?;
    Ok(HttpResponse::Created().json(post))
}

/// A post loaded for editing by its owner.
#[utoipa::path(
    get,
    path = "/edit-post/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post", body = Post),
        (status = 303, description = "Not signed in; redirect to /login"),
        (status = 403, description = "Caller does not own the post", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "editPostPage",
    security(("SessionCookie" = []))
)]
#[get("/edit-post/{id}")]
pub async fn edit_post_page(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<String>,
) -> GatedResult<web::Json<Post>> {
    let user = signed_in(&state, &session).await?;
    let post_id = parse_post_id(id.as_str())?;
    let post = state.posts_query.get_for_edit(&post_id, user.id()).await?;
    Ok(web::Json(post))
}

/// Edit a post. Without an image the current one is kept.
#[utoipa::path(
    post,
    path = "/update-post/{id}",
    params(("id" = String, Path, description = "Post id")),
    request_body = PostFormBody,
    responses(
        (status = 200, description = "Post updated", body = Post),
        (status = 303, description = "Not signed in; redirect to /login"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 403, description = "Caller does not own the post", body = Error),
        (status = 404, description = "No such post", body = Error),
        (status = 409, description = "Post changed concurrently or no free slug", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost",
    security(("SessionCookie" = []))
)]
#[post("/update-post/{id}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<String>,
    payload: web::Json<PostFormBody>,
) -> GatedResult<web::Json<Post>> {
    let user = signed_in(&state, &session).await?;
    let post_id = parse_post_id(id.as_str())?;
    let fields = parse_form(payload.into_inner())?;
    let request = UpdatePostRequest::new(
        post_id,
        user.id().clone(),
        fields.title,
        fields.body,
        fields.image,
    );
    let post = state.posts.update(&request).await?;
    Ok(web::Json(post))
}

/// Delete a post and its image.
#[utoipa::path(
    post,
    path = "/delete-post/{id}",
    params(("id" = String, Path, description = "Post id")),
    responses(
        (status = 303, description = "Deleted; redirect to /my-posts"),
        (status = 403, description = "Caller does not own the post", body = Error),
        (status = 404, description = "No such post", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost",
    security(("SessionCookie" = []))
)]
#[post("/delete-post/{id}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    session: SessionContext,
    id: web::Path<String>,
) -> GatedResult<HttpResponse> {
    let user = signed_in(&state, &session).await?;
    let post_id = parse_post_id(id.as_str())?;
    state.posts.delete(&post_id, user.id()).await?;
    Ok(see_other(MY_POSTS))
}

#[cfg(test)]
#[path = "posts_tests.rs"]
mod tests;
