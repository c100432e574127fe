//! Post handlers: CRUD, random pick, like toggle and the top three.

use actix_web::{HttpResponse, web};
use futures::future::try_join_all;
use uuid::Uuid;
use validator::Validate;

use blog_core::DomainError;
use blog_core::domain::{Comment, Post};
use blog_core::error::RepoError;
use blog_core::ports::PageRequest;
use blog_shared::PageResponse;
use blog_shared::dto::{
    CommentRequest, CommentResponse, ListQuery, PatchPostRequest, PostRequest, PostResponse,
    PostSummaryResponse,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const TOP_POSTS: u64 = 3;

pub(super) async fn load_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", id).into())
}

async fn username_of(state: &AppState, user_id: Uuid) -> AppResult<String> {
    Ok(state
        .users
        .find_by_id(user_id)
        .await?
        .map(|user| user.username)
        .unwrap_or_default())
}

pub(super) fn comment_shape(comment: Comment, post_title: &str) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post: post_title.to_string(),
        writer: comment.writer_id,
        content: comment.content,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

/// Assemble the full shape: author name, tags, likers and nested comments.
pub(super) async fn full_shape(state: &AppState, post: Post) -> AppResult<PostResponse> {
    let username = username_of(state, post.user_id).await?;
    let tag = state.posts.tag_names(post.id).await?;
    let like = state.posts.liker_ids(post.id).await?;
    let comments = state
        .comments
        .find_by_post(post.id)
        .await?
        .into_iter()
        .map(|c| comment_shape(c, &post.name))
        .collect();

    Ok(PostResponse {
        id: post.id,
        user: post.user_id,
        name: post.name,
        username,
        content: post.content,
        created_at: post.created_at,
        updated_at: post.updated_at,
        tag,
        like,
        like_count: post.like_count,
        image: post.image,
        comments,
    })
}

pub(super) async fn full_shapes(
    state: &AppState,
    posts: Vec<Post>,
) -> AppResult<Vec<PostResponse>> {
    try_join_all(posts.into_iter().map(|post| full_shape(state, post))).await
}

async fn summary_shape(state: &AppState, post: Post) -> AppResult<PostSummaryResponse> {
    let username = username_of(state, post.user_id).await?;
    let tag = state.posts.tag_names(post.id).await?;
    let comments_cnt = state.comments.count_by_post(post.id).await?;

    Ok(PostSummaryResponse {
        id: post.id,
        name: post.name,
        username,
        content: post.content,
        created_at: post.created_at,
        updated_at: post.updated_at,
        comments_cnt,
        tag,
        image: post.image,
        like_count: post.like_count,
    })
}

/// Tag ids for the given names, creating missing tags.
async fn resolve_tags(state: &AppState, names: &[String]) -> AppResult<Vec<Uuid>> {
    let mut tag_ids = Vec::with_capacity(names.len());
    for name in names {
        tag_ids.push(state.tags.get_or_create(name).await?.id);
    }
    Ok(tag_ids)
}

/// Persist an edited post together with the tags of its new body.
async fn save_revision(state: &AppState, post: Post) -> AppResult<HttpResponse> {
    let names = post.hashtags()?;
    let tag_ids = resolve_tags(state, &names).await?;
    let post = state.posts.update_with_tags(post, &tag_ids).await?;

    tracing::info!(post_id = %post.id, tags = names.len(), "Post updated");
    Ok(HttpResponse::Ok().json(full_shape(state, post).await?))
}

/// GET /api/posts
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(state.default_page_size),
    );
    let listing = state.posts.list(page).await?;

    let results = try_join_all(
        listing
            .items
            .into_iter()
            .map(|post| summary_shape(&state, post)),
    )
    .await?;

    Ok(HttpResponse::Ok().json(PageResponse {
        count: listing.total,
        page: page.page,
        page_size: page.page_size,
        results,
    }))
}

/// POST /api/posts
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = Post::new(identity.user_id, req.name, req.content, req.image);
    // Reject overlong hashtags before anything is written.
    let names = post.hashtags()?;

    let tag_ids = resolve_tags(&state, &names).await?;
    let post = state.posts.create_with_tags(post, &tag_ids).await?;

    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Post created");
    Ok(HttpResponse::Created().json(full_shape(&state, post).await?))
}

/// GET /api/posts/{id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(full_shape(&state, post).await?))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    identity.actor().authorize(&post)?;

    let req = body.into_inner();
    req.validate()?;

    post.revise(Some(req.name), Some(req.content), None);
    post.image = req.image;
    save_revision(&state, post).await
}

/// PATCH /api/posts/{id}
pub async fn patch_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PatchPostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    identity.actor().authorize(&post)?;

    let req = body.into_inner();
    req.validate()?;

    post.revise(req.name, req.content, req.image);
    save_revision(&state, post).await
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    identity.actor().authorize(&post)?;

    state.posts.delete(post.id).await?;

    tracing::info!(post_id = %post.id, user_id = %identity.user_id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/posts/mingi
pub async fn random_post(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .random()
        .await?
        .ok_or_else(|| AppError::NotFound("There are no posts yet".to_string()))?;

    Ok(HttpResponse::Ok().json(full_shape(&state, post).await?))
}

/// GET /api/posts/{id}/likes
pub async fn toggle_like(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let toggle = state
        .posts
        .toggle_like(post_id, identity.user_id)
        .await
        .map_err(|err| match err {
            RepoError::NotFound => {
                AppError::from(DomainError::not_found("post", post_id))
            }
            other => other.into(),
        })?;

    tracing::info!(
        post_id = %post_id,
        user_id = %identity.user_id,
        liked = toggle.is_liked(),
        "Like toggled"
    );

    let post = load_post(&state, post_id).await?;
    Ok(HttpResponse::Ok().json(full_shape(&state, post).await?))
}

/// GET /api/posts/likes_three
pub async fn top_three(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.top_by_likes(TOP_POSTS).await?;
    Ok(HttpResponse::Ok().json(full_shapes(&state, posts).await?))
}

/// GET /api/posts/{post_id}/comments
pub async fn list_comments(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    let comments: Vec<CommentResponse> = state
        .comments
        .find_by_post(post.id)
        .await?
        .into_iter()
        .map(|c| comment_shape(c, &post.name))
        .collect();

    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/posts/{post_id}/comments
pub async fn create_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    req.validate()?;

    let post = load_post(&state, path.into_inner()).await?;
    let comment = state
        .comments
        .create(Comment::new(post.id, identity.user_id, req.content))
        .await?;

    tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment created");
    Ok(HttpResponse::Created().json(comment_shape(comment, &post.name)))
}
