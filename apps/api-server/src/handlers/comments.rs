//! Direct comment access by id.

use actix_web::{HttpResponse, web};
use uuid::Uuid;
use validator::Validate;

use blog_core::DomainError;
use blog_core::domain::Comment;
use blog_shared::dto::{CommentRequest, PatchCommentRequest};

use super::posts::{comment_shape, load_post};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

async fn load_comment(state: &AppState, id: Uuid) -> AppResult<Comment> {
    state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("comment", id).into())
}

async fn respond(state: &AppState, comment: Comment) -> AppResult<HttpResponse> {
    let post = load_post(state, comment.post_id).await?;
    Ok(HttpResponse::Ok().json(comment_shape(comment, &post.name)))
}

/// GET /api/comments/{id}
pub async fn get_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = load_comment(&state, path.into_inner()).await?;
    respond(&state, comment).await
}

/// PUT /api/comments/{id}
pub async fn update_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CommentRequest>,
) -> AppResult<HttpResponse> {
    let mut comment = load_comment(&state, path.into_inner()).await?;
    identity.actor().authorize(&comment)?;

    let req = body.into_inner();
    req.validate()?;

    comment.revise(req.content);
    let comment = state.comments.update(comment).await?;

    tracing::info!(comment_id = %comment.id, "Comment updated");
    respond(&state, comment).await
}

/// PATCH /api/comments/{id}
pub async fn patch_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PatchCommentRequest>,
) -> AppResult<HttpResponse> {
    let mut comment = load_comment(&state, path.into_inner()).await?;
    identity.actor().authorize(&comment)?;

    let req = body.into_inner();
    req.validate()?;

    let Some(content) = req.content else {
        return respond(&state, comment).await;
    };

    comment.revise(content);
    let comment = state.comments.update(comment).await?;

    tracing::info!(comment_id = %comment.id, "Comment updated");
    respond(&state, comment).await
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    identity: Identity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let comment = load_comment(&state, path.into_inner()).await?;
    identity.actor().authorize(&comment)?;

    state.comments.delete(comment.id).await?;

    tracing::info!(comment_id = %comment.id, user_id = %identity.user_id, "Comment deleted");
    Ok(HttpResponse::NoContent().finish())
}
