//! Tag lookup.

use actix_web::{HttpResponse, web};

use blog_core::DomainError;

use super::posts::full_shapes;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/tags/{tag_name}
///
/// Every post carrying the tag, full shape. The name is matched exactly.
pub async fn posts_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let name = path.into_inner();
    let tag = state
        .tags
        .find_by_name(&name)
        .await?
        .ok_or_else(|| DomainError::not_found("tag", &name))?;

    let posts = state.posts.find_by_tag(tag.id).await?;
    Ok(HttpResponse::Ok().json(full_shapes(&state, posts).await?))
}
