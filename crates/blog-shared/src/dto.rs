//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// ============================================================================
// AUTH
// ============================================================================

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, max = 150, message = "must be 1-150 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response containing a user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

// ============================================================================
// POSTS
// ============================================================================

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub content: String,
    #[validate(url(message = "must be a valid URL"))]
    pub image: Option<String>,
}

/// Body of `PATCH /posts/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PatchPostRequest {
    #[validate(length(min = 1, max = 50, message = "must be 1-50 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub content: Option<String>,
    #[validate(url(message = "must be a valid URL"))]
    pub image: Option<String>,
}

/// Full post shape: detail, create/update, random pick, like toggle, top three, tag lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Tag names.
    pub tag: Vec<String>,
    /// IDs of the users who liked the post.
    pub like: Vec<Uuid>,
    pub like_count: u32,
    pub image: Option<String>,
    pub comments: Vec<CommentResponse>,
}

/// Summary post shape used by the listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub comments_cnt: u64,
    pub tag: Vec<String>,
    pub image: Option<String>,
    pub like_count: u32,
}

/// `?page=&page_size=` on listings.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

// ============================================================================
// COMMENTS
// ============================================================================

/// Body of `POST /posts/{post_id}/comments` and `PUT /comments/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub content: String,
}

/// Body of `PATCH /comments/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct PatchCommentRequest {
    #[validate(length(min = 1, max = 200, message = "must be 1-200 characters"))]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    /// Title of the parent post.
    pub post: String,
    pub writer: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
