use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, LikeToggle, Post, Tag, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. Fails with `NotFound` if it does not exist.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// One page of a listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub total: u64,
}

/// 1-based page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Largest row offset a selector may produce. Postgres `OFFSET` is a signed 64-bit value.
    pub const MAX_OFFSET: u64 = i64::MAX as u64;

    /// Build a selector, clamping the size to `1..=MAX_PAGE_SIZE` and the page
    /// to `1..` with an offset no larger than `MAX_OFFSET`.
    pub fn new(page: u64, page_size: u64) -> Self {
        let page_size = page_size.clamp(1, Self::MAX_PAGE_SIZE);
        let last_page = Self::MAX_OFFSET / page_size + 1;
        Self {
            page: page.clamp(1, last_page),
            page_size,
        }
    }

    /// Number of items skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.page_size
    }
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// Deleting a post also removes its comments, tag links and likes.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Newest first.
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepoError>;

    /// An arbitrary post, `None` when there are no posts.
    async fn random(&self) -> Result<Option<Post>, RepoError>;

    /// Posts ordered by descending `like_count`, at most `limit` of them.
    async fn top_by_likes(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Posts linked to the given tag, newest first.
    async fn find_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError>;

    /// Names of the tags linked to a post.
    async fn tag_names(&self, post_id: Uuid) -> Result<Vec<String>, RepoError>;

    /// Insert a post linked to exactly `tag_ids`. Either both land or neither does.
    async fn create_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError>;

    /// Overwrite a post and make `tag_ids` its complete tag set in one unit.
    /// `like_count` is left as stored.
    async fn update_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError>;

    /// IDs of the users who liked a post.
    async fn liker_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    /// Add or remove `user_id` from the post's like set and rewrite
    /// `like_count` to the resulting set size.
    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments of a post, oldest first.
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}

/// Tag repository. Tags are never deleted.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError>;

    /// Return the tag with this name, creating it first if needed.
    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page, PageRequest { page: 1, page_size: 1 });

        let page = PageRequest::new(3, 1_000);
        assert_eq!(page.page_size, PageRequest::MAX_PAGE_SIZE);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        for size in [1, 7, PageRequest::MAX_PAGE_SIZE] {
            let page = PageRequest::new(u64::MAX, size);
            assert!(page.offset() <= PageRequest::MAX_OFFSET);
            // The paginator computes `(page - 1) * size` and `page * size`.
            assert!(page.page.checked_mul(page.page_size).is_some());
        }
    }
}
