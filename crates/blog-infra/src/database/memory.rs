//! In-memory store - used when no database is configured, and in tests.
//!
//! One `InMemoryStore` implements every repository port over a shared set
//! of tables, so cascades behave as they do with foreign keys.
//! Note: Data is lost on process restart.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use rand::seq::SliceRandom;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Comment, LikeToggle, Post, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CommentRepository, Page, PageRequest, PostRepository, TagRepository,
    UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    tags: HashMap<Uuid, Tag>,
    post_tags: HashMap<Uuid, BTreeSet<Uuid>>,
    post_likes: HashMap<Uuid, BTreeSet<Uuid>>,
}

impl Tables {
    fn sorted_newest_first(mut posts: Vec<Post>) -> Vec<Post> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        posts
    }
}

/// In-memory implementation of all repositories, guarded by an async RwLock.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.users.get_mut(&user.id).ok_or(RepoError::NotFound)?;
        *slot = user.clone();
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;

        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.user_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            remove_post(&mut tables, post_id);
        }
        tables.comments.retain(|_, c| c.writer_id != id);
        for likers in tables.post_likes.values_mut() {
            likers.remove(&id);
        }
        recount_likes(&mut tables);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }
}

fn remove_post(tables: &mut Tables, post_id: Uuid) -> Option<Post> {
    let post = tables.posts.remove(&post_id)?;
    tables.comments.retain(|_, c| c.post_id != post_id);
    tables.post_tags.remove(&post_id);
    tables.post_likes.remove(&post_id);
    Some(post)
}

/// Resolve tag ids into a link set, rejecting ids with no tag row.
fn tag_set(tables: &Tables, tag_ids: &[Uuid]) -> Result<BTreeSet<Uuid>, RepoError> {
    match tag_ids.iter().find(|id| !tables.tags.contains_key(*id)) {
        Some(missing) => Err(RepoError::Constraint(format!("Unknown tag {}", missing))),
        None => Ok(tag_ids.iter().copied().collect()),
    }
}

fn recount_likes(tables: &mut Tables) {
    let Tables {
        posts, post_likes, ..
    } = tables;
    for post in posts.values_mut() {
        post.like_count = post_likes.get(&post.id).map_or(0, |s| s.len() as u32);
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.tables.read().await.posts.get(&id).cloned())
    }

    async fn create(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&post.user_id) {
            return Err(RepoError::Constraint("Unknown post owner".to_string()));
        }
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        post.like_count = 0;
        tables.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, mut post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables.posts.get_mut(&post.id).ok_or(RepoError::NotFound)?;

        // The counter belongs to the like toggle.
        post.like_count = slot.like_count;
        *slot = post.clone();
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        remove_post(&mut tables, id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let tables = self.tables.read().await;
        let all = Tables::sorted_newest_first(tables.posts.values().cloned().collect());
        let total = all.len() as u64;

        let items = all
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(Page { items, total })
    }

    async fn random(&self) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts: Vec<&Post> = tables.posts.values().collect();
        Ok(posts.choose(&mut rand::thread_rng()).map(|p| (*p).clone()))
    }

    async fn top_by_likes(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let mut posts = Tables::sorted_newest_first(tables.posts.values().cloned().collect());
        // Stable sort keeps newest-first among equal counts.
        posts.sort_by(|a, b| b.like_count.cmp(&a.like_count));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn find_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables
            .post_tags
            .iter()
            .filter(|(_, tags)| tags.contains(&tag_id))
            .filter_map(|(post_id, _)| tables.posts.get(post_id).cloned())
            .collect();
        Ok(Tables::sorted_newest_first(posts))
    }

    async fn tag_names(&self, post_id: Uuid) -> Result<Vec<String>, RepoError> {
        let tables = self.tables.read().await;
        let mut names: Vec<String> = tables
            .post_tags
            .get(&post_id)
            .into_iter()
            .flatten()
            .filter_map(|tag_id| tables.tags.get(tag_id).map(|t| t.name.clone()))
            .collect();
        names.sort();
        Ok(names)
    }

    async fn create_with_tags(
        &self,
        mut post: Post,
        tag_ids: &[Uuid],
    ) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&post.user_id) {
            return Err(RepoError::Constraint("Unknown post owner".to_string()));
        }
        if tables.posts.contains_key(&post.id) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        let links = tag_set(&tables, tag_ids)?;

        post.like_count = 0;
        tables.posts.insert(post.id, post.clone());
        tables.post_tags.insert(post.id, links);
        Ok(post)
    }

    async fn update_with_tags(
        &self,
        mut post: Post,
        tag_ids: &[Uuid],
    ) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;

        let stored_likes = tables
            .posts
            .get(&post.id)
            .map(|p| p.like_count)
            .ok_or(RepoError::NotFound)?;
        let links = tag_set(&tables, tag_ids)?;

        post.like_count = stored_likes;
        tables.posts.insert(post.id, post.clone());
        tables.post_tags.insert(post.id, links);
        Ok(post)
    }

    async fn liker_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .post_likes
            .get(&post_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.posts.contains_key(&post_id) {
            return Err(RepoError::NotFound);
        }

        let likers = tables.post_likes.entry(post_id).or_default();
        let toggle = LikeToggle::from_membership(likers.contains(&user_id));
        if toggle.is_liked() {
            likers.insert(user_id);
        } else {
            likers.remove(&user_id);
        }
        let like_count = likers.len() as u32;

        if let Some(post) = tables.posts.get_mut(&post_id) {
            post.like_count = like_count;
        }
        Ok(toggle)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.tables.read().await.comments.get(&id).cloned())
    }

    async fn create(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;

        if !tables.posts.contains_key(&comment.post_id) {
            return Err(RepoError::Constraint("Unknown post".to_string()));
        }
        if !tables.users.contains_key(&comment.writer_id) {
            return Err(RepoError::Constraint("Unknown comment writer".to_string()));
        }
        tables.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn update(&self, comment: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        let slot = tables
            .comments
            .get_mut(&comment.id)
            .ok_or(RepoError::NotFound)?;
        *slot = comment.clone();
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(comments)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count() as u64)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.name == name).cloned())
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.tags.values().find(|t| t.name == name) {
            return Ok(existing.clone());
        }
        let tag = Tag::new(name);
        tables.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_user(users: &dyn UserRepository, name: &str) -> User {
        let user = User::new(name.into(), format!("{}@example.com", name), "hash".into());
        users.create(user).await.unwrap()
    }

    async fn seed_post(posts: &dyn PostRepository, owner: &User, content: &str) -> Post {
        let post = Post::new(owner.id, "title".into(), content.into(), None);
        posts.create(post).await.unwrap()
    }

    #[tokio::test]
    async fn test_toggle_like_twice_restores_state() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;
        let fan = seed_user(&store, "fan").await;
        let post = seed_post(posts, &owner, "hello").await;

        assert_eq!(
            posts.toggle_like(post.id, fan.id).await.unwrap(),
            LikeToggle::Liked
        );
        let liked = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(liked.like_count, 1);
        assert_eq!(posts.liker_ids(post.id).await.unwrap(), vec![fan.id]);

        assert_eq!(
            posts.toggle_like(post.id, fan.id).await.unwrap(),
            LikeToggle::Unliked
        );
        let restored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(restored.like_count, 0);
        assert!(posts.liker_ids(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_like_on_missing_post() {
        let store = InMemoryStore::new();
        let err = store
            .toggle_like(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_update_does_not_overwrite_like_count() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;
        let post = seed_post(posts, &owner, "hello").await;

        posts.toggle_like(post.id, owner.id).await.unwrap();

        let mut stale = post.clone();
        stale.revise(None, Some("edited".into()), None);
        let saved = posts.update(stale).await.unwrap();

        assert_eq!(saved.like_count, 1);
        assert_eq!(saved.content, "edited");
    }

    #[tokio::test]
    async fn test_delete_post_cascades() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let comments: &dyn CommentRepository = &store;
        let tags: &dyn TagRepository = &store;

        let owner = seed_user(&store, "owner").await;
        let tag = tags.get_or_create("rust").await.unwrap();
        let post = Post::new(owner.id, "t".into(), "#rust".into(), None);
        let post = posts.create_with_tags(post, &[tag.id]).await.unwrap();
        posts.toggle_like(post.id, owner.id).await.unwrap();
        comments
            .create(Comment::new(post.id, owner.id, "hi".into()))
            .await
            .unwrap();

        posts.delete(post.id).await.unwrap();

        assert!(posts.find_by_id(post.id).await.unwrap().is_none());
        assert_eq!(comments.count_by_post(post.id).await.unwrap(), 0);
        assert!(posts.tag_names(post.id).await.unwrap().is_empty());
        assert!(posts.liker_ids(post.id).await.unwrap().is_empty());
        assert!(posts.find_by_tag(tag.id).await.unwrap().is_empty());
        // Tags outlive their posts.
        assert!(tags.find_by_name("rust").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_with_tags_overwrites_previous_set() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;

        let a = store.get_or_create("a").await.unwrap();
        let b = store.get_or_create("b").await.unwrap();
        let c = store.get_or_create("c").await.unwrap();

        let post = Post::new(owner.id, "title".into(), "#a #b".into(), None);
        let mut post = posts.create_with_tags(post, &[a.id, b.id]).await.unwrap();
        posts.toggle_like(post.id, owner.id).await.unwrap();

        post.revise(None, Some("#c".into()), None);
        let saved = posts.update_with_tags(post.clone(), &[c.id]).await.unwrap();

        assert_eq!(saved.like_count, 1);
        assert_eq!(posts.tag_names(post.id).await.unwrap(), vec!["c".to_string()]);
        assert!(posts.find_by_tag(a.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_tag_leaves_nothing_behind() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;
        let post = Post::new(owner.id, "title".into(), "#ghost".into(), None);

        let err = posts
            .create_with_tags(post.clone(), &[Uuid::new_v4()])
            .await
            .unwrap_err();

        assert!(matches!(err, RepoError::Constraint(_)));
        assert!(posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_with_tags_on_missing_post() {
        let store = InMemoryStore::new();
        let post = Post::new(Uuid::new_v4(), "title".into(), "body".into(), None);
        let err = store.update_with_tags(post, &[]).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn test_huge_page_is_empty() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;
        seed_post(posts, &owner, "only").await;

        let page = posts.list(PageRequest::new(u64::MAX, 10)).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_existing_tag() {
        let store = InMemoryStore::new();
        let first = store.get_or_create("daily").await.unwrap();
        let second = store.get_or_create("daily").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_top_by_likes_is_sorted_and_bounded() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;
        let mut fans = Vec::new();
        for i in 0..3 {
            fans.push(seed_user(&store, &format!("fan{}", i)).await);
        }

        let mut seeded = Vec::new();
        for i in 0..4 {
            seeded.push(seed_post(posts, &owner, &format!("post {}", i)).await);
        }
        // post i receives i likes
        for (i, post) in seeded.iter().enumerate() {
            for fan in fans.iter().take(i) {
                posts.toggle_like(post.id, fan.id).await.unwrap();
            }
        }

        let top = posts.top_by_likes(3).await.unwrap();
        let counts: Vec<u32> = top.iter().map(|p| p.like_count).collect();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_list_paginates() {
        let store = InMemoryStore::new();
        let posts: &dyn PostRepository = &store;
        let owner = seed_user(&store, "owner").await;
        for i in 0..5 {
            seed_post(posts, &owner, &format!("post {}", i)).await;
        }

        let first = posts.list(PageRequest::new(1, 2)).await.unwrap();
        let last = posts.list(PageRequest::new(3, 2)).await.unwrap();

        assert_eq!(first.total, 5);
        assert_eq!(first.items.len(), 2);
        assert_eq!(last.items.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_constraint_violation() {
        let store = InMemoryStore::new();
        let users: &dyn UserRepository = &store;
        seed_user(users, "mina").await;

        let dup = User::new("other".into(), "mina@example.com".into(), "hash".into());
        let err = users.create(dup).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }
}
