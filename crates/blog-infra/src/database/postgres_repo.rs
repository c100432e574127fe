//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{Comment, LikeToggle, Post, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    CommentRepository, Page, PageRequest, PostRepository, TagRepository, UserRepository,
};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = match email.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) if local.len() > 1 => format!("{}***@{}", first, domain),
                _ => format!("***@{}", domain),
            },
            None => "***".to_string(),
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

/// Link a post to each distinct tag id. No-op for an empty list.
async fn insert_tag_links<C>(conn: &C, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>
where
    C: ConnectionTrait,
{
    let mut unique: Vec<Uuid> = Vec::with_capacity(tag_ids.len());
    for tag_id in tag_ids {
        if !unique.contains(tag_id) {
            unique.push(*tag_id);
        }
    }
    if unique.is_empty() {
        return Ok(());
    }

    let links = unique.into_iter().map(|tag_id| post_tag::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(tag_id),
    });
    PostTagEntity::insert_many(links)
        .exec_without_returning(conn)
        .await
        .map_err(map_db_err)?;
    Ok(())
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<Post>, RepoError> {
        let paginator = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .paginate(&self.db, page.page_size);

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let items = paginator
            .fetch_page(page.page - 1)
            .await
            .map_err(map_db_err)?;

        Ok(Page {
            items: items.into_iter().map(Into::into).collect(),
            total,
        })
    }

    async fn random(&self) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by(Expr::cust("RANDOM()"), Order::Asc)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn top_by_likes(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let result = PostEntity::find()
            .order_by_desc(post::Column::LikeCount)
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_tag(&self, tag_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let post_ids: Vec<Uuid> = PostTagEntity::find()
            .filter(post_tag::Column::TagId.eq(tag_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|link| link.post_id)
            .collect();

        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let result = PostEntity::find()
            .filter(post::Column::Id.is_in(post_ids))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn tag_names(&self, post_id: Uuid) -> Result<Vec<String>, RepoError> {
        let tag_ids: Vec<Uuid> = PostTagEntity::find()
            .filter(post_tag::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|link| link.tag_id)
            .collect();

        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let tags = TagEntity::find()
            .filter(tag::Column::Id.is_in(tag_ids))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(tags.into_iter().map(|t| t.name).collect())
    }

    async fn create_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = post::ActiveModel::from(post)
            .insert(&txn)
            .await
            .map_err(map_db_err)?;
        insert_tag_links(&txn, model.id, tag_ids).await?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(post_id = %model.id, tags = tag_ids.len(), "Inserted post");
        Ok(model.into())
    }

    async fn update_with_tags(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        let model = post::ActiveModel::from(post)
            .update(&txn)
            .await
            .map_err(map_db_err)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(model.id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;
        insert_tag_links(&txn, model.id, tag_ids).await?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(post_id = %model.id, tags = tag_ids.len(), "Updated post");
        Ok(model.into())
    }

    async fn liker_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(likes.into_iter().map(|l| l.user_id).collect())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeToggle, RepoError> {
        let txn = self.db.begin().await.map_err(map_db_err)?;

        // Lock the post row so concurrent toggles on it serialize.
        PostEntity::find_by_id(post_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let existing = PostLikeEntity::find_by_id((post_id, user_id))
            .one(&txn)
            .await
            .map_err(map_db_err)?;

        let toggle = LikeToggle::from_membership(existing.is_some());
        match toggle {
            LikeToggle::Liked => {
                PostLikeEntity::insert(post_like::ActiveModel {
                    post_id: Set(post_id),
                    user_id: Set(user_id),
                })
                .exec_without_returning(&txn)
                .await
                .map_err(map_db_err)?;
            }
            LikeToggle::Unliked => {
                PostLikeEntity::delete_by_id((post_id, user_id))
                    .exec(&txn)
                    .await
                    .map_err(map_db_err)?;
            }
        }

        let like_count = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .count(&txn)
            .await
            .map_err(map_db_err)?;

        PostEntity::update_many()
            .col_expr(
                post::Column::LikeCount,
                Expr::value(i32::try_from(like_count).unwrap_or(i32::MAX)),
            )
            .filter(post::Column::Id.eq(post_id))
            .exec(&txn)
            .await
            .map_err(map_db_err)?;

        txn.commit().await.map_err(map_db_err)?;

        tracing::debug!(%post_id, %user_id, ?toggle, like_count, "Toggled like");
        Ok(toggle)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError> {
        if let Some(existing) = self.find_by_name(name).await? {
            return Ok(existing);
        }

        // A concurrent insert of the same name is absorbed by the unique index.
        let candidate: tag::ActiveModel = Tag::new(name).into();
        TagEntity::insert(candidate)
            .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(tag = %name, "Created tag");

        self.find_by_name(name).await?.ok_or(RepoError::NotFound)
    }
}
