#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::database::entity::{comment, post, post_like, tag};
    use crate::database::postgres_repo::{
        PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    };
    use blog_core::domain::{LikeToggle, Post, Tag};
    use blog_core::error::RepoError;
    use blog_core::ports::{BaseRepository, CommentRepository, PostRepository, TagRepository};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};

    fn post_model(id: uuid::Uuid, like_count: i32) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            user_id: uuid::Uuid::new_v4(),
            name: "Test Post".to_owned(),
            content: "Content #rust".to_owned(),
            image: None,
            like_count,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    /// Row shape read back by `PaginatorTrait::count`.
    fn count_row(n: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([("num_items".to_owned(), Value::BigInt(Some(n)))])
    }

    /// Every statement the connection ran, in order.
    fn logged_sql(db: DatabaseConnection) -> Vec<String> {
        db.into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    fn ran(sql: &[String], prefix: &str) -> bool {
        sql.iter().any(|stmt| stmt.starts_with(prefix))
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, 4)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.name, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.like_count, 4);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result = BaseRepository::<Post, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing_tag() {
        let tag_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![tag::Model {
                id: tag_id,
                name: "rust".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresTagRepository::new(db);

        let tag: Tag = repo.get_or_create("rust").await.unwrap();
        assert_eq!(tag.id, tag_id);
        assert_eq!(tag.name, "rust");
    }

    #[tokio::test]
    async fn test_find_comments_by_post() {
        let post_id = uuid::Uuid::new_v4();
        let now = chrono::Utc::now();
        let rows: Vec<comment::Model> = (0..2)
            .map(|i| comment::Model {
                id: uuid::Uuid::new_v4(),
                post_id,
                writer_id: uuid::Uuid::new_v4(),
                content: format!("comment {}", i),
                created_at: now.into(),
                updated_at: now.into(),
            })
            .collect();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows])
            .into_connection();

        let repo = PostgresCommentRepository::new(db);

        let comments = repo.find_by_post(post_id).await.unwrap();
        assert_eq!(comments.len(), 2);
        assert!(comments.iter().all(|c| c.post_id == post_id));
    }

    #[tokio::test]
    async fn test_toggle_like_adds_missing_like_and_recounts() {
        let post_id = uuid::Uuid::new_v4();
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, 0)]])
            .append_query_results(vec![Vec::<post_like::Model>::new()])
            .append_query_results(vec![vec![count_row(1)]])
            .append_exec_results(vec![exec(1), exec(1)])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let toggle = repo.toggle_like(post_id, user_id).await.unwrap();
        assert_eq!(toggle, LikeToggle::Liked);

        let sql = logged_sql(repo.db);
        assert!(sql.iter().any(|stmt| stmt.contains("FOR UPDATE")));
        assert!(ran(&sql, r#"INSERT INTO "post_likes""#));
        assert!(!ran(&sql, r#"DELETE FROM "post_likes""#));
        assert!(sql.iter().any(|stmt| stmt.contains("COUNT(*)")));
        assert!(ran(&sql, r#"UPDATE "posts" SET "like_count""#));
    }

    #[tokio::test]
    async fn test_toggle_like_removes_existing_like() {
        let post_id = uuid::Uuid::new_v4();
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, 1)]])
            .append_query_results(vec![vec![post_like::Model { post_id, user_id }]])
            .append_query_results(vec![vec![count_row(0)]])
            .append_exec_results(vec![exec(1), exec(1)])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let toggle = repo.toggle_like(post_id, user_id).await.unwrap();
        assert_eq!(toggle, LikeToggle::Unliked);

        let sql = logged_sql(repo.db);
        assert!(ran(&sql, r#"DELETE FROM "post_likes""#));
        assert!(!ran(&sql, r#"INSERT INTO "post_likes""#));
        assert!(ran(&sql, r#"UPDATE "posts" SET "like_count""#));
    }

    #[tokio::test]
    async fn test_toggle_like_on_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result = repo
            .toggle_like(uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_create_with_tags_links_distinct_tags() {
        let post = Post::new(uuid::Uuid::new_v4(), "t".into(), "#a #b".into(), None);
        let (a, b) = (uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post.id, 0)]])
            .append_exec_results(vec![exec(2)])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let saved = repo.create_with_tags(post.clone(), &[a, b, a]).await.unwrap();
        assert_eq!(saved.id, post.id);

        let sql = logged_sql(repo.db);
        assert!(ran(&sql, r#"INSERT INTO "posts""#));
        let links = sql
            .iter()
            .find(|stmt| stmt.starts_with(r#"INSERT INTO "post_tags""#))
            .unwrap();
        assert!(links.contains("($3, $4)"));
        assert!(!links.contains("$5"));
    }

    #[tokio::test]
    async fn test_update_with_tags_replaces_links_and_keeps_counter() {
        let mut post = Post::new(uuid::Uuid::new_v4(), "t".into(), "#old".into(), None);
        post.revise(None, Some("no tags now".into()), None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post.id, 7)]])
            .append_exec_results(vec![exec(1)])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let saved = repo.update_with_tags(post, &[]).await.unwrap();
        assert_eq!(saved.like_count, 7);

        let sql = logged_sql(repo.db);
        let update = sql
            .iter()
            .find(|stmt| stmt.starts_with(r#"UPDATE "posts""#))
            .unwrap();
        // RETURNING lists every column; only the SET list matters.
        let set_list = update.split(" WHERE ").next().unwrap();
        assert!(!set_list.contains("like_count"));
        assert!(ran(&sql, r#"DELETE FROM "post_tags""#));
        assert!(!ran(&sql, r#"INSERT INTO "post_tags""#));
    }

    #[tokio::test]
    async fn test_get_or_create_inserts_missing_tag() {
        let tag_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<tag::Model>::new()])
            .append_query_results(vec![vec![tag::Model {
                id: tag_id,
                name: "fresh".to_owned(),
            }]])
            .append_exec_results(vec![exec(1)])
            .into_connection();

        let repo = PostgresTagRepository::new(db);

        let tag = repo.get_or_create("fresh").await.unwrap();
        assert_eq!(tag.id, tag_id);

        let sql = logged_sql(repo.db);
        let insert = sql
            .iter()
            .find(|stmt| stmt.starts_with(r#"INSERT INTO "tags""#))
            .unwrap();
        assert!(insert.contains(r#"ON CONFLICT ("name") DO NOTHING"#));
    }
}
