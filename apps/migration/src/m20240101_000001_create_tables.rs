use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsSuperuser,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    UserId,
    Name,
    Content,
    Image,
    LikeCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum PostTags {
    Table,
    PostId,
    TagId,
}

#[derive(DeriveIden)]
enum PostLikes {
    Table,
    PostId,
    UserId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    PostId,
    WriterId,
    Content,
    CreatedAt,
    UpdatedAt,
}

fn timestamps(table: &mut TableCreateStatement, created: impl IntoIden, updated: impl IntoIden) {
    table
        .col(
            ColumnDef::new(created)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .col(
            ColumnDef::new(updated)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        );
}

fn cascade(name: &str) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .on_delete(ForeignKeyAction::Cascade)
        .on_update(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut users = Table::create();
        users
            .table(Users::Table)
            .if_not_exists()
            .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
            .col(
                ColumnDef::new(Users::Username)
                    .string_len(150)
                    .not_null()
                    .unique_key(),
            )
            .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
            .col(ColumnDef::new(Users::PasswordHash).string().not_null())
            .col(
                ColumnDef::new(Users::IsSuperuser)
                    .boolean()
                    .not_null()
                    .default(false),
            );
        timestamps(&mut users, Users::CreatedAt, Users::UpdatedAt);
        manager.create_table(users).await?;

        let mut posts = Table::create();
        posts
            .table(Posts::Table)
            .if_not_exists()
            .col(ColumnDef::new(Posts::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Posts::UserId).uuid().not_null())
            .col(ColumnDef::new(Posts::Name).string_len(50).not_null())
            .col(ColumnDef::new(Posts::Content).text().not_null())
            .col(ColumnDef::new(Posts::Image).string())
            .col(
                ColumnDef::new(Posts::LikeCount)
                    .integer()
                    .not_null()
                    .default(0),
            )
            .foreign_key(
                cascade("fk_posts_user")
                    .from(Posts::Table, Posts::UserId)
                    .to(Users::Table, Users::Id),
            );
        timestamps(&mut posts, Posts::CreatedAt, Posts::UpdatedAt);
        manager.create_table(posts).await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Tags::Name)
                            .string_len(50)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostTags::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostTags::TagId).uuid().not_null())
                    .primary_key(Index::create().col(PostTags::PostId).col(PostTags::TagId))
                    .foreign_key(
                        cascade("fk_post_tags_post")
                            .from(PostTags::Table, PostTags::PostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .foreign_key(
                        cascade("fk_post_tags_tag")
                            .from(PostTags::Table, PostTags::TagId)
                            .to(Tags::Table, Tags::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLikes::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostLikes::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(PostLikes::PostId)
                            .col(PostLikes::UserId),
                    )
                    .foreign_key(
                        cascade("fk_post_likes_post")
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(Posts::Table, Posts::Id),
                    )
                    .foreign_key(
                        cascade("fk_post_likes_user")
                            .from(PostLikes::Table, PostLikes::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        let mut comments = Table::create();
        comments
            .table(Comments::Table)
            .if_not_exists()
            .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Comments::PostId).uuid().not_null())
            .col(ColumnDef::new(Comments::WriterId).uuid().not_null())
            .col(ColumnDef::new(Comments::Content).text().not_null())
            .foreign_key(
                cascade("fk_comments_post")
                    .from(Comments::Table, Comments::PostId)
                    .to(Posts::Table, Posts::Id),
            )
            .foreign_key(
                cascade("fk_comments_writer")
                    .from(Comments::Table, Comments::WriterId)
                    .to(Users::Table, Users::Id),
            );
        timestamps(&mut comments, Comments::CreatedAt, Comments::UpdatedAt);
        manager.create_table(comments).await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_posts_like_count")
                    .table(Posts::Table)
                    .col(Posts::LikeCount)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_post_id")
                    .table(Comments::Table)
                    .col(Comments::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PostTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
