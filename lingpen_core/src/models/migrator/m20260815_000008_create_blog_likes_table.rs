use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000001_create_users_table::User;
use super::m20260815_000004_create_blogs_table::Blog;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BlogLike::Table)
                    .col(pk_uuid(BlogLike::Id))
                    .col(uuid(BlogLike::UserId))
                    .col(uuid(BlogLike::BlogId))
                    .col(timestamp(BlogLike::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blog-like-user_id")
                            .from(BlogLike::Table, BlogLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blog-like-blog_id")
                            .from(BlogLike::Table, BlogLike::BlogId)
                            .to(Blog::Table, Blog::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_likes_user_blog")
                    .table(BlogLike::Table)
                    .col(BlogLike::UserId)
                    .col(BlogLike::BlogId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogLike::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BlogLike {
    Table,
    Id,
    UserId,
    BlogId,
    CreatedAt,
}
