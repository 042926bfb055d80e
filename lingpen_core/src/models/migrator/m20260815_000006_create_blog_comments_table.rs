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
                    .table(BlogComment::Table)
                    .col(pk_uuid(BlogComment::Id))
                    .col(uuid(BlogComment::UserId))
                    .col(uuid(BlogComment::BlogId))
                    .col(uuid_null(BlogComment::ParentId)) // NULL = top-level
                    .col(text(BlogComment::Body))
                    .col(timestamp(BlogComment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blog-comment-user_id")
                            .from(BlogComment::Table, BlogComment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blog-comment-blog_id")
                            .from(BlogComment::Table, BlogComment::BlogId)
                            .to(Blog::Table, Blog::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blog-comment-parent_id")
                            .from(BlogComment::Table, BlogComment::ParentId)
                            .to(BlogComment::Table, BlogComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_comments_blog_id")
                    .table(BlogComment::Table)
                    .col(BlogComment::BlogId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_comments_parent_id")
                    .table(BlogComment::Table)
                    .col(BlogComment::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_comments_created_at")
                    .table(BlogComment::Table)
                    .col(BlogComment::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogComment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BlogComment {
    Table,
    Id,
    UserId,
    BlogId,
    ParentId,
    Body,
    CreatedAt,
}
