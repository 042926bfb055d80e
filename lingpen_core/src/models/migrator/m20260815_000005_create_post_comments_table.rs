use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000001_create_users_table::User;
use super::m20260815_000003_create_posts_table::Post;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostComment::Table)
                    .col(pk_uuid(PostComment::Id))
                    .col(uuid(PostComment::UserId))
                    .col(uuid(PostComment::PostId))
                    .col(uuid_null(PostComment::ParentId)) // NULL = top-level
                    .col(text(PostComment::Body))
                    .col(timestamp(PostComment::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-comment-user_id")
                            .from(PostComment::Table, PostComment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-comment-post_id")
                            .from(PostComment::Table, PostComment::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-comment-parent_id")
                            .from(PostComment::Table, PostComment::ParentId)
                            .to(PostComment::Table, PostComment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_comments_post_id")
                    .table(PostComment::Table)
                    .col(PostComment::PostId)
                    .to_owned(),
            )
            .await?;

        // Reply lookups group by parent_id
        manager
            .create_index(
                Index::create()
                    .name("idx_post_comments_parent_id")
                    .table(PostComment::Table)
                    .col(PostComment::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_post_comments_created_at")
                    .table(PostComment::Table)
                    .col(PostComment::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostComment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PostComment {
    Table,
    Id,
    UserId,
    PostId,
    ParentId,
    Body,
    CreatedAt,
}
