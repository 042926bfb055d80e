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
                    .table(PostLike::Table)
                    .col(pk_uuid(PostLike::Id))
                    .col(uuid(PostLike::UserId))
                    .col(uuid(PostLike::PostId))
                    .col(timestamp(PostLike::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-like-user_id")
                            .from(PostLike::Table, PostLike::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-post-like-post_id")
                            .from(PostLike::Table, PostLike::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One like per (user, post); toggling removes the row
        manager
            .create_index(
                Index::create()
                    .name("idx_post_likes_user_post")
                    .table(PostLike::Table)
                    .col(PostLike::UserId)
                    .col(PostLike::PostId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostLike::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PostLike {
    Table,
    Id,
    UserId,
    PostId,
    CreatedAt,
}
