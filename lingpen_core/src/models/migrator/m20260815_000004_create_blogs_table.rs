use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000001_create_users_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blog::Table)
                    .col(pk_uuid(Blog::Id))
                    .col(uuid(Blog::UserId))
                    .col(string(Blog::Title))
                    .col(text(Blog::Body))
                    .col(string_null(Blog::Excerpt))
                    .col(string_null(Blog::Tags))
                    .col(string_null(Blog::Category))
                    .col(integer_null(Blog::ReadingTime))
                    .col(timestamp(Blog::CreatedAt))
                    .col(timestamp_null(Blog::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-blog-user_id")
                            .from(Blog::Table, Blog::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_user_id")
                    .table(Blog::Table)
                    .col(Blog::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_created_at")
                    .table(Blog::Table)
                    .col(Blog::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Blog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Blog {
    Table,
    Id,
    UserId,
    Title,
    Body,
    Excerpt,
    Tags,
    Category,
    ReadingTime,
    CreatedAt,
    UpdatedAt,
}
