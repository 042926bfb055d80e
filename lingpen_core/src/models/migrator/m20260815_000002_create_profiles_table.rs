use sea_orm_migration::prelude::*;

use super::m20260815_000001_create_users_table::User;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20260815_000002_create_profiles_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .col(ColumnDef::new(Profile::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profile::UserId).uuid().not_null())
                    .col(ColumnDef::new(Profile::FirstName).string().null())
                    .col(ColumnDef::new(Profile::LastName).string().null())
                    .col(ColumnDef::new(Profile::About).text().null())
                    .col(ColumnDef::new(Profile::PrimaryLanguage).string().null())
                    .col(ColumnDef::new(Profile::ProficiencyLevel).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-profile-user_id")
                            .from(Profile::Table, Profile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One profile per user
        manager
            .create_index(
                Index::create()
                    .name("idx_profiles_user_id")
                    .table(Profile::Table)
                    .col(Profile::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Profile {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    About,
    PrimaryLanguage,
    ProficiencyLevel,
}
