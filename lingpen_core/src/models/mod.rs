use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;

use crate::config::LingpenConfig;

pub mod migrator;

pub async fn open_or_create_db(config: &LingpenConfig) -> Result<DatabaseConnection, DbErr> {
    // mode=rwc creates the database file on first run
    let connection_string = format!("sqlite://{}?mode=rwc", config.database_path().display());

    Database::connect(&connection_string).await
}

pub async fn migrate_up(db: &DatabaseConnection) -> Result<(), DbErr> {
    migrator::Migrator::up(db, None).await
}
