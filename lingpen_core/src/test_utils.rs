use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::models::migrator::Migrator;

/// Create a fresh in-memory SQLite database. Each call is an isolated
/// instance.
pub async fn create_test_db() -> DatabaseConnection {
    Database::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database")
}

/// Create a fresh in-memory SQLite database with all migrations applied.
///
/// # Example
/// ```
/// use lingpen_core::test_utils;
///
/// #[tokio::test]
/// async fn my_test() {
///     let db = test_utils::create_test_db_with_migrations().await;
///     // Database is ready to use
/// }
/// ```
pub async fn create_test_db_with_migrations() -> DatabaseConnection {
    let db = create_test_db().await;

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}
