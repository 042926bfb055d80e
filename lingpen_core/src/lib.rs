pub mod entity;
pub mod ids;
pub mod models;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;
use tracing_subscriber::EnvFilter;

use crate::service::{
    blog_comments::BlogCommentsService, blogs::BlogsService, post_comments::PostCommentsService,
    posts::PostsService, users::UsersService,
};

pub mod service;

pub mod error;

pub mod config;

pub mod test_utils;

static LINGPEN_CORE: OnceCell<Arc<LingpenCore>> = OnceCell::const_new();

pub async fn core() -> Arc<LingpenCore> {
    LINGPEN_CORE
        .get_or_init(|| async move {
            Arc::new(LingpenCore::start().await.expect("failed to init"))
        })
        .await
        .clone()
}

/// Main runtime handle for Lingpen.
///
/// Owns the database connection and the service set the HTTP surfaces talk
/// to. Routing, sessions, and auth live with the embedding application.
pub struct LingpenCore {
    pub config: config::LingpenConfig,
    pub db: DatabaseConnection,

    pub users: UsersService,
    pub posts: PostsService,
    pub blogs: BlogsService,
    pub post_comments: PostCommentsService,
    pub blog_comments: BlogCommentsService,
}

impl LingpenCore {
    pub async fn start() -> Result<Self, error::CoreError> {
        // The embedding app may have installed a subscriber already
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init()
            .ok();

        let config = config::get_or_init().await?;
        tracing::debug!(?config, "loaded config");

        let db = models::open_or_create_db(&config).await?;
        models::migrate_up(&db).await?;
        tracing::info!(
            database = %config.database_path().display(),
            "database ready"
        );

        Ok(Self {
            users: UsersService::new(db.clone()),
            posts: PostsService::new(db.clone()),
            blogs: BlogsService::new(db.clone()),
            post_comments: PostCommentsService::new(db.clone()),
            blog_comments: BlogCommentsService::new(db.clone()),
            config,
            db,
        })
    }

    pub async fn shutdown(self) -> Result<(), error::CoreError> {
        self.db.close().await?;
        Ok(())
    }
}

pub mod prelude {
    pub use super::entity;
    pub use super::ids;
    pub use super::models;

    pub use super::service;

    pub use super::error;

    pub use super::config;
}
