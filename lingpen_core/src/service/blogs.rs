use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{BlogId, LikeId, UserId},
};

#[derive(Debug, Error)]
pub enum BlogsServiceError {
    #[error("fatal database error")]
    Db(#[from] DbErr),

    #[error("blog title is empty")]
    EmptyTitle,

    #[error("blog body is empty")]
    EmptyBody,

    #[error("blog not found")]
    BlogNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("forbidden: not blog author or admin")]
    Forbidden,
}

const EXCERPT_CHAR_LIMIT: usize = 200;
const WORDS_PER_MINUTE: usize = 200;

/// Leading excerpt of the body, "..."-terminated when truncated.
fn excerpt_of(body: &str) -> String {
    if body.chars().count() > EXCERPT_CHAR_LIMIT {
        let cut: String = body.chars().take(EXCERPT_CHAR_LIMIT).collect();
        format!("{cut}...")
    } else {
        body.to_owned()
    }
}

/// Estimated reading time in minutes, never below one.
fn reading_time_of(body: &str) -> i32 {
    let words = body.split_whitespace().count();
    std::cmp::max(1, (words / WORDS_PER_MINUTE) as i32)
}

#[derive(Clone)]
pub struct BlogsService {
    db: DatabaseConnection,
}

impl BlogsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn _create_blog(
        &self,
        user_id: UserId,
        title: &str,
        body: &str,
        tags: Option<String>,
        category: Option<String>,
    ) -> Result<BlogModel, BlogsServiceError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BlogsServiceError::EmptyTitle);
        }
        let body = body.trim();
        if body.is_empty() {
            return Err(BlogsServiceError::EmptyBody);
        }

        let user_exists = User::find_by_id(user_id).one(&self.db).await?.is_some();
        if !user_exists {
            return Err(BlogsServiceError::UserNotFound);
        }

        let blog = BlogActiveModel {
            id: Set(BlogId::new()),
            user_id: Set(user_id),
            title: Set(title.to_owned()),
            body: Set(body.to_owned()),
            excerpt: Set(Some(excerpt_of(body))),
            tags: Set(tags),
            category: Set(category),
            reading_time: Set(Some(reading_time_of(body))),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        let result = Blog::insert(blog).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    pub async fn _get_blog(&self, blog_id: BlogId) -> Result<BlogModel, BlogsServiceError> {
        Blog::find_by_id(blog_id)
            .one(&self.db)
            .await?
            .ok_or(BlogsServiceError::BlogNotFound)
    }

    pub async fn _list_blogs(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<BlogModel>, BlogsServiceError> {
        let blogs = Blog::find()
            .order_by_desc(BlogColumn::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(blogs)
    }

    pub async fn _update_blog(
        &self,
        blog_id: BlogId,
        user_id: UserId,
        title: Option<String>,
        body: Option<String>,
    ) -> Result<BlogModel, BlogsServiceError> {
        let blog = self._get_blog(blog_id).await?;
        self.authorize(&blog, user_id).await?;

        let mut blog_active: BlogActiveModel = blog.into();

        if let Some(new_title) = title {
            let new_title = new_title.trim().to_owned();
            if new_title.is_empty() {
                return Err(BlogsServiceError::EmptyTitle);
            }
            blog_active.title = Set(new_title);
        }

        if let Some(new_body) = body {
            let new_body = new_body.trim().to_owned();
            if new_body.is_empty() {
                return Err(BlogsServiceError::EmptyBody);
            }
            // Derived fields track the body
            blog_active.excerpt = Set(Some(excerpt_of(&new_body)));
            blog_active.reading_time = Set(Some(reading_time_of(&new_body)));
            blog_active.body = Set(new_body);
        }

        blog_active.updated_at = Set(Some(chrono::Utc::now()));

        let updated = blog_active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a blog together with its likes and whole comment forest, in
    /// one transaction.
    pub async fn _delete_blog(
        &self,
        blog_id: BlogId,
        user_id: UserId,
    ) -> Result<(), BlogsServiceError> {
        let blog = self._get_blog(blog_id).await?;
        self.authorize(&blog, user_id).await?;

        let txn = self.db.begin().await?;

        BlogComment::delete_many()
            .filter(BlogCommentColumn::BlogId.eq(blog_id))
            .exec(&txn)
            .await?;

        BlogLike::delete_many()
            .filter(BlogLikeColumn::BlogId.eq(blog_id))
            .exec(&txn)
            .await?;

        Blog::delete_by_id(blog_id).exec(&txn).await?;

        txn.commit().await?;

        tracing::debug!(blog = %blog_id, "deleted blog with comments and likes");
        Ok(())
    }

    pub async fn _toggle_like(
        &self,
        blog_id: BlogId,
        user_id: UserId,
    ) -> Result<bool, BlogsServiceError> {
        self._get_blog(blog_id).await?;

        let existing = BlogLike::find()
            .filter(BlogLikeColumn::BlogId.eq(blog_id))
            .filter(BlogLikeColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(like) => {
                BlogLike::delete_by_id(like.id).exec(&self.db).await?;
                Ok(false)
            }
            None => {
                let like = BlogLikeActiveModel {
                    id: Set(LikeId::new()),
                    user_id: Set(user_id),
                    blog_id: Set(blog_id),
                    created_at: Set(chrono::Utc::now()),
                };
                BlogLike::insert(like).exec(&self.db).await?;
                Ok(true)
            }
        }
    }

    pub async fn _like_count(&self, blog_id: BlogId) -> Result<u64, BlogsServiceError> {
        let count = BlogLike::find()
            .filter(BlogLikeColumn::BlogId.eq(blog_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    pub async fn _comment_count(&self, blog_id: BlogId) -> Result<u64, BlogsServiceError> {
        let count = BlogComment::find()
            .filter(BlogCommentColumn::BlogId.eq(blog_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn authorize(&self, blog: &BlogModel, user_id: UserId) -> Result<(), BlogsServiceError> {
        if blog.user_id == user_id {
            return Ok(());
        }

        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(BlogsServiceError::UserNotFound)?;

        if user.is_admin {
            Ok(())
        } else {
            Err(BlogsServiceError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;
    use chrono::Utc;

    async fn setup_test_service() -> BlogsService {
        let db = test_utils::create_test_db_with_migrations().await;
        BlogsService::new(db)
    }

    async fn create_test_user(db: &DatabaseConnection, username: &str) -> UserId {
        let user_id = UserId::new();
        let user = UserActiveModel {
            id: Set(user_id),
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            is_active: Set(true),
            is_admin: Set(false),
            created_at: Set(Utc::now()),
        };
        User::insert(user).exec(db).await.unwrap();
        user_id
    }

    #[test]
    fn test_excerpt_short_body_untruncated() {
        assert_eq!(excerpt_of("short body"), "short body");
    }

    #[test]
    fn test_excerpt_long_body_truncated() {
        let body = "x".repeat(500);
        let excerpt = excerpt_of(&body);
        assert_eq!(excerpt.chars().count(), 203);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn test_reading_time_minimum_one_minute() {
        assert_eq!(reading_time_of("just a few words"), 1);
    }

    #[test]
    fn test_reading_time_scales_with_words() {
        let body = "word ".repeat(450);
        assert_eq!(reading_time_of(&body), 2);
    }

    #[tokio::test]
    async fn test_create_blog_derives_fields() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana").await;

        let body = "word ".repeat(450);
        let blog = service
            ._create_blog(user, "Case systems", &body, Some("grammar".into()), None)
            .await
            .unwrap();

        assert_eq!(blog.reading_time, Some(2));
        assert!(blog.excerpt.as_deref().unwrap().ends_with("..."));
        assert_eq!(blog.tags.as_deref(), Some("grammar"));
    }

    #[tokio::test]
    async fn test_create_blog_requires_title_and_body() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana").await;

        assert!(matches!(
            service._create_blog(user, " ", "body", None, None).await,
            Err(BlogsServiceError::EmptyTitle)
        ));
        assert!(matches!(
            service._create_blog(user, "title", " ", None, None).await,
            Err(BlogsServiceError::EmptyBody)
        ));
    }

    #[tokio::test]
    async fn test_update_body_rederives_excerpt_and_reading_time() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana").await;

        let blog = service
            ._create_blog(user, "title", "short", None, None)
            .await
            .unwrap();
        assert_eq!(blog.reading_time, Some(1));

        let long_body = "word ".repeat(900);
        let updated = service
            ._update_blog(blog.id, user, None, Some(long_body))
            .await
            .unwrap();

        assert_eq!(updated.reading_time, Some(4));
        assert!(updated.excerpt.as_deref().unwrap().ends_with("..."));
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_delete_blog_removes_comment_forest() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana").await;

        let blog = service
            ._create_blog(user, "doomed", "body", None, None)
            .await
            .unwrap();

        let comments =
            crate::service::blog_comments::BlogCommentsService::new(service.db.clone());
        let root = comments._insert(blog.id, user, "root", None).await.unwrap();
        comments
            ._insert(blog.id, user, "reply", Some(root.id))
            .await
            .unwrap();
        service._toggle_like(blog.id, user).await.unwrap();

        service._delete_blog(blog.id, user).await.unwrap();

        assert!(matches!(
            service._get_blog(blog.id).await,
            Err(BlogsServiceError::BlogNotFound)
        ));
        assert_eq!(BlogComment::find().count(&service.db).await.unwrap(), 0);
        assert_eq!(BlogLike::find().count(&service.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_blog_by_non_author_forbidden() {
        let service = setup_test_service().await;
        let author = create_test_user(&service.db, "ana").await;
        let other = create_test_user(&service.db, "ben").await;

        let blog = service
            ._create_blog(author, "mine", "body", None, None)
            .await
            .unwrap();

        let result = service._delete_blog(blog.id, other).await;
        assert!(matches!(result, Err(BlogsServiceError::Forbidden)));
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana").await;
        let blog = service
            ._create_blog(user, "likeable", "body", None, None)
            .await
            .unwrap();

        assert!(service._toggle_like(blog.id, user).await.unwrap());
        assert_eq!(service._like_count(blog.id).await.unwrap(), 1);
        assert!(!service._toggle_like(blog.id, user).await.unwrap());
        assert_eq!(service._like_count(blog.id).await.unwrap(), 0);
    }
}
