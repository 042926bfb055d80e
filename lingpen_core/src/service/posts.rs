use sea_orm::DatabaseConnection;
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{LikeId, PostId, UserId},
};

#[derive(Debug, Error)]
pub enum PostsServiceError {
    #[error("fatal database error")]
    Db(#[from] DbErr),

    #[error("post body is empty")]
    EmptyBody,

    #[error("post not found")]
    PostNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("forbidden: not post author or admin")]
    Forbidden,
}

#[derive(Clone)]
pub struct PostsService {
    db: DatabaseConnection,
}

impl PostsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn _create_post(
        &self,
        user_id: UserId,
        body: &str,
    ) -> Result<PostModel, PostsServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(PostsServiceError::EmptyBody);
        }

        let user_exists = User::find_by_id(user_id).one(&self.db).await?.is_some();
        if !user_exists {
            return Err(PostsServiceError::UserNotFound);
        }

        let post = PostActiveModel {
            id: Set(PostId::new()),
            user_id: Set(user_id),
            body: Set(body.to_owned()),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        let result = Post::insert(post).exec_with_returning(&self.db).await?;
        Ok(result)
    }

    pub async fn _get_post(&self, post_id: PostId) -> Result<PostModel, PostsServiceError> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::PostNotFound)
    }

    /// Feed listing, newest first.
    pub async fn _list_posts(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostModel>, PostsServiceError> {
        let posts = Post::find()
            .order_by_desc(PostColumn::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(posts)
    }

    pub async fn _list_posts_by_user(
        &self,
        user_id: UserId,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<PostModel>, PostsServiceError> {
        let posts = Post::find()
            .filter(PostColumn::UserId.eq(user_id))
            .order_by_desc(PostColumn::CreatedAt)
            .limit(limit)
            .offset(offset)
            .all(&self.db)
            .await?;

        Ok(posts)
    }

    pub async fn _update_post(
        &self,
        post_id: PostId,
        user_id: UserId,
        body: &str,
    ) -> Result<PostModel, PostsServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(PostsServiceError::EmptyBody);
        }

        let post = self._get_post(post_id).await?;
        self.authorize(&post, user_id).await?;

        let mut post_active: PostActiveModel = post.into();
        post_active.body = Set(body.to_owned());
        post_active.updated_at = Set(Some(chrono::Utc::now()));

        let updated = post_active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a post together with its likes and whole comment forest.
    /// Explicit deletes inside one transaction rather than relying on the
    /// FK cascade, which SQLite only honors with foreign_keys=ON.
    pub async fn _delete_post(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<(), PostsServiceError> {
        let post = self._get_post(post_id).await?;
        self.authorize(&post, user_id).await?;

        let txn = self.db.begin().await?;

        PostComment::delete_many()
            .filter(PostCommentColumn::PostId.eq(post_id))
            .exec(&txn)
            .await?;

        PostLike::delete_many()
            .filter(PostLikeColumn::PostId.eq(post_id))
            .exec(&txn)
            .await?;

        Post::delete_by_id(post_id).exec(&txn).await?;

        txn.commit().await?;

        tracing::debug!(post = %post_id, "deleted post with comments and likes");
        Ok(())
    }

    /// Toggle the (user, post) like. Returns true when the post is liked
    /// after the call.
    pub async fn _toggle_like(
        &self,
        post_id: PostId,
        user_id: UserId,
    ) -> Result<bool, PostsServiceError> {
        // 404 before touching the like table
        self._get_post(post_id).await?;

        let existing = PostLike::find()
            .filter(PostLikeColumn::PostId.eq(post_id))
            .filter(PostLikeColumn::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        match existing {
            Some(like) => {
                PostLike::delete_by_id(like.id).exec(&self.db).await?;
                Ok(false)
            }
            None => {
                let like = PostLikeActiveModel {
                    id: Set(LikeId::new()),
                    user_id: Set(user_id),
                    post_id: Set(post_id),
                    created_at: Set(chrono::Utc::now()),
                };
                PostLike::insert(like).exec(&self.db).await?;
                Ok(true)
            }
        }
    }

    pub async fn _like_count(&self, post_id: PostId) -> Result<u64, PostsServiceError> {
        let count = PostLike::find()
            .filter(PostLikeColumn::PostId.eq(post_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    pub async fn _comment_count(&self, post_id: PostId) -> Result<u64, PostsServiceError> {
        let count = PostComment::find()
            .filter(PostCommentColumn::PostId.eq(post_id))
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn authorize(&self, post: &PostModel, user_id: UserId) -> Result<(), PostsServiceError> {
        if post.user_id == user_id {
            return Ok(());
        }

        let user = User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(PostsServiceError::UserNotFound)?;

        if user.is_admin {
            Ok(())
        } else {
            Err(PostsServiceError::Forbidden)
        }
    }
}
