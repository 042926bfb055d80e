use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::{
    entity::prelude::*,
    ids::{BlogId, CommentId, UserId},
    service::comments::{
        self, CommentRow, CommentThreads, CommentsServiceError, ThreadNode,
    },
};

/// Threaded comments attached to blogs. Same semantics as
/// [`super::post_comments::PostCommentsService`], against the blog_comment
/// table.
#[derive(Clone)]
pub struct BlogCommentsService {
    db: DatabaseConnection,
}

impl BlogCommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn _list_top_level(
        &self,
        blog_id: BlogId,
    ) -> Result<Vec<BlogCommentModel>, CommentsServiceError> {
        let top_level = BlogComment::find()
            .filter(BlogCommentColumn::BlogId.eq(blog_id))
            .filter(BlogCommentColumn::ParentId.is_null())
            .order_by_desc(BlogCommentColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(top_level)
    }

    async fn fetch_rows(&self, blog_id: BlogId) -> Result<Vec<CommentRow>, CommentsServiceError> {
        let rows = BlogComment::find()
            .filter(BlogCommentColumn::BlogId.eq(blog_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(CommentRow::from)
            .collect();

        Ok(rows)
    }

    pub async fn _thread(
        &self,
        comment: &BlogCommentModel,
    ) -> Result<ThreadNode, CommentsServiceError> {
        let rows = self.fetch_rows(comment.blog_id).await?;
        let labels = comments::author_labels(&self.db, rows.iter().map(|r| r.author_id)).await?;

        Ok(comments::materialize_thread(
            CommentRow::from(comment.clone()),
            rows,
            &labels,
        ))
    }

    pub async fn _list_threads(
        &self,
        blog_id: BlogId,
    ) -> Result<Vec<ThreadNode>, CommentsServiceError> {
        let rows = self.fetch_rows(blog_id).await?;
        let labels = comments::author_labels(&self.db, rows.iter().map(|r| r.author_id)).await?;

        Ok(comments::build_forest(rows, &labels))
    }

    pub async fn _insert(
        &self,
        blog_id: BlogId,
        author: UserId,
        body: &str,
        parent: Option<CommentId>,
    ) -> Result<BlogCommentModel, CommentsServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CommentsServiceError::EmptyBody);
        }

        let author_exists = User::find_by_id(author).one(&self.db).await?.is_some();
        if !author_exists {
            return Err(CommentsServiceError::UserNotFound);
        }

        let blog_exists = Blog::find_by_id(blog_id).one(&self.db).await?.is_some();
        if !blog_exists {
            return Err(CommentsServiceError::ContentItemNotFound);
        }

        // Lenient parent handling, same as post comments: unresolvable
        // parents demote the comment to top-level.
        let parent_id = match parent {
            Some(pid) => BlogComment::find_by_id(pid)
                .one(&self.db)
                .await?
                .filter(|p| p.blog_id == blog_id)
                .map(|p| p.id),
            None => None,
        };

        let comment = BlogCommentActiveModel {
            id: Set(CommentId::new()),
            user_id: Set(author),
            blog_id: Set(blog_id),
            parent_id: Set(parent_id),
            body: Set(body.to_owned()),
            created_at: Set(chrono::Utc::now()),
        };

        let result = BlogComment::insert(comment)
            .exec_with_returning(&self.db)
            .await?;

        Ok(result)
    }

    pub async fn _delete(
        &self,
        comment_id: CommentId,
        requesting_user: UserId,
    ) -> Result<(), CommentsServiceError> {
        let comment = BlogComment::find_by_id(comment_id)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::CommentNotFound)?;

        let user = User::find_by_id(requesting_user)
            .one(&self.db)
            .await?
            .ok_or(CommentsServiceError::UserNotFound)?;

        if comment.user_id != user.id && !user.is_admin {
            return Err(CommentsServiceError::Forbidden);
        }

        let txn = self.db.begin().await?;

        let mut doomed = vec![comment.id];
        let mut frontier = vec![comment.id];
        while !frontier.is_empty() {
            let children: Vec<CommentId> = BlogComment::find()
                .filter(BlogCommentColumn::ParentId.is_in(frontier.clone()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            doomed.extend(&children);
            frontier = children;
        }

        let deleted = BlogComment::delete_many()
            .filter(BlogCommentColumn::Id.is_in(doomed))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::debug!(
            comment = %comment_id,
            rows = deleted.rows_affected,
            "deleted blog comment subtree"
        );

        Ok(())
    }
}

#[async_trait]
impl CommentThreads for BlogCommentsService {
    type ContentId = BlogId;
    type Comment = BlogCommentModel;

    async fn list_top_level(
        &self,
        item: BlogId,
    ) -> Result<Vec<BlogCommentModel>, CommentsServiceError> {
        self._list_top_level(item).await
    }

    async fn thread(&self, comment: &BlogCommentModel) -> Result<ThreadNode, CommentsServiceError> {
        self._thread(comment).await
    }

    async fn list_threads(&self, item: BlogId) -> Result<Vec<ThreadNode>, CommentsServiceError> {
        self._list_threads(item).await
    }

    async fn insert(
        &self,
        item: BlogId,
        author: UserId,
        body: &str,
        parent: Option<CommentId>,
    ) -> Result<BlogCommentModel, CommentsServiceError> {
        self._insert(item, author, body, parent).await
    }

    async fn delete(
        &self,
        comment: CommentId,
        requesting_user: UserId,
    ) -> Result<(), CommentsServiceError> {
        self._delete(comment, requesting_user).await
    }
}
