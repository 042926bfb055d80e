use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::{
    entity::prelude::*,
    ids::{CommentId, PostId, UserId},
    service::comments::{
        self, CommentRow, CommentThreads, CommentsServiceError, ThreadNode,
    },
};

/// Threaded comments attached to short posts.
#[derive(Clone)]
pub struct PostCommentsService {
    db: DatabaseConnection,
}

impl PostCommentsService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Top-level comments for a post, newest first. Unpaginated: callers
    /// get the full top-level set.
    pub async fn _list_top_level(
        &self,
        post_id: PostId,
    ) -> Result<Vec<PostCommentModel>, CommentsServiceError> {
        let top_level = PostComment::find()
            .filter(PostCommentColumn::PostId.eq(post_id))
            .filter(PostCommentColumn::ParentId.is_null())
            .order_by_desc(PostCommentColumn::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(top_level)
    }

    /// Every comment of the post, flattened. One query; the tree is built
    /// in memory so materialization never recurses into the database.
    async fn fetch_rows(&self, post_id: PostId) -> Result<Vec<CommentRow>, CommentsServiceError> {
        let rows = PostComment::find()
            .filter(PostCommentColumn::PostId.eq(post_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(CommentRow::from)
            .collect();

        Ok(rows)
    }

    pub async fn _thread(
        &self,
        comment: &PostCommentModel,
    ) -> Result<ThreadNode, CommentsServiceError> {
        let rows = self.fetch_rows(comment.post_id).await?;
        let labels = comments::author_labels(&self.db, rows.iter().map(|r| r.author_id)).await?;

        Ok(comments::materialize_thread(
            CommentRow::from(comment.clone()),
            rows,
            &labels,
        ))
    }

    pub async fn _list_threads(
        &self,
        post_id: PostId,
    ) -> Result<Vec<ThreadNode>, CommentsServiceError> {
        let rows = self.fetch_rows(post_id).await?;
        let labels = comments::author_labels(&self.db, rows.iter().map(|r| r.author_id)).await?;

        Ok(comments::build_forest(rows, &labels))
    }

    pub async fn _insert(
        &self,
        post_id: PostId,
        author: UserId,
        body: &str,
        parent: Option<CommentId>,
    ) -> Result<PostCommentModel, CommentsServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(CommentsServiceError::EmptyBody);
        }

        let author_exists = User::find_by_id(author).one(&self.db).await?.is_some();
        if !author_exists {
            return Err(CommentsServiceError::UserNotFound);
        }

        let post_exists = Post::find_by_id(post_id).one(&self.db).await?.is_some();
        if !post_exists {
            return Err(CommentsServiceError::ContentItemNotFound);
        }

        // Lenient parent handling: a parent that is missing or belongs to a
        // different post demotes the comment to top-level instead of failing.
        let parent_id = match parent {
            Some(pid) => PostComment::find_by_id(pid)
                .one(&self.db)
                .await?
                .filter(|p| p.post_id == post_id)
                .map(|p| p.id),
            None => None,
        };

        let comment = PostCommentActiveModel {
            id: Set(CommentId::new()),
            user_id: Set(author),
            post_id: Set(post_id),
            parent_id: Set(parent_id),
            body: Set(body.to_owned()),
            created_at: Set(chrono::Utc::now()),
        };

        let result = PostComment::insert(comment)
            .exec_with_returning(&self.db)
            .await?;

        Ok(result)
    }

    pub async fn _delete(
        &self,
        comment_id: CommentId,
        requesting_user: UserId,
    ) -> Result<(), CommentsServiceError> {
        let comment = PostComment::find_by_id(comment_id)
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

        // Collect the whole subtree breadth-first, then remove it in one
        // transaction so a failure never strands children of a deleted parent.
        let txn = self.db.begin().await?;

        let mut doomed = vec![comment.id];
        let mut frontier = vec![comment.id];
        while !frontier.is_empty() {
            let children: Vec<CommentId> = PostComment::find()
                .filter(PostCommentColumn::ParentId.is_in(frontier.clone()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|c| c.id)
                .collect();
            doomed.extend(&children);
            frontier = children;
        }

        let deleted = PostComment::delete_many()
            .filter(PostCommentColumn::Id.is_in(doomed))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        tracing::debug!(
            comment = %comment_id,
            rows = deleted.rows_affected,
            "deleted post comment subtree"
        );

        Ok(())
    }
}

#[async_trait]
impl CommentThreads for PostCommentsService {
    type ContentId = PostId;
    type Comment = PostCommentModel;

    async fn list_top_level(
        &self,
        item: PostId,
    ) -> Result<Vec<PostCommentModel>, CommentsServiceError> {
        self._list_top_level(item).await
    }

    async fn thread(&self, comment: &PostCommentModel) -> Result<ThreadNode, CommentsServiceError> {
        self._thread(comment).await
    }

    async fn list_threads(&self, item: PostId) -> Result<Vec<ThreadNode>, CommentsServiceError> {
        self._list_threads(item).await
    }

    async fn insert(
        &self,
        item: PostId,
        author: UserId,
        body: &str,
        parent: Option<CommentId>,
    ) -> Result<PostCommentModel, CommentsServiceError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ProfileId;
    use crate::test_utils;
    use chrono::{TimeZone, Utc};

    async fn setup_test_service() -> PostCommentsService {
        let db = test_utils::create_test_db_with_migrations().await;
        PostCommentsService::new(db)
    }

    async fn create_test_user(
        db: &DatabaseConnection,
        username: &str,
        email: &str,
        is_admin: bool,
    ) -> UserId {
        let user_id = UserId::new();
        let user = UserActiveModel {
            id: Set(user_id),
            username: Set(username.to_string()),
            email: Set(email.to_string()),
            is_active: Set(true),
            is_admin: Set(is_admin),
            created_at: Set(Utc::now()),
        };
        User::insert(user).exec(db).await.unwrap();
        user_id
    }

    async fn create_test_profile(db: &DatabaseConnection, user_id: UserId, first_name: &str) {
        let profile = ProfileActiveModel {
            id: Set(ProfileId::new()),
            user_id: Set(user_id),
            first_name: Set(Some(first_name.to_string())),
            last_name: Set(None),
            about: Set(None),
            primary_language: Set(None),
            proficiency_level: Set(None),
        };
        Profile::insert(profile).exec(db).await.unwrap();
    }

    async fn create_test_post(db: &DatabaseConnection, user_id: UserId) -> PostId {
        let post_id = PostId::new();
        let post = PostActiveModel {
            id: Set(post_id),
            user_id: Set(user_id),
            body: Set("a post".to_string()),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        Post::insert(post).exec(db).await.unwrap();
        post_id
    }

    /// Insert a comment with a pinned timestamp so ordering assertions
    /// never depend on the wall clock.
    async fn insert_at(
        db: &DatabaseConnection,
        post_id: PostId,
        user_id: UserId,
        parent: Option<CommentId>,
        body: &str,
        minute: u32,
    ) -> CommentId {
        let id = CommentId::new();
        let comment = PostCommentActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            post_id: Set(post_id),
            parent_id: Set(parent),
            body: Set(body.to_string()),
            created_at: Set(Utc.with_ymd_and_hms(2026, 3, 14, 10, minute, 0).unwrap()),
        };
        PostComment::insert(comment).exec(db).await.unwrap();
        id
    }

    async fn comment_count(db: &DatabaseConnection) -> u64 {
        PostComment::find().count(db).await.unwrap()
    }

    #[tokio::test]
    async fn test_list_top_level_newest_first() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let a = insert_at(&service.db, post, user, None, "A", 0).await;
        let b = insert_at(&service.db, post, user, None, "B", 5).await;
        // Reply must not appear in the top-level list
        insert_at(&service.db, post, user, Some(a), "C", 2).await;

        let top_level = service._list_top_level(post).await.unwrap();
        assert_eq!(top_level.len(), 2);
        assert_eq!(top_level[0].id, b);
        assert_eq!(top_level[1].id, a);
        assert!(top_level.iter().all(|c| c.parent_id.is_none()));
    }

    #[tokio::test]
    async fn test_list_top_level_empty_post() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let top_level = service._list_top_level(post).await.unwrap();
        assert!(top_level.is_empty());
    }

    #[tokio::test]
    async fn test_thread_scenario() {
        // P has A (top, 10:00), B (top, 10:05), C (reply to A, 10:02)
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let a = insert_at(&service.db, post, user, None, "A", 0).await;
        let b = insert_at(&service.db, post, user, None, "B", 5).await;
        let c = insert_at(&service.db, post, user, Some(a), "C", 2).await;

        let top_level = service._list_top_level(post).await.unwrap();
        assert_eq!(top_level[0].id, b);
        assert_eq!(top_level[1].id, a);

        let tree = service._thread(&top_level[1]).await.unwrap();
        assert_eq!(tree.id, a);
        assert_eq!(tree.replies.len(), 1);
        assert_eq!(tree.replies[0].id, c);
        assert_eq!(tree.created_at, "2026-03-14 10:00");
    }

    #[tokio::test]
    async fn test_thread_is_idempotent() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let root = insert_at(&service.db, post, user, None, "root", 0).await;
        let reply = insert_at(&service.db, post, user, Some(root), "reply", 1).await;
        insert_at(&service.db, post, user, Some(reply), "nested", 2).await;

        let top_level = service._list_top_level(post).await.unwrap();
        let first = service._thread(&top_level[0]).await.unwrap();
        let second = service._thread(&top_level[0]).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_insert_reply_round_trip() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let parent = service._insert(post, user, "parent", None).await.unwrap();
        let reply = service
            ._insert(post, user, "the reply", Some(parent.id))
            .await
            .unwrap();

        assert_eq!(reply.parent_id, Some(parent.id));

        let tree = service._thread(&parent).await.unwrap();
        assert_eq!(tree.replies.len(), 1);
        assert_eq!(tree.replies[0].id, reply.id);
        assert_eq!(tree.replies[0].body, "the reply");
    }

    #[tokio::test]
    async fn test_insert_trims_body() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let comment = service._insert(post, user, "  hola  ", None).await.unwrap();
        assert_eq!(comment.body, "hola");
    }

    #[tokio::test]
    async fn test_insert_rejects_whitespace_body() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let result = service._insert(post, user, "   ", None).await;
        assert!(matches!(result, Err(CommentsServiceError::EmptyBody)));
        assert_eq!(comment_count(&service.db).await, 0, "no row may be created");
    }

    #[tokio::test]
    async fn test_insert_unknown_author_fails() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let result = service._insert(post, UserId::new(), "hello", None).await;
        assert!(matches!(result, Err(CommentsServiceError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_insert_unknown_post_fails() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;

        let result = service._insert(PostId::new(), user, "hello", None).await;
        assert!(matches!(
            result,
            Err(CommentsServiceError::ContentItemNotFound)
        ));
    }

    #[tokio::test]
    async fn test_insert_missing_parent_coerced_to_top_level() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let comment = service
            ._insert(post, user, "orphan reply", Some(CommentId::new()))
            .await
            .unwrap();

        assert_eq!(comment.parent_id, None);
        let top_level = service._list_top_level(post).await.unwrap();
        assert_eq!(top_level.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_parent_on_other_post_coerced_to_top_level() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post_a = create_test_post(&service.db, user).await;
        let post_b = create_test_post(&service.db, user).await;

        let foreign_parent = service._insert(post_a, user, "on A", None).await.unwrap();

        // Cross-post parenting is not an error: the comment lands top-level
        let comment = service
            ._insert(post_b, user, "on B", Some(foreign_parent.id))
            .await
            .unwrap();

        assert_eq!(comment.parent_id, None);
        assert_eq!(comment.post_id, post_b);
    }

    #[tokio::test]
    async fn test_delete_removes_whole_subtree() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let root = insert_at(&service.db, post, user, None, "root", 0).await;
        let child = insert_at(&service.db, post, user, Some(root), "child", 1).await;
        insert_at(&service.db, post, user, Some(root), "child2", 2).await;
        insert_at(&service.db, post, user, Some(child), "grandchild", 3).await;
        let survivor = insert_at(&service.db, post, user, None, "unrelated", 4).await;

        assert_eq!(comment_count(&service.db).await, 5);

        service._delete(root, user).await.unwrap();

        // Exactly N+1 rows gone: root + 3 descendants
        assert_eq!(comment_count(&service.db).await, 1);

        let top_level = service._list_top_level(post).await.unwrap();
        assert_eq!(top_level.len(), 1);
        assert_eq!(top_level[0].id, survivor);
    }

    #[tokio::test]
    async fn test_delete_by_non_author_forbidden() {
        let service = setup_test_service().await;
        let author = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let other = create_test_user(&service.db, "ben", "ben@example.com", false).await;
        let post = create_test_post(&service.db, author).await;

        let root = insert_at(&service.db, post, author, None, "root", 0).await;
        insert_at(&service.db, post, author, Some(root), "reply", 1).await;

        let result = service._delete(root, other).await;
        assert!(matches!(result, Err(CommentsServiceError::Forbidden)));

        // Nothing was removed and the thread still materializes
        assert_eq!(comment_count(&service.db).await, 2);
        let top_level = service._list_top_level(post).await.unwrap();
        let tree = service._thread(&top_level[0]).await.unwrap();
        assert_eq!(tree.replies.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_admin_allowed() {
        let service = setup_test_service().await;
        let author = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let admin = create_test_user(&service.db, "root", "root@example.com", true).await;
        let post = create_test_post(&service.db, author).await;

        let comment = insert_at(&service.db, post, author, None, "root", 0).await;

        service._delete(comment, admin).await.unwrap();
        assert_eq!(comment_count(&service.db).await, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_comment_not_found() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;

        let result = service._delete(CommentId::new(), user).await;
        assert!(matches!(result, Err(CommentsServiceError::CommentNotFound)));
    }

    #[tokio::test]
    async fn test_author_label_prefers_first_name_falls_back_to_email() {
        let service = setup_test_service().await;
        let named = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        create_test_profile(&service.db, named, "Ana").await;
        let unnamed = create_test_user(&service.db, "ben", "ben@example.com", false).await;
        let post = create_test_post(&service.db, named).await;

        let root = insert_at(&service.db, post, named, None, "root", 0).await;
        insert_at(&service.db, post, unnamed, Some(root), "reply", 1).await;

        let threads = service._list_threads(post).await.unwrap();
        assert_eq!(threads[0].user, "Ana");
        // No profile: fall back to the email, at reply depth too
        assert_eq!(threads[0].replies[0].user, "ben@example.com");
    }

    #[tokio::test]
    async fn test_list_threads_matches_per_comment_materialization() {
        let service = setup_test_service().await;
        let user = create_test_user(&service.db, "ana", "ana@example.com", false).await;
        let post = create_test_post(&service.db, user).await;

        let a = insert_at(&service.db, post, user, None, "A", 0).await;
        insert_at(&service.db, post, user, None, "B", 5).await;
        insert_at(&service.db, post, user, Some(a), "C", 2).await;

        let threads = service._list_threads(post).await.unwrap();
        let top_level = service._list_top_level(post).await.unwrap();

        assert_eq!(threads.len(), top_level.len());
        for (node, comment) in threads.iter().zip(top_level.iter()) {
            let expected = service._thread(comment).await.unwrap();
            assert_eq!(node, &expected);
        }
    }
}
