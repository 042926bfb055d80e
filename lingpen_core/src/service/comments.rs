use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    entity::prelude::*,
    ids::{CommentId, UserId},
};

#[derive(Debug, Error)]
pub enum CommentsServiceError {
    #[error("fatal database error")]
    Db(#[from] DbErr),

    #[error("comment body is empty")]
    EmptyBody,

    #[error("comment not found")]
    CommentNotFound,

    #[error("content item not found")]
    ContentItemNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("forbidden: not comment author or admin")]
    Forbidden,
}

/// Timestamp format used on the read boundary.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One node of a materialized reply tree, in the shape consumed by the
/// HTTP surfaces: `{id, body, user, created_at, replies: [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadNode {
    pub id: CommentId,
    pub body: String,
    /// Author display label: profile first name, falling back to email.
    pub user: String,
    /// Formatted as `YYYY-MM-DD HH:MM`.
    pub created_at: String,
    pub replies: Vec<ThreadNode>,
}

/// Flat projection of a stored comment, shared by both content kinds so the
/// tree building below is written once.
#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: CommentId,
    pub author_id: UserId,
    pub parent_id: Option<CommentId>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<PostCommentModel> for CommentRow {
    fn from(c: PostCommentModel) -> Self {
        CommentRow {
            id: c.id,
            author_id: c.user_id,
            parent_id: c.parent_id,
            body: c.body,
            created_at: c.created_at,
        }
    }
}

impl From<BlogCommentModel> for CommentRow {
    fn from(c: BlogCommentModel) -> Self {
        CommentRow {
            id: c.id,
            author_id: c.user_id,
            parent_id: c.parent_id,
            body: c.body,
            created_at: c.created_at,
        }
    }
}

/// The comment-thread store interface. Implemented once per content kind;
/// the two implementations differ only in which table they talk to.
#[async_trait]
pub trait CommentThreads {
    type ContentId: Copy + Send + Sync + 'static;
    type Comment: Send + Sync;

    /// Top-level comments for a content item, newest first.
    async fn list_top_level(
        &self,
        item: Self::ContentId,
    ) -> Result<Vec<Self::Comment>, CommentsServiceError>;

    /// Materialize the full reply tree below one comment.
    async fn thread(&self, comment: &Self::Comment) -> Result<ThreadNode, CommentsServiceError>;

    /// Materialize every top-level thread of a content item in one go.
    async fn list_threads(
        &self,
        item: Self::ContentId,
    ) -> Result<Vec<ThreadNode>, CommentsServiceError>;

    /// Persist a new comment, possibly as a reply. The sole mutation entry
    /// point; comments are never edited in place.
    async fn insert(
        &self,
        item: Self::ContentId,
        author: UserId,
        body: &str,
        parent: Option<CommentId>,
    ) -> Result<Self::Comment, CommentsServiceError>;

    /// Delete a comment and its whole descendant subtree (author or admin).
    async fn delete(
        &self,
        comment: CommentId,
        requesting_user: UserId,
    ) -> Result<(), CommentsServiceError>;
}

/// Group a flat comment set by parent and build every top-level thread.
///
/// The ordering asymmetry is intentional: the top-level list surfaces recent
/// discussion (newest first) while reply lists keep conversational order
/// (oldest first) at every depth.
pub(crate) fn build_forest(
    rows: Vec<CommentRow>,
    labels: &HashMap<UserId, String>,
) -> Vec<ThreadNode> {
    let mut children = group_by_parent(rows);

    let mut roots = children.remove(&None).unwrap_or_default();
    roots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    roots
        .into_iter()
        .map(|root| materialize_node(root, &mut children, labels))
        .collect()
}

/// Materialize the tree rooted at `root`, given every comment of the same
/// content item.
pub(crate) fn materialize_thread(
    root: CommentRow,
    rows: Vec<CommentRow>,
    labels: &HashMap<UserId, String>,
) -> ThreadNode {
    let mut children = group_by_parent(rows);
    materialize_node(root, &mut children, labels)
}

fn group_by_parent(rows: Vec<CommentRow>) -> HashMap<Option<CommentId>, Vec<CommentRow>> {
    let mut children: HashMap<Option<CommentId>, Vec<CommentRow>> = HashMap::new();
    for row in rows {
        children.entry(row.parent_id).or_default().push(row);
    }
    // Replies are oldest-first at every depth
    for group in children.values_mut() {
        group.sort_by_key(|r| r.created_at);
    }
    children
}

fn materialize_node(
    row: CommentRow,
    children: &mut HashMap<Option<CommentId>, Vec<CommentRow>>,
    labels: &HashMap<UserId, String>,
) -> ThreadNode {
    let replies = children
        .remove(&Some(row.id))
        .unwrap_or_default()
        .into_iter()
        .map(|child| materialize_node(child, children, labels))
        .collect();

    ThreadNode {
        id: row.id,
        body: row.body,
        user: labels
            .get(&row.author_id)
            .cloned()
            .unwrap_or_else(|| row.author_id.to_string()),
        created_at: row.created_at.format(CREATED_AT_FORMAT).to_string(),
        replies,
    }
}

/// Batch display-label lookup for the authors of a fetched comment set:
/// profile first name when present and non-empty, otherwise the user's
/// email. One query for users, one for profiles; no per-node lookups.
pub(crate) async fn author_labels<I>(
    db: &DatabaseConnection,
    author_ids: I,
) -> Result<HashMap<UserId, String>, DbErr>
where
    I: IntoIterator<Item = UserId>,
{
    let mut ids: Vec<UserId> = author_ids.into_iter().collect();
    ids.sort();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let users = User::find()
        .filter(UserColumn::Id.is_in(ids.clone()))
        .all(db)
        .await?;

    let profiles = Profile::find()
        .filter(ProfileColumn::UserId.is_in(ids))
        .all(db)
        .await?;

    let mut first_names: HashMap<UserId, String> = profiles
        .into_iter()
        .filter_map(|p| {
            p.first_name
                .filter(|name| !name.is_empty())
                .map(|name| (p.user_id, name))
        })
        .collect();

    Ok(users
        .into_iter()
        .map(|u| {
            let label = first_names.remove(&u.id).unwrap_or(u.email);
            (u.id, label)
        })
        .collect())
}
