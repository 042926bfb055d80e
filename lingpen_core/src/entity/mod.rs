// SeaORM entities for the lingpen schema.
// Comments are the interesting part: post_comment and blog_comment are
// self-referential adjacency lists materialized into trees by the services.

pub mod blog;
pub mod blog_comment;
pub mod blog_like;
pub mod post;
pub mod post_comment;
pub mod post_like;
pub mod profile;
pub mod user;


pub mod prelude {
    pub use super::blog::{
        ActiveModel as BlogActiveModel, Column as BlogColumn, Entity as Blog, Model as BlogModel,
    };
    pub use super::blog_comment::{
        ActiveModel as BlogCommentActiveModel, Column as BlogCommentColumn, Entity as BlogComment,
        Model as BlogCommentModel,
    };
    pub use super::blog_like::{
        ActiveModel as BlogLikeActiveModel, Column as BlogLikeColumn, Entity as BlogLike,
        Model as BlogLikeModel,
    };
    pub use super::post::{
        ActiveModel as PostActiveModel, Column as PostColumn, Entity as Post, Model as PostModel,
    };
    pub use super::post_comment::{
        ActiveModel as PostCommentActiveModel, Column as PostCommentColumn, Entity as PostComment,
        Model as PostCommentModel,
    };
    pub use super::post_like::{
        ActiveModel as PostLikeActiveModel, Column as PostLikeColumn, Entity as PostLike,
        Model as PostLikeModel,
    };
    pub use super::profile::{
        ActiveModel as ProfileActiveModel, Column as ProfileColumn, Entity as Profile,
        Model as ProfileModel,
    };
    pub use super::user::{
        ActiveModel as UserActiveModel, Column as UserColumn, Entity as User, Model as UserModel,
    };

    // Re-export commonly used SeaORM types and traits
    pub use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
        DatabaseTransaction, DbConn, DbErr, EntityTrait, ModelTrait, NotSet, PaginatorTrait,
        QueryFilter, QueryOrder, QuerySelect, Related, Set, TransactionTrait, Unchanged,
    };
}
