use crate::ids::{BlogId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "blog")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: BlogId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    /// Derived from the body at create/update time.
    pub excerpt: Option<String>,
    /// Comma-separated tags.
    pub tags: Option<String>,
    pub category: Option<String>,
    /// Estimated reading time in minutes, derived from the body.
    pub reading_time: Option<i32>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::blog_comment::Entity")]
    BlogComment,
    #[sea_orm(has_many = "super::blog_like::Entity")]
    BlogLike,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::blog_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogComment.def()
    }
}

impl Related<super::blog_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BlogLike.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
