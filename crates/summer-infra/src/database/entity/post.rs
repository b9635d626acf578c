//! Post entity for SeaORM.
//!
//! The `liked_by` set lives in [`super::post_like`]; a row here only carries
//! the denormalized counter.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub likes: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::post_like::Entity")]
    PostLike,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostLike.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain post from this row and its like set.
    pub fn into_domain(self, liked_by: Vec<Uuid>) -> summer_core::domain::Post {
        summer_core::domain::Post {
            id: self.id,
            user_id: self.user_id,
            content: self.content,
            likes: self.likes,
            liked_by,
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel. The like set is
/// persisted separately.
impl From<summer_core::domain::Post> for ActiveModel {
    fn from(post: summer_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            user_id: Set(post.user_id),
            content: Set(post.content),
            likes: Set(post.likes),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
