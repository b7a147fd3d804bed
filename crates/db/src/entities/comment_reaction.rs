//! Comment reaction entity (emoji reactions to board comments).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Unique on (user_id, comment_id, emoji): one row per emoji per user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment_reaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub user_id: String,

    pub comment_id: String,

    /// The reaction emoji (e.g. "👍", ":sushi:")
    pub emoji: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,

    #[sea_orm(
        belongs_to = "super::board_comment::Entity",
        from = "Column::CommentId",
        to = "super::board_comment::Column::Id",
        on_delete = "Cascade"
    )]
    Comment,
}

impl Related<super::board_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
