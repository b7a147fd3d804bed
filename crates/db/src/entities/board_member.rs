//! Board member entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a collaborator on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardRole {
    /// Owner-equivalent. Never granted through membership by this core, but
    /// honoured if present.
    #[sea_orm(string_value = "OWNER")]
    Owner,
    /// Full management except deleting the board.
    #[sea_orm(string_value = "CO_ADMIN")]
    CoAdmin,
    /// May add pins and manage timeline content.
    #[sea_orm(string_value = "CAN_ADD_PINS")]
    CanAddPins,
    /// Read-only collaborator.
    #[sea_orm(string_value = "VIEWER")]
    Viewer,
}

impl BoardRole {
    /// Whether the role carries the owner/co-admin capability set.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Owner | Self::CoAdmin)
    }
}

/// One row per (board, user); enforced by a unique index.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub board_id: String,

    #[sea_orm(indexed)]
    pub user_id: String,

    pub role: BoardRole,

    /// Who granted the membership.
    #[sea_orm(nullable)]
    pub invited_by: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::board::Entity",
        from = "Column::BoardId",
        to = "super::board::Column::Id",
        on_delete = "Cascade"
    )]
    Board,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::board::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Board.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
