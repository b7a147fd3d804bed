//! Board activity log entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of board mutation recorded in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityType {
    #[sea_orm(string_value = "CREATED")]
    Created,
    #[sea_orm(string_value = "BOARD_ARCHIVED")]
    BoardArchived,
    #[sea_orm(string_value = "BOARD_RESTORED")]
    BoardRestored,
    /// Settings edits and pin reorders; metadata says which.
    #[sea_orm(string_value = "SETTINGS_UPDATED")]
    SettingsUpdated,
    #[sea_orm(string_value = "PIN_ADDED")]
    PinAdded,
    #[sea_orm(string_value = "PIN_REMOVED")]
    PinRemoved,
    #[sea_orm(string_value = "MEMBER_ADDED")]
    MemberAdded,
    #[sea_orm(string_value = "MEMBER_REMOVED")]
    MemberRemoved,
}

/// Append-only. Rows disappear only with their board.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board_activity")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub board_id: String,

    pub actor_id: String,

    pub activity_type: ActivityType,

    /// Structured detail, e.g. `{"action": "pins_reordered"}`.
    pub metadata: Json,

    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::board::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Board.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
