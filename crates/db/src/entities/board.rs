//! Board entity - a user-owned collection of pins.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Who can see a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardVisibility {
    /// Owner and listed members only.
    #[sea_orm(string_value = "PRIVATE")]
    Private,
    /// Everyone, including anonymous visitors and search.
    #[sea_orm(string_value = "PUBLIC")]
    Public,
    /// Any authenticated user, as an implicit viewer.
    #[sea_orm(string_value = "SHARED")]
    Shared,
}

impl Default for BoardVisibility {
    fn default() -> Self {
        Self::Private
    }
}

/// How the board arranges its pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardLayout {
    #[sea_orm(string_value = "MASONRY")]
    Masonry,
    /// Pins grouped into timeline days.
    #[sea_orm(string_value = "TIMELINE")]
    Timeline,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self::Masonry
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The single owner. Owners have no membership row.
    #[sea_orm(indexed)]
    pub owner_id: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Trip category ("city", "roadtrip", ...)
    #[sea_orm(nullable)]
    pub category: Option<String>,

    #[sea_orm(nullable)]
    pub cover_image_url: Option<String>,

    pub visibility: BoardVisibility,

    pub layout: BoardLayout,

    #[sea_orm(default_value = false)]
    pub is_archived: bool,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Owner,
    #[sea_orm(has_many = "super::board_member::Entity")]
    Members,
    #[sea_orm(has_many = "super::board_pin::Entity")]
    BoardPins,
    #[sea_orm(has_many = "super::timeline_day::Entity")]
    TimelineDays,
    #[sea_orm(has_many = "super::board_activity::Entity")]
    Activities,
    #[sea_orm(has_many = "super::board_comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::board_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::board_pin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoardPins.def()
    }
}

impl Related<super::timeline_day::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimelineDays.def()
    }
}

impl Related<super::board_activity::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Activities.def()
    }
}

impl Related<super::board_comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
