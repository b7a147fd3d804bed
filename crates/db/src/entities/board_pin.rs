//! Board pin entity - a pin placed on a board.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "board_pin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub board_id: String,

    pub pin_id: String,

    /// Position within the board. Only comparable to siblings; gaps allowed.
    pub display_order: i32,

    /// Board-specific note about the pin.
    #[sea_orm(column_type = "Text", nullable)]
    pub board_notes: Option<String>,

    /// Board-specific relevance label ("must-see", "maybe", ...).
    #[sea_orm(nullable)]
    pub relevance: Option<String>,

    /// User who placed the pin on the board.
    pub added_by: String,

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
    #[sea_orm(
        belongs_to = "super::pin::Entity",
        from = "Column::PinId",
        to = "super::pin::Column::Id",
        on_delete = "Cascade"
    )]
    Pin,
}

impl Related<super::board::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Board.def()
    }
}

impl Related<super::pin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
