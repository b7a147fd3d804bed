//! Timeline day entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A day of an itinerary-style board.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "timeline_day")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub board_id: String,

    /// Caller-supplied day index, unique per board.
    pub day_number: i32,

    #[sea_orm(nullable)]
    pub title: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,

    /// Calendar date, if the trip has fixed dates.
    #[sea_orm(nullable)]
    pub date: Option<Date>,

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
    #[sea_orm(has_many = "super::timeline_pin::Entity")]
    Pins,
}

impl Related<super::board::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Board.def()
    }
}

impl Related<super::timeline_pin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
