//! Pin report entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user flagging a pin. At most one per (user_id, pin_id); not a toggle.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pin_report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user who submitted the report.
    pub user_id: String,

    /// The reported pin.
    pub pin_id: String,

    /// Free-text reason.
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pin::Entity",
        from = "Column::PinId",
        to = "super::pin::Column::Id",
        on_delete = "Cascade"
    )]
    Pin,
}

impl Related<super::pin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
