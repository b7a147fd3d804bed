//! Pin entity - a single place or piece of media.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pin")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Creator of the pin
    pub user_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Free-form place name ("Fushimi Inari, Kyoto")
    #[sea_orm(nullable)]
    pub location: Option<String>,

    /// Durable URL returned by object storage
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    /// Outbound link (booking page, article, ...)
    #[sea_orm(nullable)]
    pub link: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
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
    #[sea_orm(has_many = "super::board_pin::Entity")]
    BoardPins,
    #[sea_orm(has_many = "super::pin_tag::Entity")]
    PinTags,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::board_pin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BoardPins.def()
    }
}

impl Related<super::pin_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PinTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
