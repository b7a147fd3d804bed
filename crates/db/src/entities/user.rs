//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Subject identifier issued by the identity provider
    #[sea_orm(unique)]
    pub external_id: String,

    /// Public handle
    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(nullable)]
    pub first_name: Option<String>,

    #[sea_orm(nullable)]
    pub last_name: Option<String>,

    #[sea_orm(nullable)]
    pub email: Option<String>,

    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::board::Entity")]
    Boards,
    #[sea_orm(has_many = "super::pin::Entity")]
    Pins,
}

impl Related<super::board::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Boards.def()
    }
}

impl Related<super::pin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pins.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
