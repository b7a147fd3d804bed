//! Tag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Global tag. Popularity is the number of linked pins, counted at read time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Lowercase tag name, without '#'
    #[sea_orm(unique)]
    pub name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::pin_tag::Entity")]
    PinTags,
}

impl Related<super::pin_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PinTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
