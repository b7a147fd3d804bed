//! Tag repository.

use std::sync::Arc;

use crate::entities::{PinTag, Tag, pin_tag, tag};
use chrono::Utc;
use sea_orm::sea_query::{Alias, Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use serde::Serialize;
use travelboard_common::{AppError, AppResult};

use super::{contains_pattern, lower_like};

/// Tag with the number of pins linked to it.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagWithCount {
    pub id: String,
    pub name: String,
    pub pin_count: i64,
}

/// Tag repository for database operations.
#[derive(Clone)]
pub struct TagRepository {
    db: Arc<DatabaseConnection>,
}

impl TagRepository {
    /// Create a new tag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Tags linked to a pin, by name.
    pub async fn find_by_pin(&self, pin_id: &str) -> AppResult<Vec<tag::Model>> {
        Tag::find()
            .join(JoinType::InnerJoin, tag::Relation::PinTags.def())
            .filter(pin_tag::Column::PinId.eq(pin_id))
            .order_by_asc(tag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags whose name contains `query`, most used first.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<TagWithCount>> {
        let pattern = contains_pattern(query);

        Self::with_counts()
            .filter(lower_like((tag::Entity, tag::Column::Name), &pattern))
            .limit(limit)
            .into_model::<TagWithCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Most used tags.
    pub async fn find_popular(&self, limit: u64) -> AppResult<Vec<TagWithCount>> {
        Self::with_counts()
            .limit(limit)
            .into_model::<TagWithCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tags grouped with their pin counts, ordered by count then name.
    fn with_counts() -> Select<Tag> {
        Tag::find()
            .select_only()
            .column(tag::Column::Id)
            .column(tag::Column::Name)
            .column_as(
                Expr::col((pin_tag::Entity, pin_tag::Column::PinId)).count(),
                "pin_count",
            )
            .join(JoinType::LeftJoin, tag::Relation::PinTags.def())
            .group_by(tag::Column::Id)
            .group_by(tag::Column::Name)
            .order_by_desc(Expr::col(Alias::new("pin_count")))
            .order_by_asc(tag::Column::Name)
    }

    /// Link `names` to a pin, creating missing tags.
    ///
    /// `candidates` pairs a fresh id with each normalised name; the id is only
    /// used when the tag does not exist yet.
    pub async fn attach_to_pin<C: ConnectionTrait>(
        conn: &C,
        pin_id: &str,
        candidates: &[(String, String)],
    ) -> AppResult<()> {
        if candidates.is_empty() {
            return Ok(());
        }

        let now = Utc::now();
        for (id, name) in candidates {
            Tag::insert(tag::ActiveModel {
                id: Set(id.clone()),
                name: Set(name.clone()),
                created_at: Set(now.into()),
            })
            .on_conflict(OnConflict::column(tag::Column::Name).do_nothing().to_owned())
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        let names: Vec<&str> = candidates.iter().map(|(_, name)| name.as_str()).collect();
        let tag_ids: Vec<String> = Tag::find()
            .select_only()
            .column(tag::Column::Id)
            .filter(tag::Column::Name.is_in(names))
            .into_tuple()
            .all(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if tag_ids.is_empty() {
            return Ok(());
        }

        PinTag::insert_many(tag_ids.into_iter().map(|tag_id| pin_tag::ActiveModel {
            pin_id: Set(pin_id.to_string()),
            tag_id: Set(tag_id),
        }))
        .on_conflict(
            OnConflict::columns([pin_tag::Column::PinId, pin_tag::Column::TagId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Remove every tag link of a pin.
    pub async fn detach_all<C: ConnectionTrait>(conn: &C, pin_id: &str) -> AppResult<()> {
        PinTag::delete_many()
            .filter(pin_tag::Column::PinId.eq(pin_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
