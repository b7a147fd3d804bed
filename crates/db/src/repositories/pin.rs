//! Pin repository.

use std::sync::Arc;

use crate::entities::{Pin, pin};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use travelboard_common::{AppError, AppResult};

use super::{TagRepository, contains_pattern, lower_like};

/// Pin repository for database operations.
#[derive(Clone)]
pub struct PinRepository {
    db: Arc<DatabaseConnection>,
}

impl PinRepository {
    /// Create a new pin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a pin by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<pin::Model>> {
        Pin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a pin by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<pin::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Pin: {id}")))
    }

    /// Insert a pin together with its tag links.
    pub async fn create_with_tags(
        &self,
        model: pin::ActiveModel,
        tags: &[(String, String)],
    ) -> AppResult<pin::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let pin = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        TagRepository::attach_to_pin(&txn, &pin.id, tags).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(pin)
    }

    /// Update a pin, optionally replacing its tag set.
    pub async fn update_with_tags(
        &self,
        model: pin::ActiveModel,
        tags: Option<&[(String, String)]>,
    ) -> AppResult<pin::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let pin = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(tags) = tags {
            TagRepository::detach_all(&txn, &pin.id).await?;
            TagRepository::attach_to_pin(&txn, &pin.id, tags).await?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(pin)
    }

    /// Delete a pin. Relations cascade at the schema level.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Pin::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Pins created by a user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<pin::Model>> {
        Pin::find()
            .filter(pin::Column::UserId.eq(user_id))
            .order_by_desc(pin::Column::CreatedAt)
            .order_by_desc(pin::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count pins created by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Pin::find()
            .filter(pin::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pins with the given IDs, in no particular order.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<pin::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Pin::find()
            .filter(pin::Column::Id.is_in(ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Case-insensitive substring search over title, description and
    /// location, newest first.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<pin::Model>> {
        let pattern = contains_pattern(query);

        Pin::find()
            .filter(
                Condition::any()
                    .add(lower_like(pin::Column::Title, &pattern))
                    .add(lower_like(pin::Column::Description, &pattern))
                    .add(lower_like(pin::Column::Location, &pattern)),
            )
            .order_by_desc(pin::Column::CreatedAt)
            .order_by_desc(pin::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
