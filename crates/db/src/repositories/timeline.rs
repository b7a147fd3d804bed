//! Timeline repository: days of a board and the ordered pins inside each day.

use std::sync::Arc;

use crate::entities::{Pin, TimelineDay, TimelinePin, pin, timeline_day, timeline_pin};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use travelboard_common::{AppError, AppResult};

use super::ordering::{check_reorder_list, rewrite_positions, tail_position};

/// Timeline repository for database operations.
#[derive(Clone)]
pub struct TimelineRepository {
    db: Arc<DatabaseConnection>,
}

impl TimelineRepository {
    /// Create a new timeline repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Days ====================

    /// Find a day by ID.
    pub async fn find_day(&self, id: &str) -> AppResult<Option<timeline_day::Model>> {
        TimelineDay::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a day by ID, returning an error if not found.
    pub async fn get_day(&self, id: &str) -> AppResult<timeline_day::Model> {
        self.find_day(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Timeline day: {id}")))
    }

    /// Days of a board by day number.
    pub async fn find_days_by_board(&self, board_id: &str) -> AppResult<Vec<timeline_day::Model>> {
        TimelineDay::find()
            .filter(timeline_day::Column::BoardId.eq(board_id))
            .order_by_asc(timeline_day::Column::DayNumber)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether another day of the board already uses `day_number`.
    pub async fn day_number_taken(
        &self,
        board_id: &str,
        day_number: i32,
        except_day_id: Option<&str>,
    ) -> AppResult<bool> {
        let mut query = TimelineDay::find()
            .filter(timeline_day::Column::BoardId.eq(board_id))
            .filter(timeline_day::Column::DayNumber.eq(day_number));

        if let Some(id) = except_day_id {
            query = query.filter(timeline_day::Column::Id.ne(id));
        }

        let count = query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Insert a day.
    pub async fn create_day(
        &self,
        model: timeline_day::ActiveModel,
    ) -> AppResult<timeline_day::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a day.
    pub async fn update_day(
        &self,
        model: timeline_day::ActiveModel,
    ) -> AppResult<timeline_day::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a day and its pin assignments in one transaction.
    pub async fn delete_day(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        TimelinePin::delete_many()
            .filter(timeline_pin::Column::DayId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        TimelineDay::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    // ==================== Day pins ====================

    /// Assignments of the given days with their pins, by day then position.
    pub async fn find_pins_by_days(
        &self,
        day_ids: &[String],
    ) -> AppResult<Vec<(timeline_pin::Model, Option<pin::Model>)>> {
        if day_ids.is_empty() {
            return Ok(vec![]);
        }

        TimelinePin::find()
            .find_also_related(Pin)
            .filter(timeline_pin::Column::DayId.is_in(day_ids.iter().map(String::as_str)))
            .order_by_asc(timeline_pin::Column::DayId)
            .order_by_asc(timeline_pin::Column::DisplayOrder)
            .order_by_asc(timeline_pin::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Assignment of `pin_id` to `day_id`, if any.
    pub async fn find_assignment(
        &self,
        day_id: &str,
        pin_id: &str,
    ) -> AppResult<Option<timeline_pin::Model>> {
        TimelinePin::find()
            .filter(timeline_pin::Column::DayId.eq(day_id))
            .filter(timeline_pin::Column::PinId.eq(pin_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Place `pin_id` at the tail of `day_id`.
    ///
    /// A pin already on the day is a validation error, including when a
    /// concurrent request scheduled it first.
    pub async fn assign(
        &self,
        id: String,
        day_id: &str,
        pin_id: &str,
    ) -> AppResult<timeline_pin::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let position = tail_position::<TimelinePin, _>(
            &txn,
            timeline_pin::Column::DayId,
            day_id,
            timeline_pin::Column::DisplayOrder,
        )
        .await?;

        let assignment = timeline_pin::Model {
            id,
            day_id: day_id.to_string(),
            pin_id: pin_id.to_string(),
            display_order: position,
            created_at: Utc::now().into(),
        };

        let inserted = TimelinePin::insert(timeline_pin::ActiveModel {
            id: Set(assignment.id.clone()),
            day_id: Set(assignment.day_id.clone()),
            pin_id: Set(assignment.pin_id.clone()),
            display_order: Set(assignment.display_order),
            created_at: Set(assignment.created_at),
        })
        .on_conflict(
            OnConflict::columns([timeline_pin::Column::DayId, timeline_pin::Column::PinId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if inserted == 0 {
            return Err(AppError::Validation(
                "Pin is already scheduled on this day".to_string(),
            ));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(day_id = %day_id, pin_id = %pin_id, position, "Assigned pin to day");
        Ok(assignment)
    }

    /// Rewrite positions inside a day to match `ordered_ids` (assignment IDs).
    pub async fn reorder_day(&self, day_id: &str, ordered_ids: &[String]) -> AppResult<u64> {
        check_reorder_list(ordered_ids)?;
        if ordered_ids.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = rewrite_positions::<TimelinePin, _>(
            &txn,
            timeline_pin::Column::Id,
            timeline_pin::Column::DayId,
            day_id,
            timeline_pin::Column::DisplayOrder,
            ordered_ids,
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            day_id = %day_id,
            requested = ordered_ids.len(),
            updated,
            "Reordered day pins"
        );
        Ok(updated)
    }

    /// Remove `pin_id` from `day_id` without renumbering. Returns whether a
    /// row existed.
    pub async fn unassign(&self, day_id: &str, pin_id: &str) -> AppResult<bool> {
        let result = TimelinePin::delete_many()
            .filter(timeline_pin::Column::DayId.eq(day_id))
            .filter(timeline_pin::Column::PinId.eq(pin_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
