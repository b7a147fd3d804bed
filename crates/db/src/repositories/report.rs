//! Pin report repository.
//!
//! Reports share the unique-pair shape of toggles but are never withdrawn:
//! a second report by the same user is a no-op.

use std::sync::Arc;

use crate::entities::{PinReport, pin_report};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use travelboard_common::{AppError, AppResult};

/// Pin report repository for database operations.
#[derive(Clone)]
pub struct PinReportRepository {
    db: Arc<DatabaseConnection>,
}

impl PinReportRepository {
    /// Create a new pin report repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a report unless the user already reported the pin.
    ///
    /// Returns `true` when a new row was written.
    pub async fn create_if_absent(
        &self,
        id: String,
        user_id: &str,
        pin_id: &str,
        reason: Option<String>,
    ) -> AppResult<bool> {
        let inserted = PinReport::insert(pin_report::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            pin_id: Set(pin_id.to_string()),
            reason: Set(reason),
            created_at: Set(Utc::now().into()),
        })
        .on_conflict(
            OnConflict::columns([pin_report::Column::UserId, pin_report::Column::PinId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db.as_ref())
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Whether `user_id` has reported `pin_id`.
    pub async fn exists(&self, user_id: &str, pin_id: &str) -> AppResult<bool> {
        let count = PinReport::find()
            .filter(pin_report::Column::UserId.eq(user_id))
            .filter(pin_report::Column::PinId.eq(pin_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Number of reports on a pin.
    pub async fn count_by_pin(&self, pin_id: &str) -> AppResult<u64> {
        PinReport::find()
            .filter(pin_report::Column::PinId.eq(pin_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
