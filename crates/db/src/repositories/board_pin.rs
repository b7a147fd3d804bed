//! Board pin repository: the ordered pin collection of a board.

use std::sync::Arc;

use crate::entities::{
    BoardPin, Pin, TimelineDay, TimelinePin, board_activity, board_pin, pin, timeline_day,
    timeline_pin,
};
use chrono::Utc;
use sea_orm::sea_query::{OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use travelboard_common::{AppError, AppResult};

use super::ActivityRepository;
use super::ordering::{check_reorder_list, rewrite_positions, tail_position};

/// Board pin repository for database operations.
#[derive(Clone)]
pub struct BoardPinRepository {
    db: Arc<DatabaseConnection>,
}

impl BoardPinRepository {
    /// Create a new board pin repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a relation row by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<board_pin::Model>> {
        BoardPin::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Relation row placing `pin_id` on `board_id`, if any.
    pub async fn find(&self, board_id: &str, pin_id: &str) -> AppResult<Option<board_pin::Model>> {
        BoardPin::find()
            .filter(board_pin::Column::BoardId.eq(board_id))
            .filter(board_pin::Column::PinId.eq(pin_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Pins of a board in display order.
    ///
    /// Ties (possible after concurrent appends) fall back to insertion time.
    pub async fn find_by_board(
        &self,
        board_id: &str,
    ) -> AppResult<Vec<(board_pin::Model, Option<pin::Model>)>> {
        BoardPin::find()
            .find_also_related(Pin)
            .filter(board_pin::Column::BoardId.eq(board_id))
            .order_by_asc(board_pin::Column::DisplayOrder)
            .order_by_asc(board_pin::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Place `pin_id` at the tail of `board_id`.
    ///
    /// A pin already on the board is a validation error, including when a
    /// concurrent request added it first.
    pub async fn append(
        &self,
        id: String,
        board_id: &str,
        pin_id: &str,
        added_by: &str,
        board_notes: Option<String>,
        relevance: Option<String>,
    ) -> AppResult<board_pin::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let position = tail_position::<BoardPin, _>(
            &txn,
            board_pin::Column::BoardId,
            board_id,
            board_pin::Column::DisplayOrder,
        )
        .await?;

        let relation = board_pin::Model {
            id,
            board_id: board_id.to_string(),
            pin_id: pin_id.to_string(),
            display_order: position,
            board_notes,
            relevance,
            added_by: added_by.to_string(),
            created_at: Utc::now().into(),
        };

        let inserted = BoardPin::insert(board_pin::ActiveModel {
            id: Set(relation.id.clone()),
            board_id: Set(relation.board_id.clone()),
            pin_id: Set(relation.pin_id.clone()),
            display_order: Set(relation.display_order),
            board_notes: Set(relation.board_notes.clone()),
            relevance: Set(relation.relevance.clone()),
            added_by: Set(relation.added_by.clone()),
            created_at: Set(relation.created_at),
        })
        .on_conflict(
            OnConflict::columns([board_pin::Column::BoardId, board_pin::Column::PinId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if inserted == 0 {
            return Err(AppError::Validation(
                "Pin is already on this board".to_string(),
            ));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(board_id = %board_id, pin_id = %pin_id, position, "Appended pin");
        Ok(relation)
    }

    /// Rewrite positions to match `ordered_ids` (relation row IDs) and log
    /// the reorder, all in one transaction.
    ///
    /// When no row matched, nothing is written, not even the log row.
    pub async fn reorder(
        &self,
        board_id: &str,
        ordered_ids: &[String],
        entry: board_activity::ActiveModel,
    ) -> AppResult<u64> {
        check_reorder_list(ordered_ids)?;
        if ordered_ids.is_empty() {
            return Ok(0);
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = rewrite_positions::<BoardPin, _>(
            &txn,
            board_pin::Column::Id,
            board_pin::Column::BoardId,
            board_id,
            board_pin::Column::DisplayOrder,
            ordered_ids,
        )
        .await?;

        if updated == 0 {
            return Ok(0);
        }

        ActivityRepository::append(&txn, entry).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            board_id = %board_id,
            requested = ordered_ids.len(),
            updated,
            "Reordered board pins"
        );
        Ok(updated)
    }

    /// Update a relation row (notes, relevance).
    pub async fn update(&self, model: board_pin::ActiveModel) -> AppResult<board_pin::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Remove `pin_id` from `board_id` without renumbering the rest.
    ///
    /// The pin is also taken off every timeline day of the board, in the same
    /// transaction. Returns whether a row existed.
    pub async fn remove(&self, board_id: &str, pin_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = BoardPin::delete_many()
            .filter(board_pin::Column::BoardId.eq(board_id))
            .filter(board_pin::Column::PinId.eq(pin_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        let unscheduled = TimelinePin::delete_many()
            .filter(timeline_pin::Column::PinId.eq(pin_id))
            .filter(
                timeline_pin::Column::DayId.in_subquery(
                    Query::select()
                        .column(timeline_day::Column::Id)
                        .from(TimelineDay)
                        .and_where(timeline_day::Column::BoardId.eq(board_id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            board_id = %board_id,
            pin_id = %pin_id,
            unscheduled = unscheduled.rows_affected,
            "Removed pin from board"
        );
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use board_activity::ActivityType;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use serde_json::json;

    fn reorder_entry() -> board_activity::ActiveModel {
        ActivityRepository::entry(
            "act1".to_string(),
            "board1",
            "user1",
            ActivityType::SettingsUpdated,
            json!({"action": "pins_reordered"}),
        )
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_append_to_empty_board_starts_at_zero() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "max_order" => Value::Int(None)
                }]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db.clone());
        let relation = repo
            .append("rel1".to_string(), "board1", "pin1", "user2", None, None)
            .await
            .unwrap();
        assert_eq!(relation.display_order, 0);

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("MAX"));
    }

    #[tokio::test]
    async fn test_append_goes_after_current_max() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "max_order" => Value::Int(Some(1))
                }]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db.clone());
        let relation = repo
            .append("rel3".to_string(), "board1", "pin3", "user2", None, None)
            .await
            .unwrap();
        assert_eq!(relation.display_order, 2);

        drop(repo);
        let log = Arc::try_unwrap(db).ok().unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("Int(Some(2))"));
    }

    #[tokio::test]
    async fn test_append_existing_pin_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "max_order" => Value::Int(Some(0))
                }]])
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db.clone());
        let result = repo
            .append("rel2".to_string(), "board1", "pin1", "user2", None, None)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        drop(repo);
        let sql = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(sql.contains("ON CONFLICT"));
    }

    #[tokio::test]
    async fn test_remove_unschedules_pin_from_board_days() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(2)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db.clone());
        assert!(repo.remove("board1", "pin1").await.unwrap());

        drop(repo);
        let sql = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        let relation_at = sql.find("DELETE FROM \\\"board_pin\\\"").unwrap();
        let schedule_at = sql.find("DELETE FROM \\\"timeline_pin\\\"").unwrap();
        assert!(relation_at < schedule_at);
        assert!(sql.contains("timeline_day"));
    }

    #[tokio::test]
    async fn test_remove_missing_pin_touches_no_schedule() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db.clone());
        assert!(!repo.remove("board1", "pin9").await.unwrap());

        drop(repo);
        let sql = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(!sql.contains("timeline_pin"));
    }

    #[tokio::test]
    async fn test_reorder_updates_each_row_and_logs() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(1), exec(1)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db);
        let updated = repo
            .reorder("board1", &["rel3".to_string(), "rel1".to_string()], reorder_entry())
            .await
            .unwrap();

        assert_eq!(updated, 2);
    }

    #[tokio::test]
    async fn test_reorder_ignores_unknown_ids() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(1), exec(0), exec(1)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db);
        let updated = repo
            .reorder(
                "board1",
                &["rel1".to_string(), "elsewhere".to_string()],
                reorder_entry(),
            )
            .await
            .unwrap();

        assert_eq!(updated, 1);
    }

    #[tokio::test]
    async fn test_reorder_without_matches_skips_log() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec(0), exec(0)])
                .into_connection(),
        );

        let repo = BoardPinRepository::new(db.clone());
        let updated = repo
            .reorder(
                "board1",
                &["gone1".to_string(), "gone2".to_string()],
                reorder_entry(),
            )
            .await
            .unwrap();
        assert_eq!(updated, 0);

        drop(repo);
        let sql = format!("{:?}", Arc::try_unwrap(db).ok().unwrap().into_transaction_log());
        assert!(!sql.contains("board_activity"));
    }

    #[tokio::test]
    async fn test_reorder_empty_list_writes_nothing() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = BoardPinRepository::new(db.clone());
        let updated = repo.reorder("board1", &[], reorder_entry()).await.unwrap();
        assert_eq!(updated, 0);

        drop(repo);
        assert!(Arc::try_unwrap(db).ok().unwrap().into_transaction_log().is_empty());
    }

    #[tokio::test]
    async fn test_reorder_rejects_duplicates() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = BoardPinRepository::new(db);
        let result = repo
            .reorder(
                "board1",
                &["rel1".to_string(), "rel1".to_string()],
                reorder_entry(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
