//! Board activity log repository.
//!
//! The log is append-only: there is no update and no targeted delete. Rows
//! only disappear together with their board.

use std::sync::Arc;

use crate::entities::{BoardActivity, board_activity};
use board_activity::ActivityType;
use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use travelboard_common::{AppError, AppResult};

/// Activity repository for database operations.
#[derive(Clone)]
pub struct ActivityRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivityRepository {
    /// Create a new activity repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Build a log row stamped with the current time.
    #[must_use]
    pub fn entry(
        id: String,
        board_id: &str,
        actor_id: &str,
        activity_type: ActivityType,
        metadata: serde_json::Value,
    ) -> board_activity::ActiveModel {
        board_activity::ActiveModel {
            id: Set(id),
            board_id: Set(board_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            activity_type: Set(activity_type),
            metadata: Set(metadata),
            created_at: Set(Utc::now().into()),
        }
    }

    /// Append a row on `conn`, which may be an open transaction.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        entry: board_activity::ActiveModel,
    ) -> AppResult<()> {
        BoardActivity::insert(entry)
            .exec_without_returning(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Append a row outside any transaction.
    pub async fn record(&self, entry: board_activity::ActiveModel) -> AppResult<()> {
        Self::append(self.db.as_ref(), entry).await
    }

    /// Activity of a board, newest first.
    pub async fn find_by_board(
        &self,
        board_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board_activity::Model>> {
        BoardActivity::find()
            .filter(board_activity::Column::BoardId.eq(board_id))
            .order_by_desc(board_activity::Column::CreatedAt)
            .order_by_desc(board_activity::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    fn create_test_activity(id: &str, activity_type: ActivityType) -> board_activity::Model {
        board_activity::Model {
            id: id.to_string(),
            board_id: "board1".to_string(),
            actor_id: "user1".to_string(),
            activity_type,
            metadata: json!({}),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_entry_sets_all_fields() {
        let entry = ActivityRepository::entry(
            "act1".to_string(),
            "board1",
            "user1",
            ActivityType::SettingsUpdated,
            json!({"action": "pins_reordered"}),
        );

        assert_eq!(entry.board_id.as_ref(), "board1");
        assert_eq!(
            entry.metadata.as_ref(),
            &json!({"action": "pins_reordered"})
        );
    }

    #[tokio::test]
    async fn test_record() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ActivityRepository::new(db);
        let entry = ActivityRepository::entry(
            "act1".to_string(),
            "board1",
            "user1",
            ActivityType::PinAdded,
            json!({"pinId": "pin1"}),
        );

        repo.record(entry).await.unwrap();
    }

    #[tokio::test]
    async fn test_find_by_board() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_activity("act2", ActivityType::SettingsUpdated),
                    create_test_activity("act1", ActivityType::Created),
                ]])
                .into_connection(),
        );

        let repo = ActivityRepository::new(db);
        let result = repo.find_by_board("board1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[1].activity_type, ActivityType::Created);
    }
}
