//! Board comment repository.

use std::sync::Arc;

use crate::entities::{BoardComment, CommentReaction, board_comment, comment_reaction};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use travelboard_common::{AppError, AppResult};

/// Number of reactions with one emoji on one comment.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionCount {
    pub comment_id: String,
    pub emoji: String,
    pub count: i64,
}

/// Board comment repository for database operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<board_comment::Model>> {
        BoardComment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a comment by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<board_comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment: {id}")))
    }

    /// Insert a comment.
    pub async fn create(
        &self,
        model: board_comment::ActiveModel,
    ) -> AppResult<board_comment::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Comments of a board: pinned first, then newest first.
    pub async fn find_by_board(
        &self,
        board_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board_comment::Model>> {
        BoardComment::find()
            .filter(board_comment::Column::BoardId.eq(board_id))
            .order_by_desc(board_comment::Column::IsPinned)
            .order_by_desc(board_comment::Column::CreatedAt)
            .order_by_desc(board_comment::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Set or clear the pinned flag.
    pub async fn set_pinned(&self, id: &str, pinned: bool) -> AppResult<()> {
        BoardComment::update_many()
            .col_expr(board_comment::Column::IsPinned, Expr::value(pinned))
            .filter(board_comment::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete a comment and its reactions in one transaction.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        CommentReaction::delete_many()
            .filter(comment_reaction::Column::CommentId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        BoardComment::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Reaction counts per (comment, emoji) for the given comments.
    pub async fn reaction_counts(&self, comment_ids: &[String]) -> AppResult<Vec<ReactionCount>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        CommentReaction::find()
            .select_only()
            .column(comment_reaction::Column::CommentId)
            .column(comment_reaction::Column::Emoji)
            .column_as(Expr::col(comment_reaction::Column::Id).count(), "count")
            .filter(
                comment_reaction::Column::CommentId.is_in(comment_ids.iter().map(String::as_str)),
            )
            .group_by(comment_reaction::Column::CommentId)
            .group_by(comment_reaction::Column::Emoji)
            .order_by_asc(comment_reaction::Column::Emoji)
            .into_model::<ReactionCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn create_test_comment(id: &str, is_pinned: bool) -> board_comment::Model {
        board_comment::Model {
            id: id.to_string(),
            board_id: "board1".to_string(),
            user_id: "user1".to_string(),
            content: "Book the ryokan early".to_string(),
            is_pinned,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_board() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_comment("c1", true),
                    create_test_comment("c3", false),
                ]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let result = repo.find_by_board("board1", 20, 0).await.unwrap();

        assert!(result[0].is_pinned);
    }

    #[tokio::test]
    async fn test_delete_runs_in_transaction() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        repo.delete("c1").await.unwrap();
    }

    #[tokio::test]
    async fn test_reaction_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "comment_id" => Value::from("c1"),
                    "emoji" => Value::from("🍜"),
                    "count" => Value::BigInt(Some(4)),
                }]])
                .into_connection(),
        );

        let repo = CommentRepository::new(db);
        let counts = repo.reaction_counts(&["c1".to_string()]).await.unwrap();

        assert_eq!(counts[0].count, 4);
    }
}
