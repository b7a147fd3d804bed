//! Board membership repository.

use std::sync::Arc;

use crate::entities::{BoardMember, User, board_member, user};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use travelboard_common::{AppError, AppResult};

/// Board member repository for database operations.
#[derive(Clone)]
pub struct BoardMemberRepository {
    db: Arc<DatabaseConnection>,
}

impl BoardMemberRepository {
    /// Create a new board member repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Membership row of `user_id` on `board_id`, if any.
    pub async fn find(
        &self,
        board_id: &str,
        user_id: &str,
    ) -> AppResult<Option<board_member::Model>> {
        BoardMember::find()
            .filter(board_member::Column::BoardId.eq(board_id))
            .filter(board_member::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Members of a board with their user records, oldest membership first.
    pub async fn find_by_board(
        &self,
        board_id: &str,
    ) -> AppResult<Vec<(board_member::Model, Option<user::Model>)>> {
        BoardMember::find()
            .find_also_related(User)
            .filter(board_member::Column::BoardId.eq(board_id))
            .order_by_asc(board_member::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a membership row.
    pub async fn create(&self, model: board_member::ActiveModel) -> AppResult<board_member::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a membership row.
    pub async fn update(&self, model: board_member::ActiveModel) -> AppResult<board_member::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete the membership of `user_id`. Returns whether a row existed.
    pub async fn delete(&self, board_id: &str, user_id: &str) -> AppResult<bool> {
        let result = BoardMember::delete_many()
            .filter(board_member::Column::BoardId.eq(board_id))
            .filter(board_member::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}
