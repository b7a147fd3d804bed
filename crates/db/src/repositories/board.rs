//! Board repository.

use std::sync::Arc;

use crate::entities::{
    Board, BoardActivity, BoardComment, BoardMember, BoardPin, CommentReaction, TimelineDay,
    TimelinePin, board, board_activity, board_comment, board_member, board_pin, comment_reaction,
    timeline_day, timeline_pin,
};
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use travelboard_common::{AppError, AppResult};

use super::{ActivityRepository, contains_pattern, lower_like};

/// Board repository for database operations.
#[derive(Clone)]
pub struct BoardRepository {
    db: Arc<DatabaseConnection>,
}

impl BoardRepository {
    /// Create a new board repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a board by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<board::Model>> {
        Board::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a board by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<board::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Board: {id}")))
    }

    /// Insert a board and its log row in one transaction.
    pub async fn create_logged(
        &self,
        model: board::ActiveModel,
        entry: board_activity::ActiveModel,
    ) -> AppResult<board::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let board = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        ActivityRepository::append(&txn, entry).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(board)
    }

    /// Update a board and append its log row in one transaction.
    ///
    /// Used for settings edits as well as archive and restore.
    pub async fn update_logged(
        &self,
        model: board::ActiveModel,
        entry: board_activity::ActiveModel,
    ) -> AppResult<board::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let board = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        ActivityRepository::append(&txn, entry).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(board)
    }

    /// Delete a board and everything hanging off it in one transaction.
    ///
    /// Children are removed explicitly, deepest first, so the result does not
    /// depend on the foreign keys' cascade settings.
    pub async fn delete_cascade(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        TimelinePin::delete_many()
            .filter(
                timeline_pin::Column::DayId.in_subquery(
                    Query::select()
                        .column(timeline_day::Column::Id)
                        .from(TimelineDay)
                        .and_where(timeline_day::Column::BoardId.eq(id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        TimelineDay::delete_many()
            .filter(timeline_day::Column::BoardId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        BoardPin::delete_many()
            .filter(board_pin::Column::BoardId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        CommentReaction::delete_many()
            .filter(
                comment_reaction::Column::CommentId.in_subquery(
                    Query::select()
                        .column(board_comment::Column::Id)
                        .from(BoardComment)
                        .and_where(board_comment::Column::BoardId.eq(id))
                        .to_owned(),
                ),
            )
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        BoardComment::delete_many()
            .filter(board_comment::Column::BoardId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        BoardMember::delete_many()
            .filter(board_member::Column::BoardId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        BoardActivity::delete_many()
            .filter(board_activity::Column::BoardId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Board::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(board_id = %id, "Deleted board");
        Ok(())
    }

    /// Boards owned by a user, newest first.
    pub async fn find_by_owner(
        &self,
        owner_id: &str,
        include_archived: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board::Model>> {
        let mut query = Board::find().filter(board::Column::OwnerId.eq(owner_id));

        if !include_archived {
            query = query.filter(board::Column::IsArchived.eq(false));
        }

        query
            .order_by_desc(board::Column::CreatedAt)
            .order_by_desc(board::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Boards a user is a listed member of, newest first.
    pub async fn find_by_member(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board::Model>> {
        Board::find()
            .join(JoinType::InnerJoin, board::Relation::Members.def())
            .filter(board_member::Column::UserId.eq(user_id))
            .filter(board::Column::OwnerId.ne(user_id))
            .order_by_desc(board::Column::CreatedAt)
            .order_by_desc(board::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Public, non-archived boards whose name or description contains
    /// `query`, newest first.
    pub async fn search_public(&self, query: &str, limit: u64) -> AppResult<Vec<board::Model>> {
        let pattern = contains_pattern(query);

        Board::find()
            .filter(board::Column::Visibility.eq(board::BoardVisibility::Public))
            .filter(board::Column::IsArchived.eq(false))
            .filter(
                Condition::any()
                    .add(lower_like(board::Column::Name, &pattern))
                    .add(lower_like(board::Column::Description, &pattern)),
            )
            .order_by_desc(board::Column::CreatedAt)
            .order_by_desc(board::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
