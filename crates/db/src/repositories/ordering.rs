//! Shared helpers for `display_order` collections.
//!
//! A collection is the set of rows sharing a scope column value (a board for
//! `board_pin`, a day for `timeline_pin`). Positions only compare within one
//! scope and may have gaps after removals.

use std::collections::HashSet;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use travelboard_common::{AppError, AppResult};

/// Longest reorder list accepted in one request.
pub const MAX_REORDER_IDS: usize = 500;

/// Reject reorder lists that are too long or name the same row twice.
pub fn check_reorder_list(ids: &[String]) -> AppResult<()> {
    if ids.len() > MAX_REORDER_IDS {
        return Err(AppError::Validation(format!(
            "Reorder list must have at most {MAX_REORDER_IDS} IDs"
        )));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    if let Some(dup) = ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(AppError::Validation(format!(
            "Duplicate ID in reorder list: {dup}"
        )));
    }
    Ok(())
}

/// Position for a row appended to the tail: `max + 1`, or 0 when empty.
pub async fn tail_position<E, C>(
    conn: &C,
    scope_col: E::Column,
    scope_id: &str,
    order_col: E::Column,
) -> AppResult<i32>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let max: Option<Option<i32>> = E::find()
        .select_only()
        .column_as(Expr::col(order_col).max(), "max_order")
        .filter(scope_col.eq(scope_id))
        .into_tuple()
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(max.flatten().map_or(0, |m| m + 1))
}

/// Set each listed row's position to its index.
///
/// Rows outside the scope, or IDs that match nothing, are left alone.
/// Returns the number of rows updated.
pub async fn rewrite_positions<E, C>(
    conn: &C,
    id_col: E::Column,
    scope_col: E::Column,
    scope_id: &str,
    order_col: E::Column,
    ids: &[String],
) -> AppResult<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let mut updated = 0;
    for (index, id) in ids.iter().enumerate() {
        let result = E::update_many()
            .col_expr(order_col, Expr::value(index as i32))
            .filter(id_col.eq(id.as_str()))
            .filter(scope_col.eq(scope_id))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        updated += result.rows_affected;
    }
    Ok(updated)
}
