//! Board activity log service.

use serde_json::Value;
use travelboard_common::{AppResult, IdGenerator};
use travelboard_db::entities::board_activity::{self, ActivityType};
use travelboard_db::repositories::ActivityRepository;

use super::permission::PermissionService;

/// Maximum page size for activity listings.
const MAX_LIMIT: u64 = 100;

/// Appends to and reads the board activity log.
#[derive(Clone)]
pub struct ActivityService {
    activity_repo: ActivityRepository,
    permissions: PermissionService,
    id_gen: IdGenerator,
}

impl ActivityService {
    /// Create a new activity service.
    #[must_use]
    pub const fn new(activity_repo: ActivityRepository, permissions: PermissionService) -> Self {
        Self {
            activity_repo,
            permissions,
            id_gen: IdGenerator::new(),
        }
    }

    /// Build a log row for a repository to write inside its own transaction.
    #[must_use]
    pub fn entry(
        &self,
        board_id: &str,
        actor_id: &str,
        activity_type: ActivityType,
        metadata: Value,
    ) -> board_activity::ActiveModel {
        ActivityRepository::entry(
            self.id_gen.generate(),
            board_id,
            actor_id,
            activity_type,
            metadata,
        )
    }

    /// Append a row outside the mutation's transaction.
    ///
    /// A failed write is logged and swallowed; the mutation it describes has
    /// already been committed.
    pub async fn record_detached(
        &self,
        board_id: &str,
        actor_id: &str,
        activity_type: ActivityType,
        metadata: Value,
    ) {
        let entry = self.entry(board_id, actor_id, activity_type, metadata);
        if let Err(e) = self.activity_repo.record(entry).await {
            tracing::warn!(
                board_id = %board_id,
                actor_id = %actor_id,
                activity = ?activity_type,
                error = %e,
                "Failed to record board activity"
            );
        }
    }

    /// Activity of a board, newest first. Requires view access.
    pub async fn list(
        &self,
        board_id: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board_activity::Model>> {
        self.permissions.viewable(board_id, viewer_id).await?;
        self.activity_repo
            .find_by_board(board_id, limit.min(MAX_LIMIT), offset)
            .await
    }
}
