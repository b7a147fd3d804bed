//! Pins on boards: add, remove, reorder, annotate.

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::board_activity::ActivityType;
use travelboard_db::entities::{board_pin, pin};
use travelboard_db::repositories::{BoardPinRepository, PinRepository};
use validator::Validate;

use super::activity::ActivityService;
use super::permission::{Capability, PermissionService};

/// Maximum length of a relation's notes.
const MAX_NOTES_LENGTH: usize = 2048;
/// Maximum length of a relation's relevance label.
const MAX_RELEVANCE_LENGTH: usize = 64;

/// Input for adding a pin to a board.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddBoardPinInput {
    pub board_id: String,
    pub pin_id: String,
    #[validate(length(max = 2048))]
    pub board_notes: Option<String>,
    #[validate(length(max = 64))]
    pub relevance: Option<String>,
}

/// Input for editing a pin's board-specific annotations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardPinInput {
    pub board_id: String,
    pub pin_id: String,
    #[serde(default, deserialize_with = "super::nullable")]
    pub board_notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub relevance: Option<Option<String>>,
}

/// A board relation row with its pin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardPinEntry {
    pub relation: board_pin::Model,
    pub pin: Option<pin::Model>,
}

/// Manages the ordered pin collection of a board.
#[derive(Clone)]
pub struct BoardPinService {
    board_pin_repo: BoardPinRepository,
    pin_repo: PinRepository,
    permissions: PermissionService,
    activity: ActivityService,
    id_gen: IdGenerator,
}

impl BoardPinService {
    /// Create a new board pin service.
    #[must_use]
    pub const fn new(
        board_pin_repo: BoardPinRepository,
        pin_repo: PinRepository,
        permissions: PermissionService,
        activity: ActivityService,
    ) -> Self {
        Self {
            board_pin_repo,
            pin_repo,
            permissions,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Pins of a board in display order.
    pub async fn list(
        &self,
        board_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<BoardPinEntry>> {
        self.permissions.viewable(board_id, viewer_id).await?;

        Ok(self
            .board_pin_repo
            .find_by_board(board_id)
            .await?
            .into_iter()
            .map(|(relation, pin)| BoardPinEntry { relation, pin })
            .collect())
    }

    /// Add a pin at the tail of a board.
    pub async fn add(&self, user_id: &str, input: AddBoardPinInput) -> AppResult<board_pin::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.permissions
            .require(&input.board_id, user_id, Capability::AddPins)
            .await?;

        let pin = self.pin_repo.get_by_id(&input.pin_id).await?;

        if self
            .board_pin_repo
            .find(&input.board_id, &input.pin_id)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "Pin is already on this board".to_string(),
            ));
        }

        let relation = self
            .board_pin_repo
            .append(
                self.id_gen.generate(),
                &input.board_id,
                &input.pin_id,
                user_id,
                input.board_notes,
                input.relevance,
            )
            .await?;

        self.activity
            .record_detached(
                &input.board_id,
                user_id,
                ActivityType::PinAdded,
                json!({ "pinId": pin.id, "pinTitle": pin.title }),
            )
            .await;

        Ok(relation)
    }

    /// Remove a pin from a board. Remaining positions are left as they are.
    pub async fn remove(&self, user_id: &str, board_id: &str, pin_id: &str) -> AppResult<()> {
        self.permissions
            .require(board_id, user_id, Capability::RemovePins)
            .await?;

        if !self.board_pin_repo.remove(board_id, pin_id).await? {
            return Err(AppError::NotFound(format!("Pin {pin_id} on board {board_id}")));
        }

        self.activity
            .record_detached(
                board_id,
                user_id,
                ActivityType::PinRemoved,
                json!({ "pinId": pin_id }),
            )
            .await;

        Ok(())
    }

    /// Reorder a board's pins by relation ID.
    ///
    /// Returns the number of rows repositioned. IDs that do not belong to the
    /// board are skipped.
    pub async fn reorder(
        &self,
        user_id: &str,
        board_id: &str,
        ordered_ids: &[String],
    ) -> AppResult<u64> {
        self.permissions
            .require(board_id, user_id, Capability::ReorderPins)
            .await?;

        let entry = self.activity.entry(
            board_id,
            user_id,
            ActivityType::SettingsUpdated,
            json!({ "action": "pins_reordered" }),
        );

        self.board_pin_repo
            .reorder(board_id, ordered_ids, entry)
            .await
    }

    /// Edit a pin's notes or relevance on one board.
    pub async fn update(
        &self,
        user_id: &str,
        input: UpdateBoardPinInput,
    ) -> AppResult<board_pin::Model> {
        if let Some(Some(ref notes)) = input.board_notes
            && notes.chars().count() > MAX_NOTES_LENGTH
        {
            return Err(AppError::Validation(format!(
                "Board notes must be at most {MAX_NOTES_LENGTH} characters"
            )));
        }
        if let Some(Some(ref relevance)) = input.relevance
            && relevance.chars().count() > MAX_RELEVANCE_LENGTH
        {
            return Err(AppError::Validation(format!(
                "Relevance must be at most {MAX_RELEVANCE_LENGTH} characters"
            )));
        }

        self.permissions
            .require(&input.board_id, user_id, Capability::AddPins)
            .await?;

        let relation = self
            .board_pin_repo
            .find(&input.board_id, &input.pin_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Pin {} on board {}", input.pin_id, input.board_id))
            })?;

        let mut active: board_pin::ActiveModel = relation.into();
        if let Some(board_notes) = input.board_notes {
            active.board_notes = Set(board_notes);
        }
        if let Some(relevance) = input.relevance {
            active.relevance = Set(relevance);
        }

        self.board_pin_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use travelboard_db::entities::board::{self, BoardLayout, BoardVisibility};
    use travelboard_db::entities::board_member::{self, BoardRole};
    use travelboard_db::repositories::{ActivityRepository, BoardMemberRepository, BoardRepository};

    fn create_test_board() -> board::Model {
        board::Model {
            id: "board1".to_string(),
            owner_id: "owner1".to_string(),
            name: "Japan 2025".to_string(),
            description: None,
            category: None,
            cover_image_url: None,
            visibility: BoardVisibility::Private,
            layout: BoardLayout::Masonry,
            is_archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_member(user_id: &str, role: BoardRole) -> board_member::Model {
        board_member::Model {
            id: format!("m_{user_id}"),
            board_id: "board1".to_string(),
            user_id: user_id.to_string(),
            role,
            invited_by: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_pin(id: &str) -> pin::Model {
        pin::Model {
            id: id.to_string(),
            user_id: "owner1".to_string(),
            title: format!("Pin {id}"),
            description: None,
            location: Some("Kyoto".to_string()),
            image_url: None,
            link: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_relation(id: &str, pin_id: &str, order: i32) -> board_pin::Model {
        board_pin::Model {
            id: id.to_string(),
            board_id: "board1".to_string(),
            pin_id: pin_id.to_string(),
            display_order: order,
            board_notes: None,
            relevance: None,
            added_by: "user2".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> BoardPinService {
        let permissions = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db.clone()),
        );
        let activity =
            ActivityService::new(ActivityRepository::new(db.clone()), permissions.clone());
        BoardPinService::new(
            BoardPinRepository::new(db.clone()),
            PinRepository::new(db),
            permissions,
            activity,
        )
    }

    fn add_input(pin_id: &str) -> AddBoardPinInput {
        AddBoardPinInput {
            board_id: "board1".to_string(),
            pin_id: pin_id.to_string(),
            board_notes: None,
            relevance: None,
        }
    }

    #[tokio::test]
    async fn test_contributor_adds_pin_at_tail() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_member("user2", BoardRole::CanAddPins)]])
                .append_query_results([[create_test_pin("p2")]])
                .append_query_results([Vec::<board_pin::Model>::new()])
                .append_query_results([[maplit::btreemap! {
                    "max_order" => sea_orm::Value::Int(Some(0))
                }]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );

        let relation = service(db).add("user2", add_input("p2")).await.unwrap();
        assert_eq!(relation.display_order, 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_is_validation_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_pin("p1")]])
                .append_query_results([[create_test_relation("rel1", "p1", 0)]])
                .into_connection(),
        );

        let result = service(db).add("owner1", add_input("p1")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_missing_pin_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([Vec::<pin::Model>::new()])
                .into_connection(),
        );

        let result = service(db).add("owner1", add_input("nope")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_viewer_cannot_add() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_member("user3", BoardRole::Viewer)]])
                .into_connection(),
        );

        let result = service(db).add("user3", add_input("p1")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_contributor_cannot_reorder() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_member("user2", BoardRole::CanAddPins)]])
                .into_connection(),
        );

        let result = service(db)
            .reorder("user2", "board1", &["rel2".to_string(), "rel1".to_string()])
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_owner_reorder_logs_pins_reordered() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_exec_results([exec(1), exec(1), exec(1)])
                .into_connection(),
        );

        let updated = service(db.clone())
            .reorder("owner1", "board1", &["rel2".to_string(), "rel1".to_string()])
            .await
            .unwrap();
        assert_eq!(updated, 2);

        let db = Arc::try_unwrap(db).unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("pins_reordered"));
        assert!(log.contains("SETTINGS_UPDATED"));
    }

    #[tokio::test]
    async fn test_remove_takes_pin_off_the_timeline() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_exec_results([exec(1), exec(1), exec(1)])
                .into_connection(),
        );

        service(db.clone())
            .remove("owner1", "board1", "p1")
            .await
            .unwrap();

        let db = Arc::try_unwrap(db).unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM \\\"timeline_pin\\\""));
        assert!(log.contains("PIN_REMOVED"));
    }

    #[tokio::test]
    async fn test_remove_missing_relation_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_exec_results([exec(0)])
                .into_connection(),
        );

        let result = service(db).remove("owner1", "board1", "p9").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_long_relevance() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let result = service(db)
            .update(
                "owner1",
                UpdateBoardPinInput {
                    board_id: "board1".to_string(),
                    pin_id: "p1".to_string(),
                    board_notes: None,
                    relevance: Some(Some("x".repeat(65))),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
