//! Board service.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::board::{self, BoardLayout, BoardVisibility};
use travelboard_db::entities::board_activity::ActivityType;
use travelboard_db::repositories::BoardRepository;
use validator::Validate;

use super::activity::ActivityService;
use super::permission::{Capability, PermissionService, Permissions};

/// Maximum board name length.
const MAX_NAME_LENGTH: usize = 128;
/// Maximum board description length.
const MAX_DESCRIPTION_LENGTH: usize = 2048;
/// Maximum page size for board listings.
const MAX_LIMIT: u64 = 100;

/// Input for creating a board.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 2048))]
    pub description: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[validate(url)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub visibility: BoardVisibility,
    #[serde(default)]
    pub layout: BoardLayout,
}

/// Input for updating board settings.
///
/// `Some(None)` clears a nullable field; `None` leaves it unchanged.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardInput {
    pub board_id: String,
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub category: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub cover_image_url: Option<Option<String>>,
    pub visibility: Option<BoardVisibility>,
    pub layout: Option<BoardLayout>,
}

/// A board together with the caller's permissions on it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardDetails {
    pub board: board::Model,
    pub permissions: Permissions,
}

/// Service for managing boards.
#[derive(Clone)]
pub struct BoardService {
    board_repo: BoardRepository,
    permissions: PermissionService,
    activity: ActivityService,
    id_gen: IdGenerator,
}

impl BoardService {
    /// Create a new board service.
    #[must_use]
    pub const fn new(
        board_repo: BoardRepository,
        permissions: PermissionService,
        activity: ActivityService,
    ) -> Self {
        Self {
            board_repo,
            permissions,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a board owned by `user_id`.
    ///
    /// The board row and its CREATED log row commit together.
    pub async fn create(&self, user_id: &str, input: CreateBoardInput) -> AppResult<board::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Board name must not be blank".to_string(),
            ));
        }

        let id = self.id_gen.generate();
        let entry = self.activity.entry(
            &id,
            user_id,
            ActivityType::Created,
            json!({ "boardName": name, "category": input.category }),
        );

        let model = board::ActiveModel {
            id: Set(id),
            owner_id: Set(user_id.to_string()),
            name: Set(name),
            description: Set(input.description),
            category: Set(input.category),
            cover_image_url: Set(input.cover_image_url),
            visibility: Set(input.visibility),
            layout: Set(input.layout),
            is_archived: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let board = self.board_repo.create_logged(model, entry).await?;
        tracing::info!(board_id = %board.id, owner_id = %user_id, "Created board");
        Ok(board)
    }

    /// A board and the caller's permissions. Boards the caller cannot view
    /// are reported as missing.
    pub async fn show(&self, board_id: &str, viewer_id: Option<&str>) -> AppResult<BoardDetails> {
        let (board, permissions) = self.permissions.viewable(board_id, viewer_id).await?;
        Ok(BoardDetails { board, permissions })
    }

    /// Boards owned by the caller, newest first.
    pub async fn list_mine(
        &self,
        user_id: &str,
        include_archived: bool,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board::Model>> {
        self.board_repo
            .find_by_owner(user_id, include_archived, limit.min(MAX_LIMIT), offset)
            .await
    }

    /// Boards the caller is a listed member of, newest first.
    pub async fn list_shared(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<board::Model>> {
        self.board_repo
            .find_by_member(user_id, limit.min(MAX_LIMIT), offset)
            .await
    }

    /// Update board settings.
    ///
    /// Logs SETTINGS_UPDATED with the changed field names in the same
    /// transaction. A request that changes nothing writes nothing.
    pub async fn update(&self, user_id: &str, input: UpdateBoardInput) -> AppResult<board::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(Some(ref description)) = input.description
            && description.chars().count() > MAX_DESCRIPTION_LENGTH
        {
            return Err(AppError::Validation(format!(
                "Board description must be at most {MAX_DESCRIPTION_LENGTH} characters"
            )));
        }

        let (board, _) = self
            .permissions
            .require(&input.board_id, user_id, Capability::EditSettings)
            .await?;

        let mut changes: Vec<&'static str> = Vec::new();
        let mut active: board::ActiveModel = board.clone().into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
                return Err(AppError::Validation(format!(
                    "Board name must be between 1 and {MAX_NAME_LENGTH} characters"
                )));
            }
            if name != board.name {
                active.name = Set(name);
                changes.push("name");
            }
        }
        if let Some(description) = input.description
            && description != board.description
        {
            active.description = Set(description);
            changes.push("description");
        }
        if let Some(category) = input.category
            && category != board.category
        {
            active.category = Set(category);
            changes.push("category");
        }
        if let Some(cover_image_url) = input.cover_image_url
            && cover_image_url != board.cover_image_url
        {
            active.cover_image_url = Set(cover_image_url);
            changes.push("coverImageUrl");
        }
        if let Some(visibility) = input.visibility
            && visibility != board.visibility
        {
            active.visibility = Set(visibility);
            changes.push("visibility");
        }
        if let Some(layout) = input.layout
            && layout != board.layout
        {
            active.layout = Set(layout);
            changes.push("layout");
        }

        if changes.is_empty() {
            return Ok(board);
        }

        active.updated_at = Set(Some(Utc::now().into()));
        let entry = self.activity.entry(
            &board.id,
            user_id,
            ActivityType::SettingsUpdated,
            json!({ "action": "settings_updated", "changes": changes }),
        );

        self.board_repo.update_logged(active, entry).await
    }

    /// Archive a board. Archiving an archived board is a no-op.
    pub async fn archive(&self, user_id: &str, board_id: &str) -> AppResult<board::Model> {
        self.set_archived(user_id, board_id, true).await
    }

    /// Restore an archived board. Restoring an active board is a no-op.
    pub async fn restore(&self, user_id: &str, board_id: &str) -> AppResult<board::Model> {
        self.set_archived(user_id, board_id, false).await
    }

    async fn set_archived(
        &self,
        user_id: &str,
        board_id: &str,
        archived: bool,
    ) -> AppResult<board::Model> {
        let (board, _) = self
            .permissions
            .require(board_id, user_id, Capability::Archive)
            .await?;

        if board.is_archived == archived {
            return Ok(board);
        }

        let activity_type = if archived {
            ActivityType::BoardArchived
        } else {
            ActivityType::BoardRestored
        };
        let entry = self
            .activity
            .entry(board_id, user_id, activity_type, json!({}));

        let mut active: board::ActiveModel = board.into();
        active.is_archived = Set(archived);
        active.updated_at = Set(Some(Utc::now().into()));

        self.board_repo.update_logged(active, entry).await
    }

    /// Delete a board and everything attached to it. Owner only.
    pub async fn delete(&self, user_id: &str, board_id: &str) -> AppResult<()> {
        self.permissions
            .require(board_id, user_id, Capability::DeleteBoard)
            .await?;
        self.board_repo.delete_cascade(board_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use travelboard_db::entities::board_member::{self, BoardRole};
    use travelboard_db::repositories::{ActivityRepository, BoardMemberRepository};

    fn create_test_board(owner_id: &str) -> board::Model {
        board::Model {
            id: "board1".to_string(),
            owner_id: owner_id.to_string(),
            name: "Japan 2025".to_string(),
            description: None,
            category: Some("asia".to_string()),
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
            invited_by: Some("owner1".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> BoardService {
        let permissions = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db.clone()),
        );
        let activity =
            ActivityService::new(ActivityRepository::new(db.clone()), permissions.clone());
        BoardService::new(BoardRepository::new(db), permissions, activity)
    }

    fn create_input(name: &str) -> CreateBoardInput {
        CreateBoardInput {
            name: name.to_string(),
            description: None,
            category: Some("asia".to_string()),
            cover_image_url: None,
            visibility: BoardVisibility::Private,
            layout: BoardLayout::Masonry,
        }
    }

    #[tokio::test]
    async fn test_create_logs_created_with_metadata() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board("owner1")]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let board = service(db.clone())
            .create("owner1", create_input("Japan 2025"))
            .await
            .unwrap();
        assert_eq!(board.name, "Japan 2025");

        let db = Arc::try_unwrap(db).unwrap();
        let statements = format!("{:?}", db.into_transaction_log());
        assert!(statements.contains("board_activity"));
        assert!(statements.contains("boardName"));
        assert!(statements.contains("CREATED"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = service(db).create("owner1", create_input("   ")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_long_name() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = service(db)
            .create("owner1", create_input(&"x".repeat(129)))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_multibyte_name_survives_create_and_update() {
        let name = "京都".repeat(25);
        let description = "抹茶".repeat(700);
        let mut saved = create_test_board("owner1");
        saved.name = name.clone();
        saved.description = Some(description.clone());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[saved.clone()]])
                .append_exec_results([exec(1)])
                .append_query_results([[saved]])
                .into_connection(),
        );
        let service = service(db);

        let board = service.create("owner1", create_input(&name)).await.unwrap();
        assert_eq!(board.name, name);

        let board = service
            .update(
                "owner1",
                UpdateBoardInput {
                    board_id: "board1".to_string(),
                    name: Some(name.clone()),
                    description: Some(Some(description)),
                    category: None,
                    cover_image_url: None,
                    visibility: None,
                    layout: None,
                },
            )
            .await;
        assert!(board.is_ok(), "{board:?}");
    }

    #[tokio::test]
    async fn test_update_without_changes_writes_nothing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board("owner1")]])
                .into_connection(),
        );

        let board = service(db)
            .update(
                "owner1",
                UpdateBoardInput {
                    board_id: "board1".to_string(),
                    name: Some("Japan 2025".to_string()),
                    description: None,
                    category: None,
                    cover_image_url: None,
                    visibility: None,
                    layout: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(board.name, "Japan 2025");
    }

    #[tokio::test]
    async fn test_update_by_contributor_is_forbidden() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board("owner1")]])
                .append_query_results([[create_test_member("user2", BoardRole::CanAddPins)]])
                .into_connection(),
        );

        let result = service(db)
            .update(
                "user2",
                UpdateBoardInput {
                    board_id: "board1".to_string(),
                    name: Some("Renamed".to_string()),
                    description: None,
                    category: None,
                    cover_image_url: None,
                    visibility: None,
                    layout: None,
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_by_co_admin_logs_changes() {
        let mut updated = create_test_board("owner1");
        updated.name = "Japan 2026".to_string();
        updated.visibility = BoardVisibility::Shared;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board("owner1")]])
                .append_query_results([[create_test_member("user2", BoardRole::CoAdmin)]])
                .append_query_results([[updated]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let board = service(db.clone())
            .update(
                "user2",
                UpdateBoardInput {
                    board_id: "board1".to_string(),
                    name: Some("Japan 2026".to_string()),
                    description: None,
                    category: None,
                    cover_image_url: None,
                    visibility: Some(BoardVisibility::Shared),
                    layout: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(board.visibility, BoardVisibility::Shared);

        let db = Arc::try_unwrap(db).unwrap();
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("settings_updated"));
        assert!(log.contains("visibility"));
    }

    #[tokio::test]
    async fn test_archive_already_archived_is_noop() {
        let mut board = create_test_board("owner1");
        board.is_archived = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[board]])
                .into_connection(),
        );

        let board = service(db).archive("owner1", "board1").await.unwrap();
        assert!(board.is_archived);
    }

    #[tokio::test]
    async fn test_delete_by_co_admin_is_forbidden() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board("owner1")]])
                .append_query_results([[create_test_member("user2", BoardRole::CoAdmin)]])
                .into_connection(),
        );

        let result = service(db).delete("user2", "board1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_show_private_board_to_stranger_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board("owner1")]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .into_connection(),
        );

        let result = service(db).show("board1", Some("stranger")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
