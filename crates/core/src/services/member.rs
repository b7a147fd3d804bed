//! Board membership.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::board_activity::ActivityType;
use travelboard_db::entities::board_member::{self, BoardRole};
use travelboard_db::repositories::{BoardMemberRepository, UserRepository};

use super::activity::ActivityService;
use super::permission::{Capability, PermissionService};
use super::user::UserSummary;

/// Input for adding a member.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberInput {
    pub board_id: String,
    pub user_id: String,
    #[serde(default = "default_role")]
    pub role: BoardRole,
}

const fn default_role() -> BoardRole {
    BoardRole::Viewer
}

/// A membership row with its user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberEntry {
    pub member: board_member::Model,
    pub user: Option<UserSummary>,
}

/// Manages who belongs to a board and in which role.
#[derive(Clone)]
pub struct MemberService {
    member_repo: BoardMemberRepository,
    user_repo: UserRepository,
    permissions: PermissionService,
    activity: ActivityService,
    id_gen: IdGenerator,
}

impl MemberService {
    /// Create a new member service.
    #[must_use]
    pub const fn new(
        member_repo: BoardMemberRepository,
        user_repo: UserRepository,
        permissions: PermissionService,
        activity: ActivityService,
    ) -> Self {
        Self {
            member_repo,
            user_repo,
            permissions,
            activity,
            id_gen: IdGenerator::new(),
        }
    }

    /// Members of a board.
    pub async fn list(
        &self,
        board_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<MemberEntry>> {
        self.permissions.viewable(board_id, viewer_id).await?;

        Ok(self
            .member_repo
            .find_by_board(board_id)
            .await?
            .into_iter()
            .map(|(member, user)| MemberEntry {
                member,
                user: user.map(UserSummary::from),
            })
            .collect())
    }

    /// Add a user to a board.
    pub async fn add(
        &self,
        actor_id: &str,
        input: AddMemberInput,
    ) -> AppResult<board_member::Model> {
        ensure_grantable(input.role)?;

        let (board, _) = self
            .permissions
            .require(&input.board_id, actor_id, Capability::ManageMembers)
            .await?;

        let user = self.user_repo.get_by_id(&input.user_id).await?;

        if user.id == board.owner_id {
            return Err(AppError::Validation(
                "The board owner cannot be added as a member".to_string(),
            ));
        }

        if self
            .member_repo
            .find(&board.id, &user.id)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "User is already a member of this board".to_string(),
            ));
        }

        let member = self
            .member_repo
            .create(board_member::ActiveModel {
                id: Set(self.id_gen.generate()),
                board_id: Set(board.id.clone()),
                user_id: Set(user.id.clone()),
                role: Set(input.role),
                invited_by: Set(Some(actor_id.to_string())),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            })
            .await?;

        self.activity
            .record_detached(
                &board.id,
                actor_id,
                ActivityType::MemberAdded,
                json!({ "userId": user.id, "username": user.username, "role": input.role }),
            )
            .await;

        Ok(member)
    }

    /// Change a member's role.
    pub async fn change_role(
        &self,
        actor_id: &str,
        board_id: &str,
        user_id: &str,
        role: BoardRole,
    ) -> AppResult<board_member::Model> {
        ensure_grantable(role)?;

        self.permissions
            .require(board_id, actor_id, Capability::ManageMembers)
            .await?;

        let member = self
            .member_repo
            .find(board_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member {user_id} of board {board_id}")))?;

        if member.role == role {
            return Ok(member);
        }

        let mut active: board_member::ActiveModel = member.into();
        active.role = Set(role);
        active.updated_at = Set(Some(Utc::now().into()));

        self.member_repo.update(active).await
    }

    /// Remove a member. Admins may remove anyone; members may remove
    /// themselves.
    pub async fn remove(&self, actor_id: &str, board_id: &str, user_id: &str) -> AppResult<()> {
        let leaving = actor_id == user_id;

        if leaving {
            self.permissions
                .viewable(board_id, Some(actor_id))
                .await?;
        } else {
            self.permissions
                .require(board_id, actor_id, Capability::ManageMembers)
                .await?;
        }

        if !self.member_repo.delete(board_id, user_id).await? {
            return Err(AppError::NotFound(format!(
                "Member {user_id} of board {board_id}"
            )));
        }

        self.activity
            .record_detached(
                board_id,
                actor_id,
                ActivityType::MemberRemoved,
                json!({ "userId": user_id, "left": leaving }),
            )
            .await;

        Ok(())
    }
}

/// OWNER is carried by `board.owner_id` and cannot be handed out.
fn ensure_grantable(role: BoardRole) -> AppResult<()> {
    if role == BoardRole::Owner {
        return Err(AppError::Validation(
            "The owner role cannot be granted".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use travelboard_db::entities::board::{self, BoardLayout, BoardVisibility};
    use travelboard_db::entities::user;
    use travelboard_db::repositories::{ActivityRepository, BoardRepository};

    fn create_test_board() -> board::Model {
        board::Model {
            id: "board1".to_string(),
            owner_id: "owner1".to_string(),
            name: "Japan 2025".to_string(),
            description: None,
            category: None,
            cover_image_url: None,
            visibility: BoardVisibility::Shared,
            layout: BoardLayout::Masonry,
            is_archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            external_id: format!("ext_{id}"),
            username: id.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            image_url: None,
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

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> MemberService {
        let permissions = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db.clone()),
        );
        let activity =
            ActivityService::new(ActivityRepository::new(db.clone()), permissions.clone());
        MemberService::new(
            BoardMemberRepository::new(db.clone()),
            UserRepository::new(db),
            permissions,
            activity,
        )
    }

    fn add_input(user_id: &str, role: BoardRole) -> AddMemberInput {
        AddMemberInput {
            board_id: "board1".to_string(),
            user_id: user_id.to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn test_owner_adds_contributor() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_user("user2")]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .append_query_results([[create_test_member("user2", BoardRole::CanAddPins)]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        let member = service(db)
            .add("owner1", add_input("user2", BoardRole::CanAddPins))
            .await
            .unwrap();
        assert_eq!(member.role, BoardRole::CanAddPins);
    }

    #[tokio::test]
    async fn test_owner_role_cannot_be_granted() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let result = service(db)
            .add("owner1", add_input("user2", BoardRole::Owner))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_adding_owner_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_user("owner1")]])
                .into_connection(),
        );

        let result = service(db)
            .add("owner1", add_input("owner1", BoardRole::CoAdmin))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_member_is_rejected() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_user("user2")]])
                .append_query_results([[create_test_member("user2", BoardRole::Viewer)]])
                .into_connection(),
        );

        let result = service(db)
            .add("owner1", add_input("user2", BoardRole::Viewer))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_contributor_cannot_manage_members() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_member("user2", BoardRole::CanAddPins)]])
                .into_connection(),
        );

        let result = service(db)
            .add("user2", add_input("user3", BoardRole::Viewer))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_member_can_leave() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_member("user3", BoardRole::Viewer)]])
                .append_exec_results([exec(1), exec(1)])
                .into_connection(),
        );

        service(db).remove("user3", "board1", "user3").await.unwrap();
    }

    #[tokio::test]
    async fn test_viewer_cannot_remove_others() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[create_test_member("user3", BoardRole::Viewer)]])
                .into_connection(),
        );

        let result = service(db).remove("user3", "board1", "user2").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
