//! Board permission resolution.
//!
//! [`resolve`] is a pure function of the persisted board, the caller's
//! membership row and the caller's id. [`PermissionService`] loads those
//! inputs fresh on every call; nothing is cached.

use std::collections::BTreeSet;

use serde::Serialize;
use travelboard_common::{AppError, AppResult};
use travelboard_db::entities::board::{self, BoardVisibility};
use travelboard_db::entities::board_member::{self, BoardRole};
use travelboard_db::repositories::{BoardMemberRepository, BoardRepository};

/// Something a caller may do on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    View,
    Comment,
    EditSettings,
    Archive,
    AddPins,
    RemovePins,
    ReorderPins,
    ManageTimelineDays,
    ManageTimelineContent,
    PinComments,
    ManageMembers,
    ModerateComments,
    DeleteBoard,
}

impl Capability {
    /// Human-readable description used in `Forbidden` errors.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::View => "view this board",
            Self::Comment => "comment on this board",
            Self::EditSettings => "edit board settings",
            Self::Archive => "archive or restore this board",
            Self::AddPins => "add pins to this board",
            Self::RemovePins => "remove pins from this board",
            Self::ReorderPins => "reorder pins on this board",
            Self::ManageTimelineDays => "manage timeline days",
            Self::ManageTimelineContent => "manage timeline content",
            Self::PinComments => "pin comments",
            Self::ManageMembers => "manage board members",
            Self::ModerateComments => "moderate comments",
            Self::DeleteBoard => "delete this board",
        }
    }
}

const ADMIN: &[Capability] = &[
    Capability::View,
    Capability::Comment,
    Capability::EditSettings,
    Capability::Archive,
    Capability::AddPins,
    Capability::RemovePins,
    Capability::ReorderPins,
    Capability::ManageTimelineDays,
    Capability::ManageTimelineContent,
    Capability::PinComments,
    Capability::ManageMembers,
    Capability::ModerateComments,
];

const CONTRIBUTOR: &[Capability] = &[
    Capability::View,
    Capability::Comment,
    Capability::AddPins,
    Capability::ManageTimelineContent,
];

const VIEWER: &[Capability] = &[Capability::View, Capability::Comment];

/// Non-members of a shared or public board only read it.
const READ_ONLY: &[Capability] = &[Capability::View];

/// Effective permissions of one caller on one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub is_owner: bool,
    pub role: Option<BoardRole>,
    pub capabilities: BTreeSet<Capability>,
}

impl Permissions {
    /// Whether the caller holds `capability`.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Fail with `Forbidden` unless the caller holds `capability`.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "You do not have permission to {}",
                capability.describe()
            )))
        }
    }
}

/// Compute what `user_id` may do on `board`.
///
/// Ownership is decided by `board.owner_id` alone; a membership row never
/// makes someone the owner and never takes ownership away.
#[must_use]
pub fn resolve(
    board: &board::Model,
    membership: Option<&board_member::Model>,
    user_id: Option<&str>,
) -> Permissions {
    let Some(user_id) = user_id else {
        let capabilities = if board.visibility == BoardVisibility::Public {
            BTreeSet::from([Capability::View])
        } else {
            BTreeSet::new()
        };
        return Permissions {
            is_owner: false,
            role: None,
            capabilities,
        };
    };

    if board.owner_id == user_id {
        let mut capabilities: BTreeSet<Capability> = ADMIN.iter().copied().collect();
        capabilities.insert(Capability::DeleteBoard);
        return Permissions {
            is_owner: true,
            role: Some(BoardRole::Owner),
            capabilities,
        };
    }

    let role = membership
        .filter(|m| m.board_id == board.id && m.user_id == user_id)
        .map(|m| m.role);

    let granted: &[Capability] = match role {
        Some(BoardRole::Owner | BoardRole::CoAdmin) => ADMIN,
        Some(BoardRole::CanAddPins) => CONTRIBUTOR,
        Some(BoardRole::Viewer) => VIEWER,
        None => match board.visibility {
            BoardVisibility::Shared | BoardVisibility::Public => READ_ONLY,
            BoardVisibility::Private => &[],
        },
    };

    Permissions {
        is_owner: false,
        role,
        capabilities: granted.iter().copied().collect(),
    }
}

/// Loads boards and memberships and resolves permissions.
#[derive(Clone)]
pub struct PermissionService {
    board_repo: BoardRepository,
    member_repo: BoardMemberRepository,
}

impl PermissionService {
    /// Create a new permission service.
    #[must_use]
    pub const fn new(board_repo: BoardRepository, member_repo: BoardMemberRepository) -> Self {
        Self {
            board_repo,
            member_repo,
        }
    }

    /// Load a board and the caller's permissions on it.
    pub async fn resolve(
        &self,
        board_id: &str,
        user_id: Option<&str>,
    ) -> AppResult<(board::Model, Permissions)> {
        let board = self.board_repo.get_by_id(board_id).await?;

        let membership = match user_id {
            Some(uid) if uid != board.owner_id => self.member_repo.find(board_id, uid).await?,
            _ => None,
        };

        let permissions = resolve(&board, membership.as_ref(), user_id);
        Ok((board, permissions))
    }

    /// Load a board the caller may at least view.
    ///
    /// A board the caller cannot view is reported as missing.
    pub async fn viewable(
        &self,
        board_id: &str,
        user_id: Option<&str>,
    ) -> AppResult<(board::Model, Permissions)> {
        let (board, permissions) = self.resolve(board_id, user_id).await?;
        if !permissions.can(Capability::View) {
            return Err(AppError::NotFound(format!("Board: {board_id}")));
        }
        Ok((board, permissions))
    }

    /// Load a board and require `capability` on it.
    ///
    /// Callers without `View` get `NotFound`; callers who can view but lack
    /// `capability` get `Forbidden`.
    pub async fn require(
        &self,
        board_id: &str,
        user_id: &str,
        capability: Capability,
    ) -> AppResult<(board::Model, Permissions)> {
        let (board, permissions) = self.viewable(board_id, Some(user_id)).await?;
        permissions.require(capability)?;
        Ok((board, permissions))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use travelboard_db::entities::board::BoardLayout;

    fn create_test_board(visibility: BoardVisibility) -> board::Model {
        board::Model {
            id: "board1".to_string(),
            owner_id: "owner".to_string(),
            name: "Japan 2025".to_string(),
            description: None,
            category: Some("trip".to_string()),
            cover_image_url: None,
            visibility,
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
            invited_by: Some("owner".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[test]
    fn test_owner_has_everything_without_membership() {
        let board = create_test_board(BoardVisibility::Private);
        let perms = resolve(&board, None, Some("owner"));

        assert!(perms.is_owner);
        assert_eq!(perms.role, Some(BoardRole::Owner));
        assert!(perms.can(Capability::DeleteBoard));
        assert!(perms.can(Capability::ManageMembers));
    }

    #[test]
    fn test_owner_flag_ignores_membership_rows() {
        let board = create_test_board(BoardVisibility::Private);

        let viewer_row = create_test_member("owner", BoardRole::Viewer);
        assert!(resolve(&board, Some(&viewer_row), Some("owner")).is_owner);

        let owner_row = create_test_member("someone", BoardRole::Owner);
        let perms = resolve(&board, Some(&owner_row), Some("someone"));
        assert!(!perms.is_owner);
        assert!(!perms.can(Capability::DeleteBoard));
        assert!(perms.can(Capability::ManageMembers));
    }

    #[test]
    fn test_co_admin_cannot_delete() {
        let board = create_test_board(BoardVisibility::Private);
        let member = create_test_member("co", BoardRole::CoAdmin);
        let perms = resolve(&board, Some(&member), Some("co"));

        assert!(perms.can(Capability::EditSettings));
        assert!(perms.can(Capability::ReorderPins));
        assert!(perms.can(Capability::ModerateComments));
        assert!(!perms.can(Capability::DeleteBoard));
    }

    #[test]
    fn test_contributor_capabilities() {
        let board = create_test_board(BoardVisibility::Private);
        let member = create_test_member("pinner", BoardRole::CanAddPins);
        let perms = resolve(&board, Some(&member), Some("pinner"));

        assert!(perms.can(Capability::AddPins));
        assert!(perms.can(Capability::ManageTimelineContent));
        assert!(!perms.can(Capability::RemovePins));
        assert!(!perms.can(Capability::ReorderPins));
        assert!(!perms.can(Capability::EditSettings));
        assert!(!perms.can(Capability::ManageMembers));
        assert!(!perms.can(Capability::ManageTimelineDays));
    }

    #[test]
    fn test_non_member_reads_shared_and_public_only() {
        for visibility in [BoardVisibility::Shared, BoardVisibility::Public] {
            let board = create_test_board(visibility);
            let perms = resolve(&board, None, Some("stranger"));

            assert_eq!(perms.role, None);
            assert_eq!(perms.capabilities, BTreeSet::from([Capability::View]));
        }
    }

    #[test]
    fn test_explicit_viewer_may_comment() {
        let board = create_test_board(BoardVisibility::Shared);
        let member = create_test_member("friend", BoardRole::Viewer);
        let perms = resolve(&board, Some(&member), Some("friend"));

        assert_eq!(perms.role, Some(BoardRole::Viewer));
        assert!(perms.can(Capability::Comment));
        assert!(!perms.can(Capability::AddPins));
    }

    #[test]
    fn test_private_board_hidden_from_strangers() {
        let board = create_test_board(BoardVisibility::Private);
        let perms = resolve(&board, None, Some("stranger"));

        assert_eq!(perms.role, None);
        assert!(perms.capabilities.is_empty());
    }

    #[test]
    fn test_anonymous_sees_public_only() {
        let public = create_test_board(BoardVisibility::Public);
        let perms = resolve(&public, None, None);
        assert_eq!(perms.capabilities, BTreeSet::from([Capability::View]));
        assert_eq!(perms.role, None);

        let shared = create_test_board(BoardVisibility::Shared);
        assert!(resolve(&shared, None, None).capabilities.is_empty());
    }

    #[test]
    fn test_membership_for_other_user_is_ignored() {
        let board = create_test_board(BoardVisibility::Private);
        let member = create_test_member("someone_else", BoardRole::CoAdmin);
        let perms = resolve(&board, Some(&member), Some("stranger"));

        assert!(perms.capabilities.is_empty());
    }

    #[test]
    fn test_require_reports_forbidden() {
        let board = create_test_board(BoardVisibility::Shared);
        let perms = resolve(&board, None, Some("stranger"));

        assert!(perms.require(Capability::View).is_ok());
        assert!(matches!(
            perms.require(Capability::AddPins),
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn test_service_hides_private_board() {
        let board = create_test_board(BoardVisibility::Private);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[board]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .into_connection(),
        );

        let service = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db),
        );

        let result = service
            .require("board1", "stranger", Capability::Comment)
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_service_forbids_missing_capability() {
        let board = create_test_board(BoardVisibility::Private);
        let member = create_test_member("viewer", BoardRole::Viewer);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[board]])
                .append_query_results([[member]])
                .into_connection(),
        );

        let service = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db),
        );

        let result = service
            .require("board1", "viewer", Capability::AddPins)
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_service_owner_skips_membership_lookup() {
        let board = create_test_board(BoardVisibility::Private);

        // Only the board row is queued: a membership query would fail.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[board]])
                .into_connection(),
        );

        let service = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db),
        );

        let (_, perms) = service
            .require("board1", "owner", Capability::DeleteBoard)
            .await
            .unwrap();
        assert!(perms.is_owner);
    }
}
