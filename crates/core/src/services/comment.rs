//! Board comments and their reactions.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::board_comment;
use travelboard_db::repositories::{CommentReactionRepository, CommentRepository, ToggleKey};
use validator::Validate;

use super::permission::{Capability, PermissionService};

/// Maximum page size for comment listings.
const MAX_LIMIT: u64 = 100;

/// Input for posting a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub board_id: String,
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Number of reactions with one emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    pub emoji: String,
    pub count: i64,
}

/// A comment with its reaction counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub comment: board_comment::Model,
    pub reactions: Vec<ReactionSummary>,
}

/// Service for board comments.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    reaction_repo: CommentReactionRepository,
    permissions: PermissionService,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        reaction_repo: CommentReactionRepository,
        permissions: PermissionService,
    ) -> Self {
        Self {
            comment_repo,
            reaction_repo,
            permissions,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment on a board.
    pub async fn create(
        &self,
        user_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<board_comment::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Validation(
                "Comment must not be blank".to_string(),
            ));
        }

        self.permissions
            .require(&input.board_id, user_id, Capability::Comment)
            .await?;

        self.comment_repo
            .create(board_comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                board_id: Set(input.board_id),
                user_id: Set(user_id.to_string()),
                content: Set(content),
                is_pinned: Set(false),
                created_at: Set(Utc::now().into()),
            })
            .await
    }

    /// Comments of a board, pinned first, then newest first.
    pub async fn list(
        &self,
        board_id: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<CommentView>> {
        self.permissions.viewable(board_id, viewer_id).await?;

        let comments = self
            .comment_repo
            .find_by_board(board_id, limit.min(MAX_LIMIT), offset)
            .await?;

        let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
        let mut reactions: HashMap<String, Vec<ReactionSummary>> = HashMap::new();
        for row in self.comment_repo.reaction_counts(&ids).await? {
            reactions
                .entry(row.comment_id)
                .or_default()
                .push(ReactionSummary {
                    emoji: row.emoji,
                    count: row.count,
                });
        }

        Ok(comments
            .into_iter()
            .map(|comment| {
                let reactions = reactions.remove(&comment.id).unwrap_or_default();
                CommentView { comment, reactions }
            })
            .collect())
    }

    /// Delete a comment. Authors may delete their own; moderators any.
    pub async fn delete(&self, user_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        let (_, permissions) = self
            .permissions
            .viewable(&comment.board_id, Some(user_id))
            .await?;

        if comment.user_id != user_id {
            permissions.require(Capability::ModerateComments)?;
        }

        self.comment_repo.delete(comment_id).await
    }

    /// Pin or unpin a comment.
    pub async fn set_pinned(&self, user_id: &str, comment_id: &str, pinned: bool) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        self.permissions
            .require(&comment.board_id, user_id, Capability::PinComments)
            .await?;

        if comment.is_pinned != pinned {
            self.comment_repo.set_pinned(comment_id, pinned).await?;
        }
        Ok(())
    }

    /// Toggle the caller's `emoji` reaction on a comment.
    ///
    /// Returns whether the reaction is now present.
    pub async fn react(&self, user_id: &str, comment_id: &str, emoji: &str) -> AppResult<bool> {
        let key = ToggleKey::with_variant(user_id, comment_id, emoji.trim());
        let comment = self.comment_repo.get_by_id(comment_id).await?;
        self.permissions
            .require(&comment.board_id, user_id, Capability::Comment)
            .await?;

        self.reaction_repo.toggle(self.id_gen.generate(), &key).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::sync::Arc;
    use travelboard_db::entities::board::{self, BoardLayout, BoardVisibility};
    use travelboard_db::entities::board_member::{self, BoardRole};
    use travelboard_db::repositories::{BoardMemberRepository, BoardRepository};

    fn create_test_board() -> board::Model {
        board::Model {
            id: "board1".to_string(),
            owner_id: "owner1".to_string(),
            name: "Japan 2025".to_string(),
            description: None,
            category: None,
            cover_image_url: None,
            visibility: BoardVisibility::Public,
            layout: BoardLayout::Masonry,
            is_archived: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_comment(id: &str, author: &str) -> board_comment::Model {
        board_comment::Model {
            id: id.to_string(),
            board_id: "board1".to_string(),
            user_id: author.to_string(),
            content: "Book the ryokan early".to_string(),
            is_pinned: false,
            created_at: Utc::now().into(),
        }
    }

    fn exec(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> CommentService {
        let permissions = PermissionService::new(
            BoardRepository::new(db.clone()),
            BoardMemberRepository::new(db.clone()),
        );
        CommentService::new(
            CommentRepository::new(db.clone()),
            CommentReactionRepository::new(db),
            permissions,
        )
    }

    fn comment_input() -> CreateCommentInput {
        CreateCommentInput {
            board_id: "board1".to_string(),
            content: "  Book the ryokan early ".to_string(),
        }
    }

    #[tokio::test]
    async fn test_non_member_cannot_comment_on_public_board() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .into_connection(),
        );

        let result = service(db).create("user9", comment_input()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_non_member_cannot_react() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "user9")]])
                .append_query_results([[create_test_board()]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .into_connection(),
        );

        let result = service(db).react("user8", "c1", "👍").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_viewer_member_can_comment() {
        let member = board_member::Model {
            id: "m9".to_string(),
            board_id: "board1".to_string(),
            user_id: "user9".to_string(),
            role: BoardRole::Viewer,
            invited_by: Some("owner1".to_string()),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[member]])
                .append_query_results([[create_test_comment("c1", "user9")]])
                .into_connection(),
        );

        let comment = service(db).create("user9", comment_input()).await.unwrap();
        assert_eq!(comment.user_id, "user9");
    }

    #[tokio::test]
    async fn test_list_attaches_reaction_counts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_board()]])
                .append_query_results([[
                    create_test_comment("c1", "user9"),
                    create_test_comment("c2", "user8"),
                ]])
                .append_query_results([[maplit::btreemap! {
                    "comment_id" => Value::String(Some(Box::new("c1".to_string()))),
                    "emoji" => Value::String(Some(Box::new("🗾".to_string()))),
                    "count" => Value::BigInt(Some(3)),
                }]])
                .into_connection(),
        );

        let views = service(db).list("board1", None, 20, 0).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(
            views[0].reactions,
            vec![ReactionSummary {
                emoji: "🗾".to_string(),
                count: 3
            }]
        );
        assert!(views[1].reactions.is_empty());
    }

    #[tokio::test]
    async fn test_non_author_viewer_cannot_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "user9")]])
                .append_query_results([[create_test_board()]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .into_connection(),
        );

        let result = service(db).delete("user8", "c1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_author_can_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "user9")]])
                .append_query_results([[create_test_board()]])
                .append_query_results([Vec::<board_member::Model>::new()])
                .append_exec_results([exec(2), exec(1)])
                .into_connection(),
        );

        service(db).delete("user9", "c1").await.unwrap();
    }

    #[tokio::test]
    async fn test_co_admin_pins_comment() {
        let member = board_member::Model {
            id: "m1".to_string(),
            board_id: "board1".to_string(),
            user_id: "user2".to_string(),
            role: BoardRole::CoAdmin,
            invited_by: None,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "user9")]])
                .append_query_results([[create_test_board()]])
                .append_query_results([[member]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );

        service(db).set_pinned("user2", "c1", true).await.unwrap();
    }

    #[tokio::test]
    async fn test_react_toggles_on() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_comment("c1", "user9")]])
                .append_query_results([[create_test_board()]])
                .append_exec_results([exec(0), exec(1)])
                .into_connection(),
        );

        assert!(service(db).react("owner1", "c1", "👍").await.unwrap());
    }

    #[tokio::test]
    async fn test_react_missing_comment_is_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<board_comment::Model>::new()])
                .into_connection(),
        );

        let result = service(db).react("owner1", "nope", "👍").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
