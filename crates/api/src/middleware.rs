//! API middleware and shared state.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use travelboard_common::{AppResult, StorageBackend};
use travelboard_core::{
    ActivityService, BoardPinService, BoardService, CommentService, Identity, IdentityProvider,
    IdentityService, MemberService, PermissionService, PinService, SearchService, SocialService,
    TimelineService, UserService,
};
use travelboard_db::entities::user;
use travelboard_db::repositories::{
    ActivityRepository, BoardMemberRepository, BoardPinRepository, BoardRepository,
    CommentReactionRepository, CommentRepository, FollowRepository, PinLikeRepository,
    PinReportRepository, PinRepository, PinSaveRepository, TagRepository, TimelineRepository,
    UserRepository,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub identity_service: IdentityService,
    pub user_service: UserService,
    pub board_service: BoardService,
    pub member_service: MemberService,
    pub board_pin_service: BoardPinService,
    pub timeline_service: TimelineService,
    pub comment_service: CommentService,
    pub activity_service: ActivityService,
    pub pin_service: PinService,
    pub social_service: SocialService,
    pub search_service: SearchService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        identity_provider: Arc<dyn IdentityProvider>,
        storage: Arc<dyn StorageBackend>,
        max_upload_bytes: usize,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let board_repo = BoardRepository::new(Arc::clone(&db));
        let member_repo = BoardMemberRepository::new(Arc::clone(&db));
        let board_pin_repo = BoardPinRepository::new(Arc::clone(&db));
        let pin_repo = PinRepository::new(Arc::clone(&db));
        let tag_repo = TagRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));

        let permissions = PermissionService::new(board_repo.clone(), member_repo.clone());
        let activity_service = ActivityService::new(
            ActivityRepository::new(Arc::clone(&db)),
            permissions.clone(),
        );
        let social_service = SocialService::new(
            pin_repo.clone(),
            user_repo.clone(),
            PinLikeRepository::new(Arc::clone(&db)),
            PinSaveRepository::new(Arc::clone(&db)),
            follow_repo.clone(),
            PinReportRepository::new(Arc::clone(&db)),
        );

        Self {
            identity_service: IdentityService::new(user_repo.clone(), identity_provider),
            user_service: UserService::new(user_repo.clone(), pin_repo.clone(), follow_repo),
            board_service: BoardService::new(
                board_repo.clone(),
                permissions.clone(),
                activity_service.clone(),
            ),
            member_service: MemberService::new(
                member_repo,
                user_repo.clone(),
                permissions.clone(),
                activity_service.clone(),
            ),
            board_pin_service: BoardPinService::new(
                board_pin_repo.clone(),
                pin_repo.clone(),
                permissions.clone(),
                activity_service.clone(),
            ),
            timeline_service: TimelineService::new(
                TimelineRepository::new(Arc::clone(&db)),
                board_pin_repo,
                permissions.clone(),
            ),
            comment_service: CommentService::new(
                CommentRepository::new(Arc::clone(&db)),
                CommentReactionRepository::new(db),
                permissions,
            ),
            pin_service: PinService::new(
                pin_repo.clone(),
                tag_repo.clone(),
                user_repo.clone(),
                social_service.clone(),
                storage,
                max_upload_bytes,
            ),
            search_service: SearchService::new(pin_repo, user_repo, board_repo, tag_repo),
            activity_service,
            social_service,
        }
    }

    /// Local user for a write, provisioned on first use.
    pub async fn acting_user(&self, identity: &Identity) -> AppResult<user::Model> {
        self.identity_service.ensure_user(identity).await
    }

    /// Local user ID of an optional reader. Readers who were never
    /// provisioned are treated as anonymous.
    pub async fn viewer_id(&self, identity: Option<&Identity>) -> AppResult<Option<String>> {
        match identity {
            Some(identity) => Ok(self
                .identity_service
                .current_user(identity)
                .await?
                .map(|user| user.id)),
            None => Ok(None),
        }
    }
}

/// Authentication middleware.
///
/// A valid bearer token attaches an [`Identity`] to the request. Missing or
/// rejected tokens leave the request anonymous; provider failures are
/// returned to the caller to retry.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.identity_service.authenticate(token.trim()).await {
            Ok(Some(identity)) => {
                req.extensions_mut().insert(identity);
            }
            Ok(None) => {
                tracing::debug!("Bearer token rejected by identity provider");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Identity provider unavailable");
                return e.into_response();
            }
        }
    }

    next.run(req).await
}
