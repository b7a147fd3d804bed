//! User service.

use serde::Serialize;
use travelboard_common::{AppError, AppResult};
use travelboard_db::entities::user;
use travelboard_db::repositories::{FollowRepository, PinRepository, ToggleKey, UserRepository};

/// Public view of a user. Email stays private.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            image_url: user.image_url,
        }
    }
}

/// A user profile with relation counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: UserSummary,
    pub pins_count: u64,
    pub followers_count: u64,
    pub following_count: u64,
    /// Whether the viewer follows this user. `false` for anonymous viewers.
    pub is_following: bool,
}

/// User service for profile lookups.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    pin_repo: PinRepository,
    follow_repo: FollowRepository,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        pin_repo: PinRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            user_repo,
            pin_repo,
            follow_repo,
        }
    }

    /// Profile by user ID or username.
    pub async fn show(
        &self,
        user_id: Option<&str>,
        username: Option<&str>,
        viewer_id: Option<&str>,
    ) -> AppResult<UserProfile> {
        let user = match (user_id, username) {
            (Some(id), _) => self.user_repo.get_by_id(id).await?,
            (None, Some(name)) => self
                .user_repo
                .find_by_username(&name.to_lowercase())
                .await?
                .ok_or_else(|| AppError::NotFound(format!("User: @{name}")))?,
            (None, None) => {
                return Err(AppError::BadRequest(
                    "Either userId or username is required".to_string(),
                ));
            }
        };

        let pins_count = self.pin_repo.count_by_user(&user.id).await?;
        let followers_count = self.follow_repo.count_for_target(&user.id).await?;
        let following_count = self.follow_repo.count_for_actor(&user.id).await?;

        let is_following = match viewer_id {
            Some(viewer) if viewer != user.id => {
                self.follow_repo
                    .is_active(&ToggleKey::new(viewer, user.id.as_str()))
                    .await
            }
            _ => false,
        };

        Ok(UserProfile {
            user: user.into(),
            pins_count,
            followers_count,
            following_count,
            is_following,
        })
    }
}
