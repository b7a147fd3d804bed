//! Likes, saves, follows and reports.
//!
//! Likes, saves and follows are toggle relations: row presence is the state,
//! counts are always computed from rows. Reports are write-once per user and
//! pin.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::pin;
use travelboard_db::repositories::{
    FollowRepository, PinLikeRepository, PinReportRepository, PinRepository, PinSaveRepository,
    ToggleKey, UserRepository,
};
use validator::Validate;

use super::user::UserSummary;

/// Maximum page size for relation listings.
const MAX_LIMIT: u64 = 100;

/// Input for reporting a pin.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReportPinInput {
    pub pin_id: String,
    #[validate(length(max = 1024))]
    pub reason: Option<String>,
}

/// Result of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutcome {
    /// The caller has a report on record for the pin.
    pub reported: bool,
    /// The report existed before this request.
    pub already_reported: bool,
    pub report_count: u64,
}

/// Like and save counts plus the viewer's own state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinEngagement {
    pub like_count: u64,
    pub save_count: u64,
    pub liked: bool,
    pub saved: bool,
    /// Whether the viewer has reported the pin.
    pub reported: bool,
}

/// Service for social relations between users and pins.
#[derive(Clone)]
pub struct SocialService {
    pin_repo: PinRepository,
    user_repo: UserRepository,
    like_repo: PinLikeRepository,
    save_repo: PinSaveRepository,
    follow_repo: FollowRepository,
    report_repo: PinReportRepository,
    id_gen: IdGenerator,
}

impl SocialService {
    /// Create a new social service.
    #[must_use]
    pub const fn new(
        pin_repo: PinRepository,
        user_repo: UserRepository,
        like_repo: PinLikeRepository,
        save_repo: PinSaveRepository,
        follow_repo: FollowRepository,
        report_repo: PinReportRepository,
    ) -> Self {
        Self {
            pin_repo,
            user_repo,
            like_repo,
            save_repo,
            follow_repo,
            report_repo,
            id_gen: IdGenerator::new(),
        }
    }

    // ==================== Toggles ====================

    /// Like or unlike a pin. Returns whether the pin is now liked.
    pub async fn toggle_like(&self, user_id: &str, pin_id: &str) -> AppResult<bool> {
        self.pin_repo.get_by_id(pin_id).await?;
        self.like_repo
            .toggle(self.id_gen.generate(), &ToggleKey::new(user_id, pin_id))
            .await
    }

    /// Save or unsave a pin. Returns whether the pin is now saved.
    pub async fn toggle_save(&self, user_id: &str, pin_id: &str) -> AppResult<bool> {
        self.pin_repo.get_by_id(pin_id).await?;
        self.save_repo
            .toggle(self.id_gen.generate(), &ToggleKey::new(user_id, pin_id))
            .await
    }

    /// Follow or unfollow a user. Returns whether the caller now follows them.
    pub async fn toggle_follow(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        if follower_id == followee_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        self.user_repo.get_by_id(followee_id).await?;
        self.follow_repo
            .toggle(
                self.id_gen.generate(),
                &ToggleKey::new(follower_id, followee_id),
            )
            .await
    }

    // ==================== Reports ====================

    /// Report a pin. Repeated reports by the same user are not stored twice.
    pub async fn report(&self, user_id: &str, input: ReportPinInput) -> AppResult<ReportOutcome> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.pin_repo.get_by_id(&input.pin_id).await?;

        let reason = input
            .reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let created = self
            .report_repo
            .create_if_absent(self.id_gen.generate(), user_id, &input.pin_id, reason)
            .await?;
        let report_count = self.report_repo.count_by_pin(&input.pin_id).await?;

        if created {
            tracing::info!(
                pin_id = %input.pin_id,
                reporter = %user_id,
                report_count,
                "Pin reported"
            );
        }

        Ok(ReportOutcome {
            reported: true,
            already_reported: !created,
            report_count,
        })
    }

    // ==================== State queries ====================

    /// Whether the user likes the pin. Lookup failures read as `false`.
    pub async fn is_liked(&self, user_id: &str, pin_id: &str) -> bool {
        self.like_repo.is_active(&ToggleKey::new(user_id, pin_id)).await
    }

    /// Whether the user saved the pin. Lookup failures read as `false`.
    pub async fn is_saved(&self, user_id: &str, pin_id: &str) -> bool {
        self.save_repo.is_active(&ToggleKey::new(user_id, pin_id)).await
    }

    /// Whether `follower_id` follows `followee_id`. Lookup failures read as
    /// `false`.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> bool {
        self.follow_repo
            .is_active(&ToggleKey::new(follower_id, followee_id))
            .await
    }

    /// Whether the user reported the pin. Lookup failures read as `false`.
    pub async fn has_reported(&self, user_id: &str, pin_id: &str) -> bool {
        match self.report_repo.exists(user_id, pin_id).await {
            Ok(reported) => reported,
            Err(e) => {
                tracing::warn!(pin_id = %pin_id, error = %e, "Report state lookup failed");
                false
            }
        }
    }

    /// Like and save counts of a pin, with the viewer's own state.
    pub async fn engagement(
        &self,
        pin_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<PinEngagement> {
        let like_count = self.like_repo.count_for_target(pin_id).await?;
        let save_count = self.save_repo.count_for_target(pin_id).await?;

        let (liked, saved, reported) = match viewer_id {
            Some(viewer) => (
                self.is_liked(viewer, pin_id).await,
                self.is_saved(viewer, pin_id).await,
                self.has_reported(viewer, pin_id).await,
            ),
            None => (false, false, false),
        };

        Ok(PinEngagement {
            like_count,
            save_count,
            liked,
            saved,
            reported,
        })
    }

    // ==================== Listings ====================

    /// Users following `user_id`, most recent first.
    pub async fn followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<UserSummary>> {
        let ids: Vec<String> = self
            .follow_repo
            .find_by_target(user_id, limit.min(MAX_LIMIT), offset)
            .await?
            .into_iter()
            .map(|row| row.follower_id)
            .collect();
        self.users_in_order(&ids).await
    }

    /// Users `user_id` follows, most recent first.
    pub async fn following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<UserSummary>> {
        let ids: Vec<String> = self
            .follow_repo
            .find_by_actor(user_id, limit.min(MAX_LIMIT), offset)
            .await?
            .into_iter()
            .map(|row| row.followee_id)
            .collect();
        self.users_in_order(&ids).await
    }

    /// Pins the user liked, most recent first.
    pub async fn liked_pins(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<pin::Model>> {
        let ids: Vec<String> = self
            .like_repo
            .find_by_actor(user_id, limit.min(MAX_LIMIT), offset)
            .await?
            .into_iter()
            .map(|row| row.pin_id)
            .collect();
        self.pins_in_order(&ids).await
    }

    /// Pins the user saved, most recent first.
    pub async fn saved_pins(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<pin::Model>> {
        let ids: Vec<String> = self
            .save_repo
            .find_by_actor(user_id, limit.min(MAX_LIMIT), offset)
            .await?
            .into_iter()
            .map(|row| row.pin_id)
            .collect();
        self.pins_in_order(&ids).await
    }

    async fn users_in_order(&self, ids: &[String]) -> AppResult<Vec<UserSummary>> {
        let mut by_id: HashMap<String, _> = self
            .user_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .map(UserSummary::from)
            .collect())
    }

    async fn pins_in_order(&self, ids: &[String]) -> AppResult<Vec<pin::Model>> {
        let mut by_id: HashMap<String, _> = self
            .pin_repo
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }
}
