//! Generic toggle relation repository.
//!
//! Likes, saves, follows and comment reactions are all the same shape: a row
//! keyed by `(actor, target[, variant])` whose presence is the "on" state.
//! [`ToggleRelation`] describes one such table and [`ToggleRepository`] flips
//! it.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use travelboard_common::{AppError, AppResult};

use crate::entities::{comment_reaction, follow, pin_like, pin_save};

/// Key of a single toggle row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleKey {
    /// User performing the toggle.
    pub actor_id: String,
    /// Pin, user or comment being toggled on.
    pub target_id: String,
    /// Discriminant for relations that allow several rows per pair (emoji).
    pub variant: Option<String>,
}

impl ToggleKey {
    /// Key without a variant.
    #[must_use]
    pub fn new(actor_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            target_id: target_id.into(),
            variant: None,
        }
    }

    /// Key with a variant.
    #[must_use]
    pub fn with_variant(
        actor_id: impl Into<String>,
        target_id: impl Into<String>,
        variant: impl Into<String>,
    ) -> Self {
        Self {
            actor_id: actor_id.into(),
            target_id: target_id.into(),
            variant: Some(variant.into()),
        }
    }

    fn variant_or_empty(&self) -> String {
        self.variant.clone().unwrap_or_default()
    }
}

/// A relation table that can be toggled.
pub trait ToggleRelation: Send + Sync + 'static {
    /// Table entity.
    type Entity: EntityTrait;

    /// Relation name used in logs.
    const NAME: &'static str;

    /// Column holding the actor.
    fn actor_column() -> <Self::Entity as EntityTrait>::Column;

    /// Column holding the target.
    fn target_column() -> <Self::Entity as EntityTrait>::Column;

    /// Creation timestamp column.
    fn created_at_column() -> <Self::Entity as EntityTrait>::Column;

    /// Filter selecting exactly the row for `key`.
    fn key_condition(key: &ToggleKey) -> Condition;

    /// Columns of the composite unique key.
    fn conflict_columns() -> Vec<<Self::Entity as EntityTrait>::Column>;

    /// Build a fresh row for `key`.
    fn new_row(id: String, key: &ToggleKey) -> <Self::Entity as EntityTrait>::ActiveModel;

    /// Reject keys that must never be stored.
    fn validate(_key: &ToggleKey) -> AppResult<()> {
        Ok(())
    }
}

/// Repository over one [`ToggleRelation`].
pub struct ToggleRepository<K> {
    db: Arc<DatabaseConnection>,
    _kind: PhantomData<K>,
}

impl<K> Clone for ToggleRepository<K> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            _kind: PhantomData,
        }
    }
}

impl<K> ToggleRepository<K>
where
    K: ToggleRelation,
    <K::Entity as EntityTrait>::Model:
        IntoActiveModel<<K::Entity as EntityTrait>::ActiveModel> + Send + Sync,
    <K::Entity as EntityTrait>::ActiveModel: ActiveModelTrait<Entity = K::Entity> + Send,
{
    /// Create a new toggle repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            _kind: PhantomData,
        }
    }

    /// Flip the relation and return whether it is now active.
    ///
    /// An existing row is deleted. Otherwise a row is inserted with
    /// `ON CONFLICT DO NOTHING`, so a concurrent insert of the same key still
    /// reports active instead of failing.
    pub async fn toggle(&self, id: String, key: &ToggleKey) -> AppResult<bool> {
        K::validate(key)?;

        let deleted = K::Entity::delete_many()
            .filter(K::key_condition(key))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected > 0 {
            tracing::debug!(
                relation = K::NAME,
                actor = %key.actor_id,
                target = %key.target_id,
                "Toggled off"
            );
            return Ok(false);
        }

        let inserted = K::Entity::insert(K::new_row(id, key))
            .on_conflict(
                OnConflict::columns(K::conflict_columns())
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if inserted == 0 {
            tracing::debug!(
                relation = K::NAME,
                actor = %key.actor_id,
                target = %key.target_id,
                "Already active"
            );
        } else {
            tracing::debug!(
                relation = K::NAME,
                actor = %key.actor_id,
                target = %key.target_id,
                "Toggled on"
            );
        }

        Ok(true)
    }

    /// Whether the row for `key` exists.
    pub async fn exists(&self, key: &ToggleKey) -> AppResult<bool> {
        let count = K::Entity::find()
            .filter(K::key_condition(key))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Like [`exists`](Self::exists), but a failed lookup reads as `false`.
    pub async fn is_active(&self, key: &ToggleKey) -> bool {
        match self.exists(key).await {
            Ok(active) => active,
            Err(e) => {
                tracing::warn!(relation = K::NAME, error = %e, "Toggle state lookup failed");
                false
            }
        }
    }

    /// Number of rows pointing at `target_id`.
    pub async fn count_for_target(&self, target_id: &str) -> AppResult<u64> {
        K::Entity::find()
            .filter(K::target_column().eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of rows created by `actor_id`.
    pub async fn count_for_actor(&self, actor_id: &str) -> AppResult<u64> {
        K::Entity::find()
            .filter(K::actor_column().eq(actor_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Rows created by `actor_id`, newest first.
    pub async fn find_by_actor(
        &self,
        actor_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<<K::Entity as EntityTrait>::Model>> {
        K::Entity::find()
            .filter(K::actor_column().eq(actor_id))
            .order_by_desc(K::created_at_column())
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Rows pointing at `target_id`, newest first.
    pub async fn find_by_target(
        &self,
        target_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<<K::Entity as EntityTrait>::Model>> {
        K::Entity::find()
            .filter(K::target_column().eq(target_id))
            .order_by_desc(K::created_at_column())
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

// ==================== Relation kinds ====================

/// `pin_like` rows: user likes pin.
pub struct PinLikeRelation;

impl ToggleRelation for PinLikeRelation {
    type Entity = pin_like::Entity;
    const NAME: &'static str = "pin_like";

    fn actor_column() -> pin_like::Column {
        pin_like::Column::UserId
    }

    fn target_column() -> pin_like::Column {
        pin_like::Column::PinId
    }

    fn created_at_column() -> pin_like::Column {
        pin_like::Column::CreatedAt
    }

    fn key_condition(key: &ToggleKey) -> Condition {
        Condition::all()
            .add(pin_like::Column::UserId.eq(key.actor_id.as_str()))
            .add(pin_like::Column::PinId.eq(key.target_id.as_str()))
    }

    fn conflict_columns() -> Vec<pin_like::Column> {
        vec![pin_like::Column::UserId, pin_like::Column::PinId]
    }

    fn new_row(id: String, key: &ToggleKey) -> pin_like::ActiveModel {
        pin_like::ActiveModel {
            id: Set(id),
            user_id: Set(key.actor_id.clone()),
            pin_id: Set(key.target_id.clone()),
            created_at: Set(Utc::now().into()),
        }
    }
}

/// `pin_save` rows: user saved pin.
pub struct PinSaveRelation;

impl ToggleRelation for PinSaveRelation {
    type Entity = pin_save::Entity;
    const NAME: &'static str = "pin_save";

    fn actor_column() -> pin_save::Column {
        pin_save::Column::UserId
    }

    fn target_column() -> pin_save::Column {
        pin_save::Column::PinId
    }

    fn created_at_column() -> pin_save::Column {
        pin_save::Column::CreatedAt
    }

    fn key_condition(key: &ToggleKey) -> Condition {
        Condition::all()
            .add(pin_save::Column::UserId.eq(key.actor_id.as_str()))
            .add(pin_save::Column::PinId.eq(key.target_id.as_str()))
    }

    fn conflict_columns() -> Vec<pin_save::Column> {
        vec![pin_save::Column::UserId, pin_save::Column::PinId]
    }

    fn new_row(id: String, key: &ToggleKey) -> pin_save::ActiveModel {
        pin_save::ActiveModel {
            id: Set(id),
            user_id: Set(key.actor_id.clone()),
            pin_id: Set(key.target_id.clone()),
            created_at: Set(Utc::now().into()),
        }
    }
}

/// `follow` rows: actor follows target user.
pub struct FollowRelation;

impl ToggleRelation for FollowRelation {
    type Entity = follow::Entity;
    const NAME: &'static str = "follow";

    fn actor_column() -> follow::Column {
        follow::Column::FollowerId
    }

    fn target_column() -> follow::Column {
        follow::Column::FolloweeId
    }

    fn created_at_column() -> follow::Column {
        follow::Column::CreatedAt
    }

    fn key_condition(key: &ToggleKey) -> Condition {
        Condition::all()
            .add(follow::Column::FollowerId.eq(key.actor_id.as_str()))
            .add(follow::Column::FolloweeId.eq(key.target_id.as_str()))
    }

    fn conflict_columns() -> Vec<follow::Column> {
        vec![follow::Column::FollowerId, follow::Column::FolloweeId]
    }

    fn new_row(id: String, key: &ToggleKey) -> follow::ActiveModel {
        follow::ActiveModel {
            id: Set(id),
            follower_id: Set(key.actor_id.clone()),
            followee_id: Set(key.target_id.clone()),
            created_at: Set(Utc::now().into()),
        }
    }

    fn validate(key: &ToggleKey) -> AppResult<()> {
        if key.actor_id == key.target_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }
        Ok(())
    }
}

/// `comment_reaction` rows: user reacted to comment with an emoji.
pub struct CommentReactionRelation;

impl ToggleRelation for CommentReactionRelation {
    type Entity = comment_reaction::Entity;
    const NAME: &'static str = "comment_reaction";

    fn actor_column() -> comment_reaction::Column {
        comment_reaction::Column::UserId
    }

    fn target_column() -> comment_reaction::Column {
        comment_reaction::Column::CommentId
    }

    fn created_at_column() -> comment_reaction::Column {
        comment_reaction::Column::CreatedAt
    }

    fn key_condition(key: &ToggleKey) -> Condition {
        Condition::all()
            .add(comment_reaction::Column::UserId.eq(key.actor_id.as_str()))
            .add(comment_reaction::Column::CommentId.eq(key.target_id.as_str()))
            .add(comment_reaction::Column::Emoji.eq(key.variant_or_empty()))
    }

    fn conflict_columns() -> Vec<comment_reaction::Column> {
        vec![
            comment_reaction::Column::UserId,
            comment_reaction::Column::CommentId,
            comment_reaction::Column::Emoji,
        ]
    }

    fn new_row(id: String, key: &ToggleKey) -> comment_reaction::ActiveModel {
        comment_reaction::ActiveModel {
            id: Set(id),
            user_id: Set(key.actor_id.clone()),
            comment_id: Set(key.target_id.clone()),
            emoji: Set(key.variant_or_empty()),
            created_at: Set(Utc::now().into()),
        }
    }

    fn validate(key: &ToggleKey) -> AppResult<()> {
        match key.variant.as_deref().map(str::trim) {
            Some(emoji) if !emoji.is_empty() && emoji.chars().count() <= 64 => Ok(()),
            _ => Err(AppError::Validation("Reaction emoji is required".to_string())),
        }
    }
}

/// Likes.
pub type PinLikeRepository = ToggleRepository<PinLikeRelation>;
/// Saves.
pub type PinSaveRepository = ToggleRepository<PinSaveRelation>;
/// Follows.
pub type FollowRepository = ToggleRepository<FollowRelation>;
/// Comment reactions.
pub type CommentReactionRepository = ToggleRepository<CommentReactionRelation>;
