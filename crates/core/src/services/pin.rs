//! Pin service.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use travelboard_common::{AppError, AppResult, IdGenerator, StorageBackend, UploadedFile};
use travelboard_db::entities::pin;
use travelboard_db::repositories::{PinRepository, TagRepository, TagWithCount, UserRepository};
use validator::Validate;

use super::social::{PinEngagement, SocialService};
use super::user::UserSummary;

/// Maximum number of tags on one pin.
const MAX_TAGS: usize = 20;
/// Maximum tag length after normalisation.
const MAX_TAG_LENGTH: usize = 64;
/// Maximum pin title length.
const MAX_TITLE_LENGTH: usize = 256;
/// Maximum page size for pin listings.
const MAX_LIMIT: u64 = 100;

/// Input for creating a pin.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePinInput {
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    #[validate(length(max = 256))]
    pub location: Option<String>,
    pub image_url: Option<String>,
    #[validate(url)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Input for updating a pin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePinInput {
    pub pin_id: String,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub link: Option<Option<String>>,
    /// Replaces the whole tag set when present.
    pub tags: Option<Vec<String>>,
}

/// A pin with its author, tags and engagement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinDetails {
    pub pin: pin::Model,
    pub author: Option<UserSummary>,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub engagement: PinEngagement,
}

/// Service for pins, their tags and their media.
#[derive(Clone)]
pub struct PinService {
    pin_repo: PinRepository,
    tag_repo: TagRepository,
    user_repo: UserRepository,
    social: SocialService,
    storage: Arc<dyn StorageBackend>,
    max_upload_bytes: usize,
    id_gen: IdGenerator,
}

impl PinService {
    /// Create a new pin service.
    #[must_use]
    pub fn new(
        pin_repo: PinRepository,
        tag_repo: TagRepository,
        user_repo: UserRepository,
        social: SocialService,
        storage: Arc<dyn StorageBackend>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            pin_repo,
            tag_repo,
            user_repo,
            social,
            storage,
            max_upload_bytes,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a pin owned by `user_id`.
    pub async fn create(&self, user_id: &str, input: CreatePinInput) -> AppResult<PinDetails> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Pin title must not be blank".to_string()));
        }

        let tags = normalize_tags(&input.tags)?;
        let candidates = self.tag_candidates(&tags);

        let model = pin::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            title: Set(title),
            description: Set(input.description),
            location: Set(input.location),
            image_url: Set(input.image_url),
            link: Set(input.link),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let pin = self.pin_repo.create_with_tags(model, &candidates).await?;
        tracing::debug!(pin_id = %pin.id, user_id = %user_id, tags = tags.len(), "Created pin");

        Ok(PinDetails {
            pin,
            author: None,
            tags,
            engagement: PinEngagement::default(),
        })
    }

    /// A pin with author, tags, counts and the viewer's like/save state.
    pub async fn show(&self, pin_id: &str, viewer_id: Option<&str>) -> AppResult<PinDetails> {
        let pin = self.pin_repo.get_by_id(pin_id).await?;
        let author = self
            .user_repo
            .find_by_id(&pin.user_id)
            .await?
            .map(UserSummary::from);
        let tags = self
            .tag_repo
            .find_by_pin(&pin.id)
            .await?
            .into_iter()
            .map(|t| t.name)
            .collect();
        let engagement = self.social.engagement(&pin.id, viewer_id).await?;

        Ok(PinDetails {
            pin,
            author,
            tags,
            engagement,
        })
    }

    /// Update a pin. Owner only.
    pub async fn update(&self, user_id: &str, input: UpdatePinInput) -> AppResult<pin::Model> {
        let pin = self.owned_pin(&input.pin_id, user_id).await?;
        let previous_image = pin.image_url.clone();

        let mut active: pin::ActiveModel = pin.into();

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() || title.chars().count() > MAX_TITLE_LENGTH {
                return Err(AppError::Validation(format!(
                    "Pin title must be between 1 and {MAX_TITLE_LENGTH} characters"
                )));
            }
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(link) = input.link {
            if let Some(ref url) = link {
                url::Url::parse(url)
                    .map_err(|e| AppError::Validation(format!("Invalid link: {e}")))?;
            }
            active.link = Set(link);
        }
        let replaced_image = match input.image_url {
            Some(image_url) => {
                let replaced = image_url != previous_image;
                active.image_url = Set(image_url);
                replaced
            }
            None => false,
        };

        let candidates = match input.tags {
            Some(ref tags) => Some(self.tag_candidates(&normalize_tags(tags)?)),
            None => None,
        };

        active.updated_at = Set(Some(Utc::now().into()));
        let pin = self
            .pin_repo
            .update_with_tags(active, candidates.as_deref())
            .await?;

        if replaced_image && let Some(url) = previous_image {
            self.delete_media(&url).await;
        }

        Ok(pin)
    }

    /// Delete a pin and its stored image. Owner only.
    pub async fn delete(&self, user_id: &str, pin_id: &str) -> AppResult<()> {
        let pin = self.owned_pin(pin_id, user_id).await?;
        self.pin_repo.delete(&pin.id).await?;

        if let Some(url) = pin.image_url {
            self.delete_media(&url).await;
        }

        tracing::info!(pin_id = %pin_id, user_id = %user_id, "Deleted pin");
        Ok(())
    }

    /// Store an image and return its durable URL.
    pub async fn upload_image(
        &self,
        user_id: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> AppResult<UploadedFile> {
        if !content_type.starts_with("image/") {
            return Err(AppError::Validation(format!(
                "Unsupported content type: {content_type}"
            )));
        }
        if data.is_empty() {
            return Err(AppError::Validation("Empty upload".to_string()));
        }
        if data.len() > self.max_upload_bytes {
            return Err(AppError::Validation(format!(
                "File exceeds the {} byte limit",
                self.max_upload_bytes
            )));
        }

        let uploaded = self
            .storage
            .upload("pins", file_name, data, content_type)
            .await?;
        tracing::debug!(
            user_id = %user_id,
            key = %uploaded.key,
            size = uploaded.size,
            "Uploaded pin image"
        );
        Ok(uploaded)
    }

    /// Pins created by a user, newest first.
    pub async fn list_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<pin::Model>> {
        self.pin_repo
            .find_by_user(user_id, limit.min(MAX_LIMIT), offset)
            .await
    }

    /// Tags by number of linked pins.
    pub async fn popular_tags(&self, limit: u64) -> AppResult<Vec<TagWithCount>> {
        self.tag_repo.find_popular(limit.min(MAX_LIMIT)).await
    }

    async fn owned_pin(&self, pin_id: &str, user_id: &str) -> AppResult<pin::Model> {
        let pin = self.pin_repo.get_by_id(pin_id).await?;
        if pin.user_id != user_id {
            return Err(AppError::Forbidden("Not the pin owner".to_string()));
        }
        Ok(pin)
    }

    fn tag_candidates(&self, tags: &[String]) -> Vec<(String, String)> {
        tags.iter()
            .map(|name| (self.id_gen.generate(), name.clone()))
            .collect()
    }

    async fn delete_media(&self, url: &str) {
        if let Err(e) = self.storage.delete_by_url(url).await {
            tracing::warn!(url = %url, error = %e, "Failed to delete stored pin image");
        }
    }
}

/// Trim, strip a leading `#`, lowercase and deduplicate tags, keeping the
/// first occurrence's position.
pub fn normalize_tags(raw: &[String]) -> AppResult<Vec<String>> {
    let mut tags: Vec<String> = Vec::new();

    for tag in raw {
        let name = tag.trim().trim_start_matches('#').trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        if name.chars().count() > MAX_TAG_LENGTH {
            return Err(AppError::Validation(format!(
                "Tag must be at most {MAX_TAG_LENGTH} characters: {name}"
            )));
        }
        if !tags.contains(&name) {
            tags.push(name);
        }
    }

    if tags.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "A pin can have at most {MAX_TAGS} tags"
        )));
    }

    Ok(tags)
}
