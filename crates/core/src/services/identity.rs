//! Identity gate.
//!
//! Authentication is delegated to an external identity provider. This module
//! turns a provider session into an [`Identity`] and maps that identity onto a
//! local user row, creating the row on the first authenticated write.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::StatusCode;
use sea_orm::Set;
use serde::Deserialize;
use travelboard_common::config::IdentityConfig;
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::user;
use travelboard_db::repositories::UserRepository;
use url::Url;

/// Username length limits.
const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;

/// Suffixes tried before falling back to an id-derived username.
const USERNAME_ATTEMPTS: u32 = 20;

/// An authenticated caller, as vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The provider's user key.
    pub external_id: String,
}

impl Identity {
    #[must_use]
    pub fn new(external_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
        }
    }
}

/// Profile attributes served by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAttributes {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// External identity provider.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a session token to the provider's user key.
    ///
    /// Returns `None` for tokens the provider rejects.
    async fn authenticate(&self, token: &str) -> AppResult<Option<String>>;

    /// Fetch profile attributes for a provider user.
    async fn profile(&self, external_id: &str) -> AppResult<ProfileAttributes>;
}

/// Identity provider reached over HTTP.
///
/// `GET {base}/session` with the caller's bearer token answers
/// `{"userId": ...}`; `GET {base}/users/{id}` with the server API key answers
/// the profile.
pub struct HttpIdentityProvider {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpIdentityProvider {
    /// Create a provider client from configuration.
    pub fn new(config: &IdentityConfig) -> AppResult<Self> {
        let mut base_url = Url::parse(&config.provider_url)
            .map_err(|e| AppError::Config(format!("Invalid identity provider URL: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::Internal(format!("Invalid identity endpoint: {e}")))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn authenticate(&self, token: &str) -> AppResult<Option<String>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SessionResponse {
            user_id: String,
        }

        let response = self
            .http_client
            .get(self.endpoint("session")?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Identity provider unreachable: {e}")))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Ok(None);
            }
            status if !status.is_success() => {
                return Err(AppError::ExternalService(format!(
                    "Identity provider session check failed: {status}"
                )));
            }
            _ => {}
        }

        let session: SessionResponse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse identity session: {e}"))
        })?;

        Ok(Some(session.user_id))
    }

    async fn profile(&self, external_id: &str) -> AppResult<ProfileAttributes> {
        let mut request = self
            .http_client
            .get(self.endpoint(&format!("users/{external_id}"))?);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Identity provider unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Identity provider profile lookup failed: {status} - {body}"
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse identity profile: {e}"))
        })
    }
}

/// Maps identities onto local users.
#[derive(Clone)]
pub struct IdentityService {
    user_repo: UserRepository,
    provider: Arc<dyn IdentityProvider>,
    id_gen: IdGenerator,
}

impl IdentityService {
    /// Create a new identity service.
    #[must_use]
    pub fn new(user_repo: UserRepository, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            user_repo,
            provider,
            id_gen: IdGenerator::new(),
        }
    }

    /// Resolve a bearer token to an identity.
    pub async fn authenticate(&self, token: &str) -> AppResult<Option<Identity>> {
        Ok(self.provider.authenticate(token).await?.map(Identity::new))
    }

    /// The local user of `identity`, without creating one.
    pub async fn current_user(&self, identity: &Identity) -> AppResult<Option<user::Model>> {
        self.user_repo
            .find_by_external_id(&identity.external_id)
            .await
    }

    /// The local user of `identity`, provisioning it on first use.
    ///
    /// Provider failures surface as `ExternalService`; nothing is retried
    /// here.
    pub async fn ensure_user(&self, identity: &Identity) -> AppResult<user::Model> {
        if let Some(user) = self.current_user(identity).await? {
            return Ok(user);
        }

        let profile = self.provider.profile(&identity.external_id).await?;
        let id = self.id_gen.generate();
        let username = self.available_username(&profile, &id).await?;

        let model = user::ActiveModel {
            id: Set(id),
            external_id: Set(identity.external_id.clone()),
            username: Set(username.clone()),
            first_name: Set(profile.first_name),
            last_name: Set(profile.last_name),
            email: Set(profile.email),
            image_url: Set(profile.image_url),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let inserted = match self.user_repo.insert_if_absent(model).await {
            Ok(inserted) => inserted,
            Err(e) => {
                // A username taken between the availability check and the
                // insert; the external id may also have been provisioned.
                tracing::warn!(error = %e, username = %username, "User provisioning insert failed");
                false
            }
        };

        if inserted {
            tracing::info!(
                external_id = %identity.external_id,
                username = %username,
                "Provisioned user"
            );
        }

        self.current_user(identity).await?.ok_or_else(|| {
            AppError::Conflict("User provisioning raced with another request, retry".to_string())
        })
    }

    /// Pick a free username derived from the profile.
    async fn available_username(&self, profile: &ProfileAttributes, id: &str) -> AppResult<String> {
        let base = base_username(profile);

        for attempt in 0..USERNAME_ATTEMPTS {
            let candidate = if attempt == 0 {
                base.clone()
            } else {
                with_suffix(&base, &attempt.to_string())
            };
            if !self.user_repo.username_exists(&candidate).await? {
                return Ok(candidate);
            }
        }

        Ok(with_suffix(&base, &id[id.len() - 6..]))
    }
}

/// Normalised username seed: provider username, else the email local part,
/// else "traveler".
fn base_username(profile: &ProfileAttributes) -> String {
    let raw = profile
        .username
        .as_deref()
        .or_else(|| profile.email.as_deref().and_then(|e| e.split('@').next()))
        .unwrap_or_default();

    let mut name: String = raw
        .chars()
        .filter_map(|c| {
            if c.is_ascii_alphanumeric() {
                Some(c.to_ascii_lowercase())
            } else if matches!(c, '_' | '-' | '.') {
                Some('_')
            } else {
                None
            }
        })
        .take(USERNAME_MAX)
        .collect();

    if name.len() < USERNAME_MIN {
        name = "traveler".to_string();
    }
    name
}

fn with_suffix(base: &str, suffix: &str) -> String {
    let keep = USERNAME_MAX.saturating_sub(suffix.len()).min(base.len());
    format!("{}{suffix}", &base[..keep])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    struct StaticProvider {
        profile: Option<ProfileAttributes>,
    }

    #[async_trait::async_trait]
    impl IdentityProvider for StaticProvider {
        async fn authenticate(&self, token: &str) -> AppResult<Option<String>> {
            Ok((token == "good").then(|| "ext_1".to_string()))
        }

        async fn profile(&self, _external_id: &str) -> AppResult<ProfileAttributes> {
            self.profile
                .clone()
                .ok_or_else(|| AppError::ExternalService("provider down".to_string()))
        }
    }

    fn create_test_user(username: &str) -> user::Model {
        user::Model {
            id: "user1".to_string(),
            external_id: "ext_1".to_string(),
            username: username.to_string(),
            first_name: None,
            last_name: None,
            email: None,
            image_url: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn count(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }
    }

    #[test]
    fn test_base_username() {
        let profile = ProfileAttributes {
            username: Some("Aiko.Tanaka!".to_string()),
            ..Default::default()
        };
        assert_eq!(base_username(&profile), "aiko_tanaka");

        let profile = ProfileAttributes {
            email: Some("kenji@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(base_username(&profile), "kenji");

        assert_eq!(base_username(&ProfileAttributes::default()), "traveler");
    }

    #[test]
    fn test_with_suffix_respects_max_length() {
        let base = "a".repeat(USERNAME_MAX);
        let name = with_suffix(&base, "12");
        assert_eq!(name.len(), USERNAME_MAX);
        assert!(name.ends_with("12"));
    }

    #[tokio::test]
    async fn test_authenticate() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = IdentityService::new(
            UserRepository::new(db),
            Arc::new(StaticProvider { profile: None }),
        );

        assert_eq!(
            service.authenticate("good").await.unwrap(),
            Some(Identity::new("ext_1"))
        );
        assert_eq!(service.authenticate("bad").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ensure_user_returns_existing() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("aiko")]])
                .into_connection(),
        );
        let service = IdentityService::new(
            UserRepository::new(db),
            Arc::new(StaticProvider { profile: None }),
        );

        let user = service.ensure_user(&Identity::new("ext_1")).await.unwrap();
        assert_eq!(user.username, "aiko");
    }

    #[tokio::test]
    async fn test_ensure_user_provisions_with_suffix() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[count(1)]])
                .append_query_results([[count(0)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[create_test_user("aiko1")]])
                .into_connection(),
        );
        let service = IdentityService::new(
            UserRepository::new(db),
            Arc::new(StaticProvider {
                profile: Some(ProfileAttributes {
                    username: Some("aiko".to_string()),
                    ..Default::default()
                }),
            }),
        );

        let user = service.ensure_user(&Identity::new("ext_1")).await.unwrap();
        assert_eq!(user.username, "aiko1");
    }

    #[tokio::test]
    async fn test_ensure_user_rereads_after_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[count(0)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .append_query_results([[create_test_user("aiko")]])
                .into_connection(),
        );
        let service = IdentityService::new(
            UserRepository::new(db),
            Arc::new(StaticProvider {
                profile: Some(ProfileAttributes {
                    username: Some("aiko".to_string()),
                    ..Default::default()
                }),
            }),
        );

        let user = service.ensure_user(&Identity::new("ext_1")).await.unwrap();
        assert_eq!(user.id, "user1");
    }

    #[tokio::test]
    async fn test_ensure_user_surfaces_provider_failure() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = IdentityService::new(
            UserRepository::new(db),
            Arc::new(StaticProvider { profile: None }),
        );

        let result = service.ensure_user(&Identity::new("ext_1")).await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
