//! Object storage boundary for uploaded media.
//!
//! The core only needs two things from storage: turn bytes into a durable URL,
//! and forget a URL it handed out earlier.

use std::path::PathBuf;

use crate::{AppError, AppResult};

/// Uploaded file metadata.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Storage key (path relative to the storage root).
    pub key: String,
    /// Durable public URL.
    pub url: String,
    /// File size in bytes.
    pub size: u64,
    /// MIME content type.
    pub content_type: String,
    /// MD5 hash of the file.
    pub md5: String,
}

/// Storage backend trait.
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync {
    /// Store `data` under `folder` and return its durable URL.
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile>;

    /// Delete the object behind a URL previously returned by [`upload`].
    ///
    /// Returns `false` when the URL does not belong to this backend or the
    /// object is already gone.
    ///
    /// [`upload`]: StorageBackend::upload
    async fn delete_by_url(&self, url: &str) -> AppResult<bool>;
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new local storage backend.
    #[must_use]
    pub fn new(base_path: PathBuf, base_url: impl Into<String>) -> Self {
        Self {
            base_path,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn key_for_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        url.strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty() && !key.split('/').any(|part| part == ".."))
    }
}

#[async_trait::async_trait]
impl StorageBackend for LocalStorage {
    async fn upload(
        &self,
        folder: &str,
        file_name: &str,
        data: &[u8],
        content_type: &str,
    ) -> AppResult<UploadedFile> {
        let key = generate_storage_key(folder, file_name);
        let path = self.base_path.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create directory: {e}")))?;
        }

        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to write file: {e}")))?;

        tracing::debug!(key = %key, size = data.len(), "Stored upload");

        Ok(UploadedFile {
            url: self.public_url(&key),
            size: data.len() as u64,
            content_type: content_type.to_string(),
            md5: format!("{:x}", md5::compute(data)),
            key,
        })
    }

    async fn delete_by_url(&self, url: &str) -> AppResult<bool> {
        let Some(key) = self.key_for_url(url) else {
            return Ok(false);
        };

        match tokio::fs::remove_file(self.base_path.join(key)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(AppError::Internal(format!("Failed to delete file: {e}"))),
        }
    }
}

/// Generate a unique storage key for a file inside `folder`.
#[must_use]
pub fn generate_storage_key(folder: &str, original_name: &str) -> String {
    use chrono::Utc;

    let now = Utc::now();
    let date_path = now.format("%Y/%m/%d").to_string();

    let extension = original_name
        .rfind('.')
        .filter(|&pos| pos > 0 && pos < original_name.len() - 1)
        .map(|pos| &original_name[pos + 1..])
        .filter(|ext| ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map_or_else(|| "bin".to_string(), str::to_ascii_lowercase);

    let folder: String = folder
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();

    format!("{folder}/{date_path}/{}.{extension}", uuid::Uuid::new_v4().simple())
}
