use crate::config::AppConfig;
use crate::services::storage::StorageService;
use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unsupported file type: {0}")]
pub struct UnsupportedContentType(pub String);

/// Where an upload lands, decided by the declared content type's prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Video,
    Script,
}

impl Destination {
    /// Prefix match, case-sensitive. Anything after the prefix (subtype,
    /// parameters) is not inspected.
    pub fn classify(content_type: &str) -> Result<Self, UnsupportedContentType> {
        if content_type.starts_with("video/") {
            Ok(Destination::Video)
        } else if content_type.starts_with("text/") {
            Ok(Destination::Script)
        } else {
            Err(UnsupportedContentType(content_type.to_string()))
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Video => write!(f, "video"),
            Destination::Script => write!(f, "script"),
        }
    }
}

/// Issues signed upload URLs and looks up stitched output for a session.
pub struct UploadService {
    storage: Arc<dyn StorageService>,
    config: AppConfig,
}

impl UploadService {
    pub fn new(storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self { storage, config }
    }

    pub fn bucket_for(&self, destination: Destination) -> &str {
        match destination {
            Destination::Video => &self.config.video_bucket,
            Destination::Script => &self.config.script_bucket,
        }
    }

    pub async fn issue_upload_url(
        &self,
        folder_name: &str,
        file_name: &str,
        content_type: &str,
    ) -> Result<String> {
        let destination = Destination::classify(content_type)?;
        let bucket = self.bucket_for(destination);
        let key = format!("{}/{}", folder_name, file_name);

        let url = self
            .storage
            .presign_put(
                bucket,
                &key,
                content_type,
                Duration::from_secs(self.config.upload_url_ttl_secs),
            )
            .await?;

        tracing::info!(
            "📝 File \"{}\" ({}) routed to {} bucket: {}, folder: {}",
            file_name,
            content_type,
            destination,
            bucket,
            folder_name
        );

        Ok(url)
    }

    /// Signed download URL for the first object under `<folder_name>/`, or
    /// `None` while the stitching process has not written anything yet.
    pub async fn locate_stitched_video(&self, folder_name: &str) -> Result<Option<String>> {
        let prefix = format!("{}/", folder_name);
        let keys = self
            .storage
            .list_objects(&self.config.stitched_bucket, &prefix)
            .await?;

        let Some(key) = keys.first() else {
            tracing::debug!("⏳ No stitched video yet for folder {}", folder_name);
            return Ok(None);
        };

        let url = self
            .storage
            .presign_get(
                &self.config.stitched_bucket,
                key,
                Duration::from_secs(self.config.download_url_ttl_secs),
            )
            .await?;

        tracing::info!("🎬 Stitched video ready for folder {}: {}", folder_name, key);
        Ok(Some(url))
    }
}
