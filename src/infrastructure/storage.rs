use crate::config::AppConfig;
use crate::services::storage::{S3StorageService, StorageService};
use anyhow::{Context, Result};
use aws_sdk_s3::config::{Credentials, Region};
use std::env;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the process-wide S3 client. Credentials are required up front so a
/// misconfigured deployment fails at startup instead of on the first upload.
pub async fn setup_storage(config: &AppConfig) -> Result<Arc<S3StorageService>> {
    let access_key = env::var("AWS_ACCESS_KEY_ID").context("AWS_ACCESS_KEY_ID must be set")?;
    let secret_key =
        env::var("AWS_SECRET_ACCESS_KEY").context("AWS_SECRET_ACCESS_KEY must be set")?;

    let mut loader = aws_config::from_env()
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(Credentials::new(
            access_key, secret_key, None, None, "static",
        ));

    if let Some(endpoint_url) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint_url);
    }

    let aws_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();

    info!(
        "☁️  S3 Storage: region={} endpoint={}",
        config.aws_region,
        config.s3_endpoint.as_deref().unwrap_or("aws")
    );

    let storage = Arc::new(S3StorageService::new(aws_sdk_s3::Client::from_conf(
        s3_config,
    )));

    for bucket in [
        &config.video_bucket,
        &config.script_bucket,
        &config.stitched_bucket,
    ] {
        match storage.bucket_exists(bucket).await {
            Ok(true) => info!("✅ Bucket '{}' is reachable", bucket),
            Ok(false) => warn!("🪣 Bucket '{}' does not exist", bucket),
            Err(e) => warn!("⚠️ Could not check bucket '{}': {:#}", bucket, e),
        }
    }

    Ok(storage)
}
