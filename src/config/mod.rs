use std::env;

pub const DEFAULT_VIDEO_BUCKET: &str = "merlin-user-video-bucket";
pub const DEFAULT_SCRIPT_BUCKET: &str = "merlin-user-script-upload-bucket";
pub const DEFAULT_STITCHED_BUCKET: &str = "merlin-stitched-video-bucket";

/// Runtime configuration for the upload API
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bucket receiving `video/*` uploads
    pub video_bucket: String,

    /// Bucket receiving `text/*` uploads (scripts)
    pub script_bucket: String,

    /// Bucket the stitching process writes its output into
    pub stitched_bucket: String,

    /// Table holding processing status records (default: "processing_status")
    pub status_table: String,

    /// Status store connection string
    pub database_url: String,

    /// AWS region for the storage client (default: "us-east-1")
    pub aws_region: String,

    /// Custom S3 endpoint, e.g. a local MinIO. Enables path-style addressing.
    pub s3_endpoint: Option<String>,

    /// Lifetime of signed upload URLs in seconds (default: 60)
    pub upload_url_ttl_secs: u64,

    /// Lifetime of signed download URLs in seconds (default: 3600)
    pub download_url_ttl_secs: u64,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            video_bucket: DEFAULT_VIDEO_BUCKET.to_string(),
            script_bucket: DEFAULT_SCRIPT_BUCKET.to_string(),
            stitched_bucket: DEFAULT_STITCHED_BUCKET.to_string(),
            status_table: "processing_status".to_string(),
            database_url: "sqlite://merlin.db?mode=rwc".to_string(),
            aws_region: "us-east-1".to_string(),
            s3_endpoint: None,
            upload_url_ttl_secs: 60,
            download_url_ttl_secs: 3600,
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            video_bucket: non_empty_var("VIDEO_BUCKET_NAME").unwrap_or(default.video_bucket),
            script_bucket: non_empty_var("SCRIPT_BUCKET_NAME").unwrap_or(default.script_bucket),
            stitched_bucket: non_empty_var("STITCHED_VIDEO_BUCKET_NAME")
                .unwrap_or(default.stitched_bucket),

            status_table: non_empty_var("STATUS_TABLE_NAME").unwrap_or(default.status_table),
            database_url: non_empty_var("DATABASE_URL").unwrap_or(default.database_url),

            aws_region: non_empty_var("AWS_REGION").unwrap_or(default.aws_region),
            s3_endpoint: non_empty_var("S3_ENDPOINT"),

            upload_url_ttl_secs: env::var("UPLOAD_URL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.upload_url_ttl_secs),

            download_url_ttl_secs: env::var("DOWNLOAD_URL_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.download_url_ttl_secs),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(default.allowed_origins),
        }
    }
}

// Empty values fall back to the default, the same as unset ones.
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
