#![allow(dead_code)]

use async_trait::async_trait;
use merlin_uploader::config::AppConfig;
use merlin_uploader::services::status_store::{SqlStatusStore, StatusStore};
use merlin_uploader::services::storage::StorageService;
use merlin_uploader::services::upload_service::UploadService;
use merlin_uploader::AppState;
use sea_orm::{ConnectOptions, Database};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct PresignCall {
    pub method: &'static str,
    pub bucket: String,
    pub key: String,
    pub content_type: Option<String>,
    pub expires_in: Duration,
}

/// In-memory stand-in for S3. Signed URLs point at `base_url`, so a test
/// server can accept the PUTs itself.
pub struct MockStorageService {
    pub base_url: String,
    pub stitched_bucket: String,
    pub objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    pub presigned: Mutex<Vec<PresignCall>>,
    pub list_calls: AtomicU32,
    pub fail_listing: AtomicBool,
    pub fail_presign: AtomicBool,
    /// Pretend the stitching process finished once this many listings of
    /// the stitched bucket came back empty.
    pub stitch_after_checks: Option<u32>,
}

impl MockStorageService {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            stitched_bucket: AppConfig::default().stitched_bucket,
            objects: Mutex::new(BTreeMap::new()),
            presigned: Mutex::new(Vec::new()),
            list_calls: AtomicU32::new(0),
            fail_listing: AtomicBool::new(false),
            fail_presign: AtomicBool::new(false),
            stitch_after_checks: None,
        }
    }

    pub fn stitching_after(mut self, checks: u32) -> Self {
        self.stitch_after_checks = Some(checks);
        self
    }

    pub fn put_object(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
    }

    pub fn keys_in(&self, bucket: &str) -> Vec<String> {
        self.objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn presign_calls(&self) -> Vec<PresignCall> {
        self.presigned.lock().unwrap().clone()
    }

    fn signed_url(&self, bucket: &str, key: &str, expires_in: Duration) -> String {
        format!(
            "{}/mock-s3/{}/{}?X-Amz-Expires={}&X-Amz-Signature=mock",
            self.base_url,
            bucket,
            key,
            expires_in.as_secs()
        )
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            anyhow::bail!("InvalidAccessKeyId: AKIAEXAMPLE1234 is not valid");
        }
        self.presigned.lock().unwrap().push(PresignCall {
            method: "PUT",
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: Some(content_type.to_string()),
            expires_in,
        });
        Ok(self.signed_url(bucket, key, expires_in))
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> anyhow::Result<String> {
        self.presigned.lock().unwrap().push(PresignCall {
            method: "GET",
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: None,
            expires_in,
        });
        Ok(self.signed_url(bucket, key, expires_in))
    }

    async fn list_objects(&self, bucket: &str, prefix: &str) -> anyhow::Result<Vec<String>> {
        let calls = self.list_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_listing.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset by peer at 10.0.0.12:443");
        }

        if bucket == self.stitched_bucket {
            if let Some(after) = self.stitch_after_checks {
                if calls > after {
                    return Ok(vec![format!("{}final.mp4", prefix)]);
                }
            }
        }

        Ok(self
            .keys_in(bucket)
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    async fn bucket_exists(&self, _bucket: &str) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Status store that counts lookups and fails every one of them.
#[derive(Default)]
pub struct FailingStatusStore {
    pub calls: AtomicU32,
}

#[async_trait]
impl StatusStore for FailingStatusStore {
    async fn get(&self, _folder_name: &str) -> anyhow::Result<Option<Box<RawValue>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("no such table: processing_status (db host 10.0.0.7)")
    }

    async fn put(&self, _folder_name: &str, _record: &RawValue) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        anyhow::bail!("no such table: processing_status (db host 10.0.0.7)")
    }

    async fn ping(&self) -> anyhow::Result<()> {
        anyhow::bail!("database unreachable")
    }
}

pub async fn memory_status_store() -> Arc<SqlStatusStore> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1);
    let db = Database::connect(opt).await.unwrap();
    let store = SqlStatusStore::new(db, AppConfig::default().status_table);
    store.ensure_table().await.unwrap();
    Arc::new(store)
}

pub fn app_state(
    storage: Arc<MockStorageService>,
    status_store: Arc<dyn StatusStore>,
) -> AppState {
    let config = AppConfig::default();
    AppState {
        upload_service: Arc::new(UploadService::new(storage, config.clone())),
        status_store,
        config,
    }
}

pub async fn test_state(storage: Arc<MockStorageService>) -> (AppState, Arc<SqlStatusStore>) {
    let status_store = memory_status_store().await;
    (app_state(storage, status_store.clone()), status_store)
}
