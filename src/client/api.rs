use crate::client::error::ClientError;
use crate::models::{ErrorResponse, StitchedVideoResponse, UploadUrlRequest, UploadUrlResponse};
use crate::utils::session_token::SessionToken;
use reqwest::{StatusCode, header};
use serde_json::Value;
use url::Url;

/// HTTP client for the upload API, plus the direct PUT to storage.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn request_upload_url(
        &self,
        folder: &SessionToken,
        name: &str,
        content_type: &str,
    ) -> Result<String, ClientError> {
        let body = UploadUrlRequest {
            name: Some(name.to_string()),
            content_type: Some(content_type.to_string()),
            folder_name: Some(folder.to_string()),
        };

        let res = self
            .http
            .post(self.base_url.join("api/upload")?)
            .json(&body)
            .send()
            .await?;

        let res = error_for_status(res).await?;
        let UploadUrlResponse { url } = res.json().await?;
        Ok(url)
    }

    /// PUT the file body to a signed URL. The Content-Type must match the one
    /// the URL was signed with.
    pub async fn upload_to_signed_url(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), ClientError> {
        let res = self
            .http
            .put(url)
            .header(header::CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;

        error_for_status(res).await?;
        Ok(())
    }

    pub async fn check_stitched_video(
        &self,
        folder: &SessionToken,
    ) -> Result<StitchedVideoResponse, ClientError> {
        let res = self
            .http
            .get(self.base_url.join("api/check-stitched-video")?)
            .query(&[("folderName", folder.as_str())])
            .send()
            .await?;

        let res = error_for_status(res).await?;
        Ok(res.json().await?)
    }

    /// `None` while the stitching process has not recorded anything yet.
    pub async fn processing_status(
        &self,
        folder: &SessionToken,
    ) -> Result<Option<Value>, ClientError> {
        let res = self
            .http
            .get(self.base_url.join("api/check-processing-status")?)
            .query(&[("folderName", folder.as_str())])
            .send()
            .await?;

        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let res = error_for_status(res).await?;
        Ok(Some(res.json().await?))
    }
}

async fn error_for_status(res: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }

    let text = res.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
