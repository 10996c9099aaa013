use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of `POST /api/upload`. Every field is optional on the wire so that
/// missing values turn into our own 400 messages instead of a rejection.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub content_type: Option<String>,
    #[serde(rename = "folderName", default)]
    pub folder_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadUrlResponse {
    pub url: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FolderQuery {
    /// Upload session token
    #[serde(rename = "folderName")]
    pub folder_name: Option<String>,
}

impl FolderQuery {
    pub fn folder_name(&self) -> Option<&str> {
        self.folder_name.as_deref().filter(|v| !v.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StitchedVideoResponse {
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl StitchedVideoResponse {
    pub fn ready(url: String) -> Self {
        Self {
            available: true,
            url: Some(url),
        }
    }

    pub fn pending() -> Self {
        Self {
            available: false,
            url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
