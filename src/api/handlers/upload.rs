use crate::AppState;
use crate::api::error::AppError;
use crate::models::{UploadUrlRequest, UploadUrlResponse};
use axum::{Json, extract::State, extract::rejection::JsonRejection};

/// Issue a signed PUT URL for one file of an upload session
#[utoipa::path(
    post,
    path = "/api/upload",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Signed upload URL", body = UploadUrlResponse),
        (status = 400, description = "Missing folder or file name", body = crate::models::ErrorResponse),
        (status = 405, description = "Method not allowed", body = crate::models::ErrorResponse),
        (status = 500, description = "Unsupported file type or signing failure", body = crate::models::ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn create_upload_url(
    State(state): State<AppState>,
    payload: Result<Json<UploadUrlRequest>, JsonRejection>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let folder_name = req
        .folder_name
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("Folder name is required".to_string()))?;

    let file_name = req
        .name
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("File name is required".to_string()))?;

    // A missing type is classified like any other unsupported one.
    let content_type = req.content_type.as_deref().unwrap_or_default();

    let url = state
        .upload_service
        .issue_upload_url(folder_name, file_name, content_type)
        .await
        .map_err(AppError::backend("Error creating signed URL"))?;

    Ok(Json(UploadUrlResponse { url }))
}
