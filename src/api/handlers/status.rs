use crate::AppState;
use crate::api::error::AppError;
use crate::models::FolderQuery;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde_json::value::RawValue;

#[utoipa::path(
    get,
    path = "/api/check-processing-status",
    params(FolderQuery),
    responses(
        (status = 200, description = "Stored status record, returned verbatim", content_type = "application/json"),
        (status = 400, description = "Missing folder name", body = crate::models::ErrorResponse),
        (status = 404, description = "No status recorded yet", body = crate::models::ErrorResponse),
        (status = 500, description = "Status store failure", body = crate::models::ErrorResponse)
    ),
    tag = "status"
)]
pub async fn check_processing_status(
    State(state): State<AppState>,
    query: Result<Query<FolderQuery>, QueryRejection>,
) -> Result<Json<Box<RawValue>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let folder_name = query
        .folder_name()
        .ok_or_else(|| AppError::BadRequest("Folder name is required".to_string()))?;

    let record = state
        .status_store
        .get(folder_name)
        .await
        .map_err(AppError::backend("Error checking processing status"))?;

    match record {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::NotFound("Status not found".to_string())),
    }
}
