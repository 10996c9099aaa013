use crate::AppState;
use crate::api::error::AppError;
use crate::models::{FolderQuery, StitchedVideoResponse};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

/// Report whether the stitched video for a session exists yet.
///
/// "Not yet" is a normal answer (`available: false`), not an error; clients
/// are expected to ask again later.
#[utoipa::path(
    get,
    path = "/api/check-stitched-video",
    params(FolderQuery),
    responses(
        (status = 200, description = "Availability, with a signed download URL once ready", body = StitchedVideoResponse),
        (status = 400, description = "Missing folder name", body = crate::models::ErrorResponse),
        (status = 500, description = "Listing or signing failure", body = crate::models::ErrorResponse)
    ),
    tag = "status"
)]
pub async fn check_stitched_video(
    State(state): State<AppState>,
    query: Result<Query<FolderQuery>, QueryRejection>,
) -> Result<Json<StitchedVideoResponse>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let folder_name = query
        .folder_name()
        .ok_or_else(|| AppError::BadRequest("Folder name is required".to_string()))?;

    let url = state
        .upload_service
        .locate_stitched_video(folder_name)
        .await
        .map_err(AppError::backend("Error checking for stitched video"))?;

    Ok(Json(match url {
        Some(url) => StitchedVideoResponse::ready(url),
        None => StitchedVideoResponse::pending(),
    }))
}
