use axum::Json;
use axum::extract::{Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use bytes::Bytes;
use tracing::warn;

use huddle_core::{BlobName, MeetingId};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{CascadeResponse, DeleteFileRequest, OrphansResponse};

/// `POST /api/upload/{id}` -- multipart upload of one document (admin).
///
/// Fields: `file` (the bytes), optional `displayName` override, optional
/// `category`. The bytes are staged into the blob area first; only then is
/// the file registered in meeting metadata.
pub async fn upload(
    State(state): State<AppState>,
    Path(id): Path<MeetingId>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ServerError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut display_name: Option<String> = None;
    let mut category = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let original = field.file_name().unwrap_or("document").to_owned();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("failed to read upload: {e}")))?;
                file = Some((original, data));
            }
            "displayName" => {
                display_name = Some(field.text().await.map_err(|e| {
                    ServerError::BadRequest(format!("invalid displayName field: {e}"))
                })?);
            }
            "category" => {
                category = field.text().await.map_err(|e| {
                    ServerError::BadRequest(format!("invalid category field: {e}"))
                })?;
            }
            _ => {}
        }
    }

    let (original_name, data) =
        file.ok_or_else(|| ServerError::BadRequest("missing 'file' field".to_owned()))?;

    let blob_name = state.blobs.stage(&original_name, data).await?;
    let attach = state
        .store
        .attach_file(
            &id,
            blob_name.clone(),
            &original_name,
            display_name.as_deref(),
            &category,
        )
        .await;

    match attach {
        Ok(entry) => Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "success": true, "file": entry })),
        )),
        Err(e) => {
            // The attach failed, so the staged blob has no owner; reclaim it.
            if let Err(cleanup_err) = state.blobs.delete(&blob_name).await {
                warn!(blob = %blob_name, error = %cleanup_err, "failed to reclaim staged blob");
            }
            Err(e.into())
        }
    }
}

/// `POST /api/delete-file/{id}` -- detach a file by blob name (admin).
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<MeetingId>,
    Json(body): Json<DeleteFileRequest>,
) -> Result<Json<CascadeResponse>, ServerError> {
    let cleanup = state.store.detach_file(&id, &body.file_name).await?;
    Ok(Json(CascadeResponse {
        success: true,
        cleanup,
    }))
}

/// `GET /view/{blob_name}` -- stream a document inline (public).
///
/// Deliberately decoupled from meeting metadata: any caller holding a valid
/// blob name may view it. Blob names are server-generated UUID hex and not
/// derivable from meeting ids.
pub async fn view_blob(
    State(state): State<AppState>,
    Path(blob_name): Path<BlobName>,
) -> Result<impl IntoResponse, ServerError> {
    let data = state.blobs.read(&blob_name).await?;
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline"),
        ],
        data,
    ))
}

/// `GET /api/orphans` -- report blobs no meeting references (admin).
pub async fn list_orphans(
    State(state): State<AppState>,
) -> Result<Json<OrphansResponse>, ServerError> {
    let orphans = state.store.sweep_orphans().await?;
    Ok(Json(OrphansResponse { orphans }))
}
