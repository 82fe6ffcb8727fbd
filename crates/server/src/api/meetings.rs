use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use huddle_core::{MeetingId, MeetingRecord, MeetingUpdate};

use crate::error::ServerError;

use super::AppState;
use super::schemas::{CascadeResponse, CreateMeetingResponse, MeetingSummary, SuccessResponse};

/// `POST /api/create-meeting` -- mint a fresh meeting id (admin).
pub async fn create_meeting(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let id = state.store.create_meeting().await?;
    Ok((
        StatusCode::OK,
        Json(CreateMeetingResponse { success: true, id }),
    ))
}

/// `GET /api/data/{id}` -- fetch one meeting record (public; shared links
/// are readable without admin rights).
pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<MeetingId>,
) -> Result<Json<MeetingRecord>, ServerError> {
    Ok(Json(state.store.fetch(&id).await?))
}

/// `POST /api/update-info/{id}` -- merge metadata fields into a record
/// (admin). The body can only carry the four info fields; `files` and the id
/// are not reachable through this route.
pub async fn update_info(
    State(state): State<AppState>,
    Path(id): Path<MeetingId>,
    Json(update): Json<MeetingUpdate>,
) -> Result<impl IntoResponse, ServerError> {
    state.store.update_info(&id, update).await?;
    Ok((StatusCode::OK, Json(SuccessResponse { success: true })))
}

/// `GET /api/meetings` -- every meeting with its id attached (admin).
pub async fn list_meetings(
    State(state): State<AppState>,
) -> Result<Json<Vec<MeetingSummary>>, ServerError> {
    let meetings = state
        .store
        .list_all()
        .await?
        .into_iter()
        .map(|(meeting_id, record)| MeetingSummary { meeting_id, record })
        .collect();
    Ok(Json(meetings))
}

/// `DELETE /api/meeting/{id}` -- delete a meeting and cascade to its blobs
/// (admin). Blob cleanup failures are reported, not fatal.
pub async fn delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<MeetingId>,
) -> Result<Json<CascadeResponse>, ServerError> {
    let cleanup = state.store.delete_meeting(&id).await?;
    Ok(Json(CascadeResponse {
        success: true,
        cleanup,
    }))
}
