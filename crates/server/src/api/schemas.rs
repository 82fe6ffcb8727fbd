use serde::{Deserialize, Serialize};

use huddle_core::{BlobName, MeetingId, MeetingRecord};
use huddle_store::CleanupReport;

/// Generic error body: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    /// Opaque session token; also set as the session cookie.
    pub token: String,
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCheckResponse {
    pub logged_in: bool,
}

#[derive(Debug, Serialize)]
pub struct CreateMeetingResponse {
    pub success: bool,
    pub id: MeetingId,
}

/// One row of the admin meeting list: the record with its id attached.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingSummary {
    pub meeting_id: MeetingId,
    #[serde(flatten)]
    pub record: MeetingRecord,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Request body for detaching a file; `fileName` carries the blob name, the
/// stable join key, never the display name.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    pub file_name: BlobName,
}

/// Outcome of an operation that cascaded into the blob area.
///
/// `cleanup.failures` being non-empty does not make the operation a failure;
/// the metadata change has already been durably saved.
#[derive(Debug, Serialize)]
pub struct CascadeResponse {
    pub success: bool,
    pub cleanup: CleanupReport,
}

#[derive(Debug, Serialize)]
pub struct OrphansResponse {
    /// Blobs physically present but referenced by no meeting.
    pub orphans: Vec<BlobName>,
}
