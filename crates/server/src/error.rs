use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use huddle_blob::BlobError;
use huddle_store::StoreError;

/// Errors that can occur when running the Huddle server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A document store error surfaced through the API.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A blob area error surfaced through the API.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Authentication failed (missing or invalid session).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request body was malformed (e.g. a broken multipart stream).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Store(StoreError::MeetingNotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("meeting not found: {id}"))
            }
            Self::Blob(BlobError::NotFound(name)) => {
                (StatusCode::NOT_FOUND, format!("document not found: {name}"))
            }
            Self::Blob(BlobError::InvalidName(_)) | Self::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::Config(_) | Self::Io(_) | Self::Store(_) | Self::Blob(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_core::MeetingId;

    #[test]
    fn meeting_not_found_maps_to_404() {
        let err = ServerError::from(StoreError::MeetingNotFound(MeetingId::new("abc")));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn persistence_failure_maps_to_500() {
        let err = ServerError::from(StoreError::Persistence("disk full".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_blob_maps_to_404() {
        let err = ServerError::from(BlobError::NotFound("blob-1".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
