use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;

use crate::auth::{SESSION_COOKIE, extract_token};
use crate::error::ServerError;

use super::AppState;
use super::schemas::{AuthCheckResponse, LoginRequest, LoginResponse};

/// `POST /api/login` -- verify the shared administrator password and open a
/// session. The token is returned in the body and set as a cookie so both
/// API clients and the browser UI can carry it.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> impl IntoResponse {
    match state.auth.login(&body.password).await {
        Some(token) => {
            let expires_in = state.auth.session_ttl_seconds();
            let cookie = format!(
                "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={expires_in}"
            );
            (
                StatusCode::OK,
                [(header::SET_COOKIE, cookie)],
                Json(serde_json::json!(LoginResponse {
                    success: true,
                    token,
                    expires_in,
                })),
            )
                .into_response()
        }
        None => ServerError::Unauthorized("wrong password".to_owned()).into_response(),
    }
}

/// `GET /api/logout` -- revoke the presented session and clear the cookie.
///
/// Public on purpose: logging out an already-dead session is a success.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = extract_token(&headers) {
        state.auth.revoke(token).await;
    }

    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "success": true })),
    )
}

/// `GET /api/auth-check` -- report whether the caller holds a live session.
pub async fn auth_check(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let logged_in = match extract_token(&headers) {
        Some(token) => state.auth.validate(token).await,
        None => false,
    };
    (StatusCode::OK, Json(serde_json::json!(AuthCheckResponse { logged_in })))
}
