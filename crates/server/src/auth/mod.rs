pub mod middleware;
pub mod password;

use std::collections::HashMap;

use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::ServerError;

/// Name of the session cookie the UI rides on.
pub const SESSION_COOKIE: &str = "huddle_session";

/// The access gate: one shared administrator credential, session-scoped.
///
/// Login verifies the candidate against the configured argon2 hash and mints
/// an opaque session token; every mutating route presents that token (Bearer
/// header or session cookie) to the [`middleware::AuthLayer`] gate.
#[derive(Debug)]
pub struct AuthProvider {
    password_hash: String,
    session_ttl: Duration,
    /// Token to expiry. Expired entries are dropped on touch.
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl AuthProvider {
    /// Build the provider from configuration.
    ///
    /// `admin_password_hash` wins when both credential fields are set; a
    /// plaintext `admin_password` is hashed at startup. Refuses to start
    /// without any credential rather than booting an ungated server.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ServerError> {
        let password_hash = match (&config.admin_password_hash, &config.admin_password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(plain)) => {
                info!("hashing plaintext admin_password from config");
                password::hash_password(plain).map_err(ServerError::Config)?
            }
            (None, None) => {
                return Err(ServerError::Config(
                    "auth.admin_password_hash or auth.admin_password must be set".to_owned(),
                ));
            }
        };

        let ttl_seconds =
            i64::try_from(config.session_ttl_seconds).map_err(|_| {
                ServerError::Config("auth.session_ttl_seconds out of range".to_owned())
            })?;

        Ok(Self {
            password_hash,
            session_ttl: Duration::seconds(ttl_seconds),
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Session lifetime in seconds.
    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        u64::try_from(self.session_ttl.num_seconds()).unwrap_or(0)
    }

    /// Verify the shared credential and mint a session token.
    ///
    /// Returns `None` on a wrong password.
    pub async fn login(&self, password_candidate: &str) -> Option<String> {
        if !password::verify_password(&self.password_hash, password_candidate) {
            return None;
        }

        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.session_ttl;
        self.sessions
            .write()
            .await
            .insert(token.clone(), expires_at);
        info!("administrator session opened");
        Some(token)
    }

    /// Check whether a token names a live session.
    ///
    /// Expired sessions are removed as a side effect.
    pub async fn validate(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some(expires_at) if *expires_at > Utc::now() => true,
            Some(_) => {
                sessions.remove(token);
                false
            }
            None => false,
        }
    }

    /// Revoke a session token (logout). Unknown tokens are ignored.
    pub async fn revoke(&self, token: &str) {
        if self.sessions.write().await.remove(token).is_some() {
            info!("administrator session closed");
        }
    }
}

/// Pull the session token from a request: `Authorization: Bearer` first,
/// then the session cookie.
#[must_use]
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get("authorization")
        && let Ok(raw) = value.to_str()
        && let Some(token) = raw.strip_prefix("Bearer ")
    {
        return Some(token);
    }

    let cookies = headers.get("cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}
