use serde::Deserialize;

/// Top-level configuration for the Huddle server, loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct HuddleConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Aggregate file and blob area locations.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Administrator credential and session settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Static UI configuration.
    #[serde(default)]
    pub ui: UiConfig,
}

/// HTTP server bind configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024
}

/// Where the persisted aggregate and uploaded blobs live.
#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Path of the serialized meeting aggregate.
    #[serde(default = "default_data_file")]
    pub data_file: String,
    /// Directory holding uploaded document blobs.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            upload_dir: default_upload_dir(),
        }
    }
}

fn default_data_file() -> String {
    "data/meetings.json".to_owned()
}

fn default_upload_dir() -> String {
    "data/uploads".to_owned()
}

/// Administrator credential and session settings.
///
/// Exactly one shared credential gates every mutating route. Provide
/// `admin_password_hash` (argon2) in real deployments; `admin_password`
/// (plaintext, hashed at startup) is accepted for development.
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    /// Argon2 hash of the administrator password.
    pub admin_password_hash: Option<String>,
    /// Plaintext administrator password (development only).
    pub admin_password: Option<String>,
    /// Session lifetime in seconds.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_password_hash: None,
            admin_password: None,
            session_ttl_seconds: default_session_ttl(),
        }
    }
}

fn default_session_ttl() -> u64 {
    3600
}

/// Static UI configuration.
#[derive(Debug, Deserialize)]
pub struct UiConfig {
    /// Whether to serve the UI.
    #[serde(default = "default_ui_enabled")]
    pub enabled: bool,
    /// Directory containing the built UI static files.
    #[serde(default = "default_ui_dist")]
    pub dist_path: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            enabled: default_ui_enabled(),
            dist_path: default_ui_dist(),
        }
    }
}

fn default_ui_enabled() -> bool {
    true
}

fn default_ui_dist() -> String {
    "public".to_owned()
}
