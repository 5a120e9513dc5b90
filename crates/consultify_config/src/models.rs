// --- File: crates/consultify_config/src/models.rs ---

use serde::{Deserialize, Serialize};

pub const GOOGLE_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_URI: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Google OAuth Config ---
// Client identity either inline or read from a client secrets JSON file.
// Secrets are best marked "secret_from_env" and supplied as GOOGLE_CLIENT_SECRET.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoogleConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    /// Path to a client secrets file as downloaded from the Google console.
    #[serde(default)]
    pub client_secrets_path: Option<String>,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_userinfo_uri")]
    pub userinfo_uri: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            client_secrets_path: None,
            auth_uri: default_auth_uri(),
            token_uri: default_token_uri(),
            userinfo_uri: default_userinfo_uri(),
        }
    }
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// IANA time zone stored with created events.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Upper bound for every outbound Google call.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Where the token payload is written after a successful exchange.
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            time_zone: default_time_zone(),
            request_timeout_secs: default_request_timeout_secs(),
            token_file: default_token_file(),
        }
    }
}

// --- Meeting Defaults ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MeetingConfig {
    #[serde(default = "default_summary")]
    pub summary: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    /// RFC 3339 start used when the login flow carries no slot.
    #[serde(default)]
    pub default_start: Option<String>,
    /// RFC 3339 end used when the login flow carries no slot.
    #[serde(default)]
    pub default_end: Option<String>,
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            summary: default_summary(),
            description: default_description(),
            color_id: None,
            attendees: Vec::new(),
            default_start: None,
            default_end: None,
            default_duration_minutes: default_duration_minutes(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub meeting: MeetingConfig,
}

fn default_auth_uri() -> String {
    GOOGLE_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URI.to_string()
}

fn default_userinfo_uri() -> String {
    GOOGLE_USERINFO_URI.to_string()
}

fn default_calendar_id() -> String {
    "primary".to_string()
}

fn default_time_zone() -> String {
    "Asia/Singapore".to_string()
}

fn default_request_timeout_secs() -> u64 {
    5
}

fn default_token_file() -> String {
    "token.json".to_string()
}

fn default_summary() -> String {
    "30 minute Consultancy Call".to_string()
}

fn default_description() -> String {
    "Consultancy Call".to_string()
}

fn default_duration_minutes() -> i64 {
    30
}
