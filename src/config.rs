use crate::error::{config_error, PrepResult};
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Default model used for brief generation
pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
/// Default Google Calendar API base URL
pub const DEFAULT_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Default Google Sheets API base URL
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4";
/// Default Google OAuth authorization endpoint
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// Default Google OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Optional tunables file
pub const TUNABLES_PATH: &str = "config/meeting-prep.toml";

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID, OAuth routes are disabled without it
    pub google_client_id: Option<String>,
    /// Google OAuth client secret
    pub google_client_secret: Option<String>,
    /// Redirect URL registered for the OAuth client
    pub oauth_redirect_url: String,
    /// Secret used to sign OAuth state parameters
    pub oauth_state_secret: String,
    /// OpenAI API key, brief generation is unavailable without it
    pub openai_api_key: Option<String>,
    /// Optional OpenAI-compatible base URL
    pub openai_base_url: Option<String>,
    /// Spreadsheet used when a contacts request names none
    pub contacts_spreadsheet_id: Option<String>,
    pub calendar_api_base: String,
    pub sheets_api_base: String,
    pub auth_url: String,
    pub token_url: String,
    /// Timeout applied to every upstream HTTP call
    pub http_timeout_secs: u64,
    /// Address the HTTP server binds to
    pub bind_addr: String,
    pub port: u16,
    pub tunables: Tunables,
}

/// Settings that can be overridden from `config/meeting-prep.toml`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tunables {
    /// Model name passed to the completion provider
    pub model: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Upper bound on generated tokens
    pub max_tokens: u64,
    /// Seconds between meeting list refreshes
    pub refresh_interval_secs: u64,
    /// Number of upcoming meetings to list
    pub max_meetings: u32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1500,
            refresh_interval_secs: 300,
            max_meetings: 5,
        }
    }
}

impl Tunables {
    /// Parse tunables from TOML, missing keys keep their defaults
    pub fn from_toml(content: &str) -> PrepResult<Self> {
        Ok(toml::from_str::<Tunables>(content)?)
    }
}

impl Config {
    /// Load configuration from environment and the optional tunables file
    pub fn load() -> PrepResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut tunables = if Path::new(TUNABLES_PATH).exists() {
            Tunables::from_toml(&fs::read_to_string(TUNABLES_PATH)?)?
        } else {
            Tunables::default()
        };

        // Environment wins over the file
        if let Ok(model) = env::var("OPENAI_MODEL") {
            tunables.model = model;
        }
        if let Some(secs) = parse_var::<u64>("MEETINGS_REFRESH_SECS")? {
            tunables.refresh_interval_secs = secs;
        }
        if tunables.refresh_interval_secs == 0 {
            return Err(config_error("refresh interval must be at least one second"));
        }

        let oauth_state_secret = env::var("OAUTH_STATE_SECRET")
            .unwrap_or_else(|_| uuid::Uuid::new_v4().to_string());

        Ok(Config {
            google_client_id: non_empty_var("GOOGLE_CLIENT_ID"),
            google_client_secret: non_empty_var("GOOGLE_CLIENT_SECRET"),
            oauth_redirect_url: env::var("OAUTH_REDIRECT_URL")
                .unwrap_or_else(|_| "http://localhost:3000/auth/callback".to_string()),
            oauth_state_secret,
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: non_empty_var("OPENAI_BASE_URL"),
            contacts_spreadsheet_id: non_empty_var("CONTACTS_SPREADSHEET_ID"),
            calendar_api_base: env::var("CALENDAR_API_BASE")
                .unwrap_or_else(|_| DEFAULT_CALENDAR_API_BASE.to_string()),
            sheets_api_base: env::var("SHEETS_API_BASE")
                .unwrap_or_else(|_| DEFAULT_SHEETS_API_BASE.to_string()),
            auth_url: env::var("GOOGLE_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            token_url: env::var("GOOGLE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            http_timeout_secs: parse_var::<u64>("HTTP_TIMEOUT_SECS")?.unwrap_or(30),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var::<u16>("PORT")?.unwrap_or(3000),
            tunables,
        })
    }

    /// OAuth client credentials, if both halves are configured
    pub fn oauth_credentials(&self) -> Option<(String, String)> {
        match (&self.google_client_id, &self.google_client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        }
    }

    /// Build the shared HTTP client for upstream calls
    pub fn http_client(&self) -> PrepResult<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(self.http_timeout_secs))
            .build()
            .map_err(|e| config_error(&format!("Failed to build HTTP client: {}", e)))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> PrepResult<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| config_error(&format!("Invalid {} format", name))),
        Err(_) => Ok(None),
    }
}
