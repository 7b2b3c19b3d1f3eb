pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::components::brief::{BriefGenerator, RigBriefGenerator};
use crate::components::google_calendar::{GoogleCalendarClient, MeetingSource};
use crate::components::google_sheets::{ContactSource, GoogleSheetsClient};
use crate::components::oauth::{OAuthClient, StateSigner};
use crate::config::Config;
use crate::error::{Error, PrepResult};
use handlers::{
    auth_error_handler, brief_handler, callback_handler, contacts_handler, health_handler,
    login_handler, meetings_handler, refresh_handler,
};

/// Services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub meetings: Arc<dyn MeetingSource>,
    pub contacts: Arc<dyn ContactSource>,
    /// `None` when no completion API key is configured
    pub generator: Option<Arc<dyn BriefGenerator>>,
    /// `None` when OAuth client credentials are not configured
    pub oauth: Option<Arc<OAuthClient>>,
    pub state_signer: Arc<StateSigner>,
    /// Used when a contacts request names no spreadsheet
    pub default_spreadsheet_id: Option<String>,
}

impl AppState {
    /// Wire up the Google and completion clients described by `config`
    pub fn from_config(config: &Config) -> PrepResult<Self> {
        let http = config.http_client()?;

        let generator = config.openai_api_key.as_deref().map(|key| {
            Arc::new(RigBriefGenerator::new(
                key,
                config.openai_base_url.as_deref(),
                &config.tunables,
            )) as Arc<dyn BriefGenerator>
        });
        if generator.is_none() {
            info!("OPENAI_API_KEY not set, brief generation is disabled");
        }

        let oauth = OAuthClient::from_config(config, http.clone()).map(Arc::new);
        if oauth.is_none() {
            info!("Google OAuth credentials not set, login routes are disabled");
        }

        Ok(Self {
            meetings: Arc::new(GoogleCalendarClient::new(
                http.clone(),
                &config.calendar_api_base,
                config.tunables.max_meetings,
            )),
            contacts: Arc::new(GoogleSheetsClient::new(http, &config.sheets_api_base)),
            generator,
            oauth,
            state_signer: Arc::new(StateSigner::new(&config.oauth_state_secret)),
            default_spreadsheet_id: config.contacts_spreadsheet_id.clone(),
        })
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            Error::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::UpstreamUnavailable(msg) | Error::Config(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            other => {
                error!("Internal error: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/meetings", get(meetings_handler))
        .route("/contacts", get(contacts_handler))
        .route("/brief", post(brief_handler))
        .route("/auth/login", get(login_handler))
        .route("/auth/callback", get(callback_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/error", get(auth_error_handler))
        .route("/health", get(health_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
