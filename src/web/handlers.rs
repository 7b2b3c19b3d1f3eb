use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::auth::BearerToken;
use super::AppState;
use crate::components::brief::models::null_as_default;
use crate::components::brief::{prepare_brief, BriefRequest, PrepBrief};
use crate::components::google_calendar::Meeting;
use crate::components::google_sheets::{contact_notes_or_empty, ContactNotes};
use crate::components::oauth::TokenSet;
use crate::error::{config_error, upstream_error, validation_error, Error};

/// Message shown on the error page when the provider gives no reason
const DEFAULT_AUTH_ERROR: &str = "Authentication failed";

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingsResponse {
    pub meetings: Vec<Meeting>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactsResponse {
    pub contact_notes: ContactNotes,
}

#[derive(Debug, Deserialize)]
pub struct ContactsQuery {
    #[serde(rename = "spreadsheetId")]
    pub spreadsheet_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthErrorQuery {
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthErrorResponse {
    pub error: String,
    pub message: String,
}

/// Handler for the upcoming meetings list
pub async fn meetings_handler(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<MeetingsResponse>, Error> {
    match state.meetings.upcoming_meetings(&token).await {
        Ok(meetings) => Ok(Json(MeetingsResponse { meetings })),
        Err(Error::Unauthorized) => Err(Error::Unauthorized),
        Err(e) => {
            error!("Calendar API error: {}", e);
            Err(upstream_error("Failed to fetch calendar events"))
        }
    }
}

/// Handler for contact notes; failures yield an empty table
pub async fn contacts_handler(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(query): Query<ContactsQuery>,
) -> Json<ContactsResponse> {
    let spreadsheet_id = query
        .spreadsheet_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| state.default_spreadsheet_id.clone());

    let contact_notes =
        contact_notes_or_empty(state.contacts.as_ref(), &token, spreadsheet_id.as_deref()).await;

    Json(ContactsResponse { contact_notes })
}

/// Unreadable JSON bodies are reported like any other bad request
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    body.map(|Json(value)| value).map_err(|rejection| {
        warn!("Rejected request body: {}", rejection.body_text());
        validation_error("Invalid request body")
    })
}

/// Handler for brief generation
pub async fn brief_handler(
    State(state): State<AppState>,
    body: Result<Json<BriefRequest>, JsonRejection>,
) -> Result<Json<PrepBrief>, Error> {
    let request = json_body(body)?;
    match prepare_brief(state.generator.as_deref(), &request).await {
        Ok(brief) => Ok(Json(brief)),
        Err(e @ (Error::Validation(_) | Error::Config(_))) => {
            warn!("Rejected brief request: {}", e);
            Err(e)
        }
        Err(e) => {
            error!("Prep generation error: {}", e);
            Err(upstream_error("Failed to generate meeting prep"))
        }
    }
}

/// Start the OAuth login by redirecting to the consent page
pub async fn login_handler(State(state): State<AppState>) -> Result<Redirect, Error> {
    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| config_error("Google OAuth is not configured"))?;

    let csrf_state = state.state_signer.issue()?;
    let url = oauth.authorization_url(&csrf_state)?;
    info!("Redirecting to Google consent page");

    Ok(Redirect::to(url.as_str()))
}

fn auth_error_redirect(reason: &str) -> Response {
    Redirect::to(&format!("/auth/error?error={}", urlencoding::encode(reason))).into_response()
}

/// OAuth redirect target: checks the state and exchanges the code for tokens
pub async fn callback_handler(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Response {
    if let Some(reason) = query.error {
        warn!("Provider returned OAuth error: {}", reason);
        return auth_error_redirect(&reason);
    }

    let (Some(code), Some(csrf_state)) = (query.code, query.state) else {
        return auth_error_redirect("Missing authorization code");
    };

    if state.state_signer.verify(&csrf_state).is_err() {
        return auth_error_redirect("Invalid state");
    }

    let Some(oauth) = state.oauth.as_ref() else {
        return config_error("Google OAuth is not configured").into_response();
    };

    match oauth.exchange_code(&code).await {
        Ok(tokens) => {
            info!("User signed in");
            Json(tokens).into_response()
        }
        Err(e) => {
            error!("Token exchange failed: {}", e);
            auth_error_redirect("Token exchange failed")
        }
    }
}

/// Exchange a refresh token for a new access token
pub async fn refresh_handler(
    State(state): State<AppState>,
    body: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenSet>, Error> {
    let request = json_body(body)?;
    if request.refresh_token.trim().is_empty() {
        return Err(validation_error("Missing refresh token"));
    }

    let oauth = state
        .oauth
        .as_ref()
        .ok_or_else(|| config_error("Google OAuth is not configured"))?;

    oauth.refresh(request.refresh_token.trim()).await.map(Json)
}

/// Authentication error page
pub async fn auth_error_handler(Query(query): Query<AuthErrorQuery>) -> impl IntoResponse {
    let error = query
        .error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AUTH_ERROR.to_string());

    (
        StatusCode::BAD_REQUEST,
        Json(AuthErrorResponse {
            error,
            message: "Please try signing in again.".to_string(),
        }),
    )
}

// Handler for API health check
pub async fn health_handler() -> &'static str {
    "OK"
}
