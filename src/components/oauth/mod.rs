mod state;

pub use state::StateSigner;

use crate::config::Config;
use crate::error::{upstream_error, Error, PrepResult};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use url::Url;

/// Scopes needed to read the calendar and the contacts sheet
pub const SCOPES: &[&str] = &[
    "openid",
    "email",
    "profile",
    "https://www.googleapis.com/auth/calendar.readonly",
    "https://www.googleapis.com/auth/spreadsheets.readonly",
];

/// Tokens handed back to the signed-in client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry as a unix timestamp
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Token endpoint response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_token_set(self, previous_refresh: Option<&str>) -> TokenSet {
        let expires_in = self.expires_in.unwrap_or(3600);
        TokenSet {
            access_token: self.access_token,
            // Refresh responses usually omit the refresh token
            refresh_token: self
                .refresh_token
                .or_else(|| previous_refresh.map(str::to_string)),
            expires_at: Utc::now().timestamp() + expires_in,
            scope: self.scope,
        }
    }
}

/// Google OAuth2 authorization-code client
#[derive(Clone)]
pub struct OAuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    pub fn new(
        http: Client,
        client_id: &str,
        client_secret: &str,
        redirect_url: &str,
        auth_url: &str,
        token_url: &str,
    ) -> Self {
        Self {
            http,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            redirect_url: redirect_url.to_string(),
            auth_url: auth_url.to_string(),
            token_url: token_url.to_string(),
        }
    }

    /// Build a client from config, `None` when credentials are not configured
    pub fn from_config(config: &Config, http: Client) -> Option<Self> {
        let (client_id, client_secret) = config.oauth_credentials()?;
        Some(Self::new(
            http,
            &client_id,
            &client_secret,
            &config.oauth_redirect_url,
            &config.auth_url,
            &config.token_url,
        ))
    }

    pub fn with_redirect_url(mut self, redirect_url: &str) -> Self {
        self.redirect_url = redirect_url.to_string();
        self
    }

    /// Consent page URL for a login carrying `state`
    pub fn authorization_url(&self, state: &str) -> PrepResult<Url> {
        let mut url = Url::parse(&self.auth_url)
            .map_err(|e| upstream_error(&format!("Failed to parse URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_url)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("scope", &SCOPES.join(" "))
            .append_pair("state", state);

        Ok(url)
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> PrepResult<TokenSet> {
        let response = self
            .token_request(&[
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .await?;
        info!("Exchanged authorization code for tokens");
        Ok(response.into_token_set(None))
    }

    /// Get a fresh access token for a refresh token
    pub async fn refresh(&self, refresh_token: &str) -> PrepResult<TokenSet> {
        let response = self
            .token_request(&[
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .await?;
        info!("Refreshed access token");
        Ok(response.into_token_set(Some(refresh_token)))
    }

    async fn token_request(&self, grant: &[(&str, &str)]) -> PrepResult<TokenResponse> {
        let mut params = vec![
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        params.extend_from_slice(grant);

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| upstream_error(&format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            error!("Token endpoint returned HTTP {} - {}", status, error_body);

            // invalid_grant and friends come back as 400 or 401
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Error::Unauthorized,
                _ => upstream_error(&format!("Token endpoint returned HTTP {}", status)),
            });
        }

        response
            .json()
            .await
            .map_err(|e| upstream_error(&format!("Failed to parse token response: {}", e)))
    }
}
