use super::models::{normalize_rows, ContactNotes, ValueRange};
use super::ContactSource;
use crate::error::{status_error, upstream_error, PrepResult};
use async_trait::async_trait;
use reqwest::{header, Client};
use tracing::{debug, info};

/// Worksheet range holding the contact notes
pub const CONTACTS_RANGE: &str = "Contacts!A:F";

/// Read-only client for the contact notes worksheet
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
}

impl GoogleSheetsClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn values_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/spreadsheets/{}/values/{}",
            self.base_url,
            urlencoding::encode(spreadsheet_id),
            urlencoding::encode(CONTACTS_RANGE)
        )
    }
}

#[async_trait]
impl ContactSource for GoogleSheetsClient {
    async fn contact_notes(
        &self,
        access_token: &str,
        spreadsheet_id: &str,
    ) -> PrepResult<ContactNotes> {
        let url = self.values_url(spreadsheet_id);
        debug!("Fetching contact notes from {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| upstream_error(&format!("Failed to fetch contact notes: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(status_error("Sheets API", status, &error_body));
        }

        let range: ValueRange = response
            .json()
            .await
            .map_err(|e| upstream_error(&format!("Failed to parse values response: {}", e)))?;

        let notes = normalize_rows(&range.into_rows());
        info!("Loaded {} contact notes", notes.len());

        Ok(notes)
    }
}
