use super::models::{EventList, Meeting};
use super::MeetingSource;
use crate::error::{status_error, upstream_error, PrepResult};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::{header, Client};
use tracing::{debug, info};
use url::Url;

/// Read-only client for the primary calendar of the signed-in user
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    max_results: u32,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, base_url: &str, max_results: u32) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_results,
        }
    }

    fn events_url(&self) -> PrepResult<Url> {
        let mut url = Url::parse(&format!("{}/calendars/primary/events", self.base_url))
            .map_err(|e| upstream_error(&format!("Failed to parse URL: {}", e)))?;

        let time_min = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min)
            .append_pair("maxResults", &self.max_results.to_string())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime");

        Ok(url)
    }
}

#[async_trait]
impl MeetingSource for GoogleCalendarClient {
    async fn upcoming_meetings(&self, access_token: &str) -> PrepResult<Vec<Meeting>> {
        let url = self.events_url()?;
        debug!("Fetching upcoming events from {}", url);

        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| upstream_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(status_error("Calendar API", status, &error_body));
        }

        let events: EventList = response
            .json()
            .await
            .map_err(|e| upstream_error(&format!("Failed to parse events response: {}", e)))?;

        let meetings: Vec<Meeting> = events.items.into_iter().map(Meeting::from).collect();
        info!("Fetched {} upcoming meetings", meetings.len());

        Ok(meetings)
    }
}
