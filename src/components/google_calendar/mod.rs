mod client;
pub mod models;

pub use client::GoogleCalendarClient;
pub use models::{Attendee, Meeting, UNTITLED_MEETING};

use crate::error::PrepResult;
use async_trait::async_trait;

/// Source of upcoming meetings for a signed-in user
#[async_trait]
pub trait MeetingSource: Send + Sync + 'static {
    /// List upcoming single-occurrence meetings ordered by start time
    async fn upcoming_meetings(&self, access_token: &str) -> PrepResult<Vec<Meeting>>;
}
