mod client;
pub mod models;

pub use client::{GoogleSheetsClient, CONTACTS_RANGE};
pub use models::{normalize_rows, ContactNote, ContactNotes};

use crate::error::PrepResult;
use async_trait::async_trait;
use tracing::warn;

/// Source of contact notes for a spreadsheet
#[async_trait]
pub trait ContactSource: Send + Sync + 'static {
    async fn contact_notes(&self, access_token: &str, spreadsheet_id: &str)
        -> PrepResult<ContactNotes>;
}

/// Fetch contact notes, treating any failure as "no notes".
///
/// Contact notes only enrich the prompt, so a missing spreadsheet or an
/// upstream failure must never block brief generation.
pub async fn contact_notes_or_empty(
    source: &dyn ContactSource,
    access_token: &str,
    spreadsheet_id: Option<&str>,
) -> ContactNotes {
    let Some(spreadsheet_id) = spreadsheet_id.filter(|id| !id.trim().is_empty()) else {
        return ContactNotes::new();
    };

    match source.contact_notes(access_token, spreadsheet_id).await {
        Ok(notes) => notes,
        Err(e) => {
            warn!("Ignoring contact notes failure: {}", e);
            ContactNotes::new()
        }
    }
}
