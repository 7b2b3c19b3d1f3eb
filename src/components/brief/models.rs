use crate::components::google_sheets::ContactNotes;
use crate::error::{validation_error, PrepResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Structured prep brief recovered from generated text.
///
/// Every field is always present; sections missing from the source text
/// are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepBrief {
    pub quick_overview: String,
    pub what_happened_last_time: String,
    pub what_to_say_first: String,
    pub suggested_questions: Vec<String>,
    pub risks_and_opportunities: String,
    pub follow_up_draft: String,
}

impl PrepBrief {
    /// Render the brief as copyable plain text
    pub fn to_plain_text(&self, title: &str, date: &str) -> String {
        let questions = self
            .suggested_questions
            .iter()
            .map(|q| format!("- {}", q))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Meeting Prep: {title}\nDate: {date}\n\n\
             QUICK OVERVIEW\n{}\n\n\
             WHAT HAPPENED LAST TIME\n{}\n\n\
             WHAT TO SAY FIRST\n{}\n\n\
             SUGGESTED QUESTIONS\n{}\n\n\
             RISKS & OPPORTUNITIES\n{}\n\n\
             FOLLOW-UP DRAFT\n{}",
            self.quick_overview,
            self.what_happened_last_time,
            self.what_to_say_first,
            questions,
            self.risks_and_opportunities,
            self.follow_up_draft,
        )
        .trim()
        .to_string()
    }
}

/// Request to generate a brief for one meeting
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date: String,
    /// Attendee emails
    #[serde(default, deserialize_with = "null_as_default")]
    pub attendees: Vec<String>,
    #[serde(default, alias = "crmData", deserialize_with = "null_as_default")]
    pub contact_notes: ContactNotes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Explicit `null` reads the same as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl BriefRequest {
    /// Reject requests missing the fields the prompt cannot do without
    pub fn validate(&self) -> PrepResult<()> {
        let has_attendee = self.attendees.iter().any(|a| !a.trim().is_empty());
        if self.title.trim().is_empty() || !has_attendee {
            return Err(validation_error("Missing required fields"));
        }
        Ok(())
    }
}
