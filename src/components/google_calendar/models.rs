use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// Title used when the calendar event has no summary
pub const UNTITLED_MEETING: &str = "Untitled Meeting";

/// A meeting attendee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// An upcoming meeting normalized from a calendar event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: String,
    pub title: String,
    /// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date for all-day meetings
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Meeting {
    /// All-day meetings carry only a date
    pub fn is_all_day(&self) -> bool {
        NaiveDate::parse_from_str(&self.start, "%Y-%m-%d").is_ok()
    }

    /// Start as a timestamp, when the meeting has a start time
    pub fn starts_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.start).ok()
    }

    pub fn attendee_emails(&self) -> Vec<String> {
        self.attendees.iter().map(|a| a.email.clone()).collect()
    }

    /// Human readable start used by the terminal client
    pub fn display_start(&self) -> String {
        if let Some(start) = self.starts_at() {
            start.format("%a %b %-d, %H:%M").to_string()
        } else if let Ok(date) = NaiveDate::parse_from_str(&self.start, "%Y-%m-%d") {
            format!("{} (all day)", date.format("%a %b %-d"))
        } else {
            self.start.clone()
        }
    }
}

/// Raw event list response from the Calendar API
#[derive(Debug, Deserialize)]
pub(crate) struct EventList {
    #[serde(default)]
    pub items: Vec<RawEvent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<EventTime>,
    #[serde(default)]
    pub end: Option<EventTime>,
    #[serde(default)]
    pub attendees: Vec<RawAttendee>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventTime {
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAttendee {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl EventTime {
    fn resolve(time: Option<EventTime>) -> String {
        time.and_then(|t| t.date_time.or(t.date)).unwrap_or_default()
    }
}

impl From<RawEvent> for Meeting {
    fn from(event: RawEvent) -> Self {
        let title = event
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_MEETING.to_string());

        // Attendees without an email cannot be matched to contact notes
        let attendees = event
            .attendees
            .into_iter()
            .filter_map(|a| {
                a.email.filter(|e| !e.is_empty()).map(|email| Attendee {
                    email,
                    display_name: a.display_name,
                })
            })
            .collect();

        Meeting {
            id: event.id.unwrap_or_default(),
            title,
            start: EventTime::resolve(event.start),
            end: EventTime::resolve(event.end),
            attendees,
            description: event.description,
        }
    }
}
