use super::models::BriefRequest;

/// System preamble for the completion agent
pub const SYSTEM_PROMPT: &str = "You are an executive assistant who prepares concise, practical meeting prep summaries. Follow the requested output format exactly.";

/// Shown in place of the CRM block when no attendee has contact notes
pub const NO_CRM_DATA: &str = "No CRM data available";

const FORMAT_INSTRUCTIONS: &str = "Output EXACTLY in this format with clear sections:

QUICK OVERVIEW
[2-3 sentences about the meeting purpose and key points]

WHAT HAPPENED LAST TIME
[2-3 sentences about relevant history with these attendees, or \"No previous meeting history\" if N/A]

WHAT TO SAY FIRST
[A specific opening line that sets a positive tone]

SUGGESTED QUESTIONS
[5 bullet points of strategic questions to ask]

RISKS & OPPORTUNITIES
[2-3 key risks and 2-3 opportunities to be aware of]

FOLLOW-UP DRAFT
[A brief follow-up message template to use after the meeting]";

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// One line per attendee with their contact notes, or the fallback line
pub fn render_contact_notes(request: &BriefRequest) -> String {
    let known = request
        .attendees
        .iter()
        .any(|email| request.contact_notes.contains_key(email));
    if !known {
        return NO_CRM_DATA.to_string();
    }

    request
        .attendees
        .iter()
        .map(|email| match request.contact_notes.get(email) {
            Some(note) => format!(
                "- {}: Name: {}, Last meeting: {}, Status: {}, Notes: {}, Last action: {}",
                email,
                or_na(&note.name),
                or_na(&note.last_meeting),
                or_na(&note.status),
                or_na(&note.notes),
                or_na(&note.last_action),
            ),
            None => format!(
                "- {}: Name: N/A, Last meeting: N/A, Status: N/A, Notes: N/A, Last action: N/A",
                email
            ),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the generation prompt for a validated request
pub fn build_prompt(request: &BriefRequest) -> String {
    let description = match request.description.as_deref().map(str::trim) {
        Some(d) if !d.is_empty() => format!("- Description: {}\n", d),
        _ => String::new(),
    };

    format!(
        "Generate a professional Meeting Prep Summary for this meeting:\n\n\
         Meeting Info:\n\
         - Title: {}\n\
         - Date: {}\n\
         - Attendees: {}\n\
         {}\n\
         CRM Data (from Google Sheet):\n\
         {}\n\n\
         {}",
        request.title.trim(),
        request.date,
        request.attendees.join(", "),
        description,
        render_contact_notes(request),
        FORMAT_INSTRUCTIONS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_sheets::{ContactNote, ContactNotes};

    fn request(notes: ContactNotes, description: Option<&str>) -> BriefRequest {
        BriefRequest {
            title: "Q1 Review".into(),
            date: "2024-03-01T10:00:00Z".into(),
            attendees: vec!["a@x.com".into(), "b@x.com".into()],
            contact_notes: notes,
            description: description.map(str::to_string),
        }
    }

    #[test]
    fn prompt_lists_meeting_details_and_layout() {
        let prompt = build_prompt(&request(ContactNotes::new(), Some("Roadmap review")));
        assert!(prompt.contains("- Title: Q1 Review"));
        assert!(prompt.contains("- Date: 2024-03-01T10:00:00Z"));
        assert!(prompt.contains("- Attendees: a@x.com, b@x.com"));
        assert!(prompt.contains("- Description: Roadmap review"));
        assert!(prompt.contains(NO_CRM_DATA));
        for heading in [
            "QUICK OVERVIEW",
            "WHAT HAPPENED LAST TIME",
            "WHAT TO SAY FIRST",
            "SUGGESTED QUESTIONS",
            "RISKS & OPPORTUNITIES",
            "FOLLOW-UP DRAFT",
        ] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn description_line_is_omitted_when_absent() {
        let prompt = build_prompt(&request(ContactNotes::new(), None));
        assert!(!prompt.contains("Description:"));
        let prompt = build_prompt(&request(ContactNotes::new(), Some("  ")));
        assert!(!prompt.contains("Description:"));
    }

    #[test]
    fn contact_notes_render_per_attendee() {
        let mut notes = ContactNotes::new();
        notes.insert(
            "a@x.com".into(),
            ContactNote {
                name: "Alice".into(),
                last_meeting: "2024-01-01".into(),
                status: "Active".into(),
                ..Default::default()
            },
        );
        let rendered = render_contact_notes(&request(notes, None));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "- a@x.com: Name: Alice, Last meeting: 2024-01-01, Status: Active, Notes: N/A, Last action: N/A"
        );
        assert!(lines[1].starts_with("- b@x.com: Name: N/A"));
    }

    #[test]
    fn notes_for_non_attendees_are_ignored() {
        let mut notes = ContactNotes::new();
        notes.insert("z@x.com".into(), ContactNote::default());
        assert_eq!(render_contact_notes(&request(notes, None)), NO_CRM_DATA);
    }
}
