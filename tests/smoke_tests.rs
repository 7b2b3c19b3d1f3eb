use meeting_prep::components::brief::{build_prompt, parse_brief, BriefRequest};
use meeting_prep::components::google_sheets::normalize_rows;
use meeting_prep::config::Tunables;

/// Shipped tunables file must parse
#[test]
fn shipped_tunables_parse() {
    let content = std::fs::read_to_string("config/meeting-prep.toml").unwrap();
    let tunables = Tunables::from_toml(&content).unwrap();
    assert!(tunables.max_meetings > 0);
    assert!(tunables.refresh_interval_secs > 0);
}

/// Sheet rows flow through the prompt and a generated reply parses back
#[test]
fn contact_rows_reach_the_prompt() {
    let rows: Vec<Vec<String>> = vec![
        vec!["Email".into(), "Name".into()],
        vec!["jane@acme.com".into(), "Jane".into(), "".into(), "Active".into()],
    ];

    let request = BriefRequest {
        title: "Renewal".into(),
        date: "2024-03-01".into(),
        attendees: vec!["jane@acme.com".into(), "new@acme.com".into()],
        contact_notes: normalize_rows(&rows),
        description: None,
    };

    let prompt = build_prompt(&request);
    assert!(prompt.contains("- jane@acme.com: Name: Jane, Last meeting: N/A, Status: Active"));
    assert!(prompt.contains("- new@acme.com: Name: N/A"));

    let brief = parse_brief("QUICK OVERVIEW\nRenewal with Jane.\n\nSUGGESTED QUESTIONS\n1. Timeline?");
    assert_eq!(brief.quick_overview, "Renewal with Jane.");
    assert_eq!(brief.suggested_questions, vec!["Timeline?"]);
}
