//! Recovery of the six prep brief sections from free-form model output.
//!
//! A section is its heading (case-insensitive) followed by one or more line
//! breaks; the body runs until the next blank line that is followed by a
//! line starting with an uppercase letter, or the end of the text. A body
//! that itself contains such a blank line is cut short there. A heading
//! whose body would begin with another known heading has an empty body.

use super::models::PrepBrief;
use lazy_static::lazy_static;
use regex::Regex;

pub const QUICK_OVERVIEW: &str = "QUICK OVERVIEW";
pub const WHAT_HAPPENED_LAST_TIME: &str = "WHAT HAPPENED LAST TIME";
pub const WHAT_TO_SAY_FIRST: &str = "WHAT TO SAY FIRST";
pub const SUGGESTED_QUESTIONS: &str = "SUGGESTED QUESTIONS";
pub const RISKS_AND_OPPORTUNITIES: &str = "RISKS & OPPORTUNITIES";
pub const FOLLOW_UP_DRAFT: &str = "FOLLOW-UP DRAFT";

/// Upper bound on kept questions
pub const MAX_QUESTIONS: usize = 5;

lazy_static! {
    static ref SECTION_END: Regex = Regex::new(r"\n[ \t]*\r?\n[A-Z]").unwrap();
    static ref LIST_MARKER: Regex = Regex::new(r"^(?:-|[0-9]+\.)").unwrap();
}

fn heading_pattern(label: &str) -> Regex {
    // Always valid: the label is escaped
    Regex::new(&format!(
        r"(?i){}[ \t]*\r?\n(?:[ \t]*\r?\n)*",
        regex::escape(label)
    ))
    .unwrap()
}

lazy_static! {
    static ref HEADINGS: Vec<(&'static str, Regex)> = [
        QUICK_OVERVIEW,
        WHAT_HAPPENED_LAST_TIME,
        WHAT_TO_SAY_FIRST,
        SUGGESTED_QUESTIONS,
        RISKS_AND_OPPORTUNITIES,
        FOLLOW_UP_DRAFT,
    ]
    .into_iter()
    .map(|label| (label, heading_pattern(label)))
    .collect();
}

/// Parse generated text into a brief. Never fails.
pub fn parse_brief(text: &str) -> PrepBrief {
    PrepBrief {
        quick_overview: extract_section(text, QUICK_OVERVIEW),
        what_happened_last_time: extract_section(text, WHAT_HAPPENED_LAST_TIME),
        what_to_say_first: extract_section(text, WHAT_TO_SAY_FIRST),
        suggested_questions: extract_questions(text),
        risks_and_opportunities: extract_section(text, RISKS_AND_OPPORTUNITIES),
        follow_up_draft: extract_section(text, FOLLOW_UP_DRAFT),
    }
}

/// Body of the first section headed `label`, trimmed; empty when absent
pub fn extract_section(text: &str, label: &str) -> String {
    let heading = HEADINGS.iter().find(|(known, _)| *known == label);
    let found = match heading {
        Some((_, re)) => re.find(text),
        None => heading_pattern(label).find(text),
    };
    let Some(found) = found else {
        return String::new();
    };

    let body = &text[found.end()..];
    if starts_with_heading(body) {
        return String::new();
    }

    let end = SECTION_END.find(body).map_or(body.len(), |m| m.start());
    body[..end].trim().to_string()
}

/// First line of `body` is one of the known headings
fn starts_with_heading(body: &str) -> bool {
    let first_line = body.lines().next().unwrap_or_default().trim();
    let first_line = first_line.strip_suffix(':').unwrap_or(first_line).trim_end();
    HEADINGS
        .iter()
        .any(|(label, _)| first_line.eq_ignore_ascii_case(label))
}

/// Bulleted or numbered lines of the questions section, markers stripped
pub fn extract_questions(text: &str) -> Vec<String> {
    extract_section(text, SUGGESTED_QUESTIONS)
        .lines()
        .map(str::trim)
        .filter_map(|line| LIST_MARKER.find(line).map(|m| line[m.end()..].trim()))
        .filter(|q| !q.is_empty())
        .take(MAX_QUESTIONS)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "QUICK OVERVIEW\nDiscuss Q1 roadmap.\n\nWHAT HAPPENED LAST TIME\nNo previous meeting history\n\nWHAT TO SAY FIRST\nThanks for joining.\n\nSUGGESTED QUESTIONS\n- What are the blockers?\n- Any budget concerns?\n\nRISKS & OPPORTUNITIES\nRisk: timeline slip. Opportunity: upsell.\n\nFOLLOW-UP DRAFT\nThanks for the discussion today.";

    #[test]
    fn parses_all_sections() {
        let brief = parse_brief(FULL);
        assert_eq!(brief.quick_overview, "Discuss Q1 roadmap.");
        assert_eq!(brief.what_happened_last_time, "No previous meeting history");
        assert_eq!(brief.what_to_say_first, "Thanks for joining.");
        assert_eq!(
            brief.suggested_questions,
            vec!["What are the blockers?", "Any budget concerns?"]
        );
        assert_eq!(
            brief.risks_and_opportunities,
            "Risk: timeline slip. Opportunity: upsell."
        );
        assert_eq!(brief.follow_up_draft, "Thanks for the discussion today.");
    }

    #[test]
    fn empty_and_unstructured_input_degrade_to_empty_fields() {
        assert_eq!(parse_brief(""), PrepBrief::default());
        assert_eq!(
            parse_brief("I'm sorry, I can't help with that."),
            PrepBrief::default()
        );
    }

    #[test]
    fn missing_sections_are_empty_while_others_parse() {
        let text = "QUICK OVERVIEW\nIntro call.\n\nFOLLOW-UP DRAFT\nGreat chatting.";
        let brief = parse_brief(text);
        assert_eq!(brief.quick_overview, "Intro call.");
        assert_eq!(brief.follow_up_draft, "Great chatting.");
        assert!(brief.what_happened_last_time.is_empty());
        assert!(brief.what_to_say_first.is_empty());
        assert!(brief.suggested_questions.is_empty());
        assert!(brief.risks_and_opportunities.is_empty());
    }

    #[test]
    fn headings_match_case_insensitively() {
        let text = "Quick Overview\nMixed case heading works.\n\nWhat To Say First\nHello!";
        let brief = parse_brief(text);
        assert_eq!(brief.quick_overview, "Mixed case heading works.");
        assert_eq!(brief.what_to_say_first, "Hello!");
    }

    #[test]
    fn tolerates_extra_blank_lines_and_crlf() {
        let text = "QUICK OVERVIEW  \r\n\r\n\r\nSpaced out.\r\n\r\nWHAT TO SAY FIRST\r\nHi.";
        let brief = parse_brief(text);
        assert_eq!(brief.quick_overview, "Spaced out.");
        assert_eq!(brief.what_to_say_first, "Hi.");
    }

    #[test]
    fn body_continues_past_blank_line_before_lowercase_text() {
        let text = "QUICK OVERVIEW\nFirst paragraph.\n\nand a lowercase follow-on.\n\nWHAT TO SAY FIRST\nHi.";
        assert_eq!(
            extract_section(text, QUICK_OVERVIEW),
            "First paragraph.\n\nand a lowercase follow-on."
        );
    }

    #[test]
    fn body_is_cut_at_blank_line_before_uppercase_text() {
        let text = "QUICK OVERVIEW\nFirst paragraph.\n\nSecond paragraph.";
        assert_eq!(extract_section(text, QUICK_OVERVIEW), "First paragraph.");
    }

    #[test]
    fn first_heading_match_wins() {
        let text = "QUICK OVERVIEW\nFirst.\n\nQUICK OVERVIEW\nSecond.";
        assert_eq!(extract_section(text, QUICK_OVERVIEW), "First.");
    }

    #[test]
    fn empty_section_does_not_take_the_next_one() {
        let text = "QUICK OVERVIEW\nIntro.\n\nWHAT HAPPENED LAST TIME\n\nWHAT TO SAY FIRST\nHi there.\n\nSUGGESTED QUESTIONS\n- Q?";
        let brief = parse_brief(text);
        assert_eq!(brief.quick_overview, "Intro.");
        assert_eq!(brief.what_happened_last_time, "");
        assert_eq!(brief.what_to_say_first, "Hi there.");
        assert_eq!(brief.suggested_questions, vec!["Q?"]);
    }

    #[test]
    fn empty_section_directly_followed_by_heading() {
        let text = "WHAT HAPPENED LAST TIME\nWhat To Say First:\nHi.\n\nFOLLOW-UP DRAFT\n";
        assert_eq!(extract_section(text, WHAT_HAPPENED_LAST_TIME), "");
        assert_eq!(extract_section(text, FOLLOW_UP_DRAFT), "");
    }

    #[test]
    fn body_mentioning_a_heading_mid_line_is_kept() {
        let text = "QUICK OVERVIEW\nQuick overview of the renewal.\n\nWHAT TO SAY FIRST\nHi.";
        assert_eq!(
            extract_section(text, QUICK_OVERVIEW),
            "Quick overview of the renewal."
        );
    }

    #[test]
    fn all_sections_with_more_than_five_questions() {
        let text = "QUICK OVERVIEW\nPlanning.\n\nWHAT HAPPENED LAST TIME\nAgreed on scope.\n\nWHAT TO SAY FIRST\nGood to see you.\n\nSUGGESTED QUESTIONS\n- A?\n- B?\n3. C?\n- D?\n5. E?\n- F?\n- G?\n\nRISKS & OPPORTUNITIES\nBudget cut.\n\nFOLLOW-UP DRAFT\nThanks all.";
        let brief = parse_brief(text);
        assert_eq!(brief.quick_overview, "Planning.");
        assert_eq!(brief.what_happened_last_time, "Agreed on scope.");
        assert_eq!(brief.what_to_say_first, "Good to see you.");
        assert_eq!(brief.suggested_questions, vec!["A?", "B?", "C?", "D?", "E?"]);
        assert_eq!(brief.risks_and_opportunities, "Budget cut.");
        assert_eq!(brief.follow_up_draft, "Thanks all.");
    }

    #[test]
    fn only_ascii_digits_number_a_question() {
        let text = "SUGGESTED QUESTIONS\n\u{0661}. Arabic-indic?\n1. Ascii?";
        assert_eq!(extract_questions(text), vec!["Ascii?"]);
    }

    #[test]
    fn heading_without_line_break_is_not_a_section() {
        assert_eq!(extract_section("QUICK OVERVIEW: inline text", QUICK_OVERVIEW), "");
    }

    #[test]
    fn questions_keep_only_list_lines_and_strip_markers() {
        let text = "SUGGESTED QUESTIONS\nHere are some ideas:\n- First?\n\n2. Second?\nnot a question\n  10.   Tenth?\n-\n3.";
        assert_eq!(extract_questions(text), vec!["First?", "Second?", "Tenth?"]);
    }

    #[test]
    fn questions_are_capped_in_source_order() {
        let text = "SUGGESTED QUESTIONS\n1. One\n2. Two\n- Three\n4. Four\n- Five\n6. Six\n7. Seven";
        assert_eq!(
            extract_questions(text),
            vec!["One", "Two", "Three", "Four", "Five"]
        );
    }
}
