use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Relationship notes for one contact, keyed by email in [`ContactNotes`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactNote {
    pub name: String,
    pub last_meeting: String,
    pub status: String,
    pub notes: String,
    pub last_action: String,
}

/// Contact notes lookup, email -> note
pub type ContactNotes = BTreeMap<String, ContactNote>;

/// Raw value range response from the Sheets API
#[derive(Debug, Deserialize)]
pub(crate) struct ValueRange {
    #[serde(default)]
    pub values: Vec<Vec<Value>>,
}

impl ValueRange {
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.values
            .into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}

/// Formatted cells arrive as strings, anything else is rendered as JSON text
fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Normalize a `Contacts!A:F` grid into a lookup table.
///
/// Row 1 is the header and is skipped. Each later row with a non-empty
/// column A becomes one note; missing trailing cells read as empty strings.
pub fn normalize_rows(rows: &[Vec<String>]) -> ContactNotes {
    let cell = |row: &[String], idx: usize| row.get(idx).cloned().unwrap_or_default();

    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let key = row.first().map(|k| k.trim()).unwrap_or_default();
            if key.is_empty() {
                return None;
            }
            let note = ContactNote {
                name: cell(row, 1),
                last_meeting: cell(row, 2),
                status: cell(row, 3),
                notes: cell(row, 4),
                last_action: cell(row, 5),
            };
            Some((key.to_string(), note))
        })
        .collect()
}
