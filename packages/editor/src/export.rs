//! JSON export and import of a single document.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{EditorError, EditorResult};

/// Pretty-printed JSON of the document
pub fn export_document<D: Serialize>(document: &D) -> EditorResult<Vec<u8>> {
    serde_json::to_vec_pretty(document).map_err(EditorError::Export)
}

/// `<name>-<YYYY-MM-DD>.json`, with every whitespace run in the name
/// replaced by a single `-`
pub fn export_file_name(name: &str, date: NaiveDate) -> String {
    let mut stem = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_space {
                stem.push('-');
            }
            in_space = true;
        } else {
            stem.push(ch);
            in_space = false;
        }
    }
    format!("{}-{}.json", stem, date.format("%Y-%m-%d"))
}

pub fn import_document<D: DeserializeOwned>(bytes: &[u8]) -> EditorResult<D> {
    serde_json::from_slice(bytes).map_err(EditorError::Import)
}

#[cfg(test)]
mod tests {
    use super::*;
    use onepager_model::OnePagerData;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_file_name_collapses_whitespace() {
        assert_eq!(
            export_file_name("Mars  Rover\tQ3 plan", date()),
            "Mars-Rover-Q3-plan-2025-03-14.json"
        );
        assert_eq!(export_file_name(" Edge ", date()), "-Edge--2025-03-14.json");
    }

    #[test]
    fn test_export_then_import_is_lossless() {
        let document = OnePagerData::new_default("Apollo", date());
        let bytes = export_document(&document).unwrap();
        assert!(String::from_utf8(bytes.clone()).unwrap().contains("\n  \"projectName\""));

        let imported: OnePagerData = import_document(&bytes).unwrap();
        assert_eq!(imported, document);
    }

    #[test]
    fn test_import_rejects_invalid_json() {
        let result = import_document::<OnePagerData>(b"{ not json");
        assert!(matches!(result, Err(EditorError::Import(_))));
    }
}
