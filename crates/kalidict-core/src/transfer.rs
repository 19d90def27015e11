// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Reading and writing dictionary files.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::Fallible;
use crate::error::fail;
use crate::types::date::Date;
use crate::types::timestamp::Timestamp;
use crate::types::word::IncomingWord;
use crate::types::word::Word;

pub const EXPORT_VERSION: u32 = 1;

pub const DEFAULT_EXPORT_PREFIX: &str = "dictionary-export";

/// The document written by an export.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: u32,
    pub exported_at: Timestamp,
    pub words: Vec<Word>,
}

/// Extract the word list from a dictionary file. Both an export document
/// (`{"words": [...]}`) and a bare array of words are accepted.
pub fn parse_dictionary_words(json: &str) -> Fallible<Vec<IncomingWord>> {
    let payload: Value = serde_json::from_str(json)?;
    let words = match payload {
        Value::Object(mut map) => match map.remove("words") {
            Some(words @ Value::Array(_)) => words,
            _ => return fail("Invalid dictionary format."),
        },
        words @ Value::Array(_) => words,
        _ => return fail("Invalid dictionary format."),
    };
    Ok(serde_json::from_value(words)?)
}

pub fn build_export(words: Vec<Word>, now: Timestamp) -> ExportDocument {
    ExportDocument {
        version: EXPORT_VERSION,
        exported_at: now,
        words,
    }
}

impl ExportDocument {
    pub fn to_json(&self) -> Fallible<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// The default file name for an export made on `date`.
pub fn export_file_name(prefix: &str, date: Date) -> String {
    format!("{prefix}-{date}.json")
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::try_from("2024-06-30T18:45:00.250".to_string()).unwrap()
    }

    #[test]
    fn test_parse_export_document() -> Fallible<()> {
        let json = r#"{"version":1,"exportedAt":"2024-01-01T00:00:00.000Z","words":[{"id":1,"word":"sol","meaning":"sun"}]}"#;
        let words = parse_dictionary_words(json)?;
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].id, Some(1));
        assert_eq!(words[0].trimmed_word(), Some("sol"));
        Ok(())
    }

    #[test]
    fn test_parse_bare_array() -> Fallible<()> {
        let words = parse_dictionary_words(r#"[{"word":"luna","meaning":"moon"},{"word":"mar"}]"#)?;
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].trimmed_meaning(), "");
        Ok(())
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for json in [r#"{"items":[]}"#, r#"{"words":"sol"}"#, "42", r#""words""#] {
            let err = parse_dictionary_words(json).unwrap_err();
            assert_eq!(err.to_string(), "error: Invalid dictionary format.");
        }
        assert!(parse_dictionary_words("{not json").is_err());
    }

    #[test]
    fn test_export_document() -> Fallible<()> {
        let doc = build_export(vec![Word::new(5, "rio", "river")], now());
        let json = doc.to_json()?;
        assert!(json.contains("\"version\": 1"));
        assert!(json.contains("\"exportedAt\": \"2024-06-30T18:45:00.250\""));

        let words = parse_dictionary_words(&json)?;
        assert_eq!(words, vec![IncomingWord {
            id: Some(5),
            ..IncomingWord::new("rio", "river")
        }]);
        Ok(())
    }

    #[test]
    fn test_export_file_name() {
        let date = Date::new(NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(
            export_file_name(DEFAULT_EXPORT_PREFIX, date),
            "dictionary-export-2025-03-09.json"
        );
    }
}
