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

use serde::Deserialize;
use serde::Serialize;

use crate::types::timestamp::Timestamp;

pub type WordId = i64;

/// A word and its meaning, as stored in the dictionary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: WordId,
    pub word: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl Word {
    pub fn new(id: WordId, word: impl Into<String>, meaning: impl Into<String>) -> Self {
        Self {
            id,
            word: word.into(),
            meaning: meaning.into(),
            created_at: None,
        }
    }
}

/// A word read from an import file. Every field is optional because the
/// files come from outside; the store decides what to do with the gaps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingWord {
    #[serde(default)]
    pub id: Option<WordId>,
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
    /// Kept as a string so one malformed date doesn't reject the whole file.
    #[serde(default)]
    pub created_at: Option<String>,
}

impl IncomingWord {
    pub fn new(word: &str, meaning: &str) -> Self {
        Self {
            id: None,
            word: Some(word.to_string()),
            meaning: Some(meaning.to_string()),
            created_at: None,
        }
    }

    /// The trimmed word, if it is non-empty.
    pub fn trimmed_word(&self) -> Option<&str> {
        self.word
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }

    pub fn trimmed_meaning(&self) -> &str {
        self.meaning.as_deref().map(str::trim).unwrap_or("")
    }

    /// The parsed creation timestamp, or `fallback` when absent or invalid.
    pub fn created_at_or(&self, fallback: Timestamp) -> Timestamp {
        self.created_at
            .clone()
            .and_then(|s| Timestamp::try_from(s).ok())
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Fallible;

    #[test]
    fn test_word_json_uses_camel_case() -> Fallible<()> {
        let word = Word {
            created_at: Some(Timestamp::try_from("2024-03-01T08:00:00.000".to_string())?),
            ..Word::new(3, "ocean", "a large body of water")
        };
        let json = serde_json::to_string(&word)?;
        assert_eq!(
            json,
            r#"{"id":3,"word":"ocean","meaning":"a large body of water","createdAt":"2024-03-01T08:00:00.000"}"#
        );
        Ok(())
    }

    #[test]
    fn test_incoming_word_accepts_browser_dates() -> Fallible<()> {
        let incoming: IncomingWord =
            serde_json::from_str(r#"{"word":"mar","createdAt":"2023-07-04T10:00:00Z"}"#)?;
        let fallback = Timestamp::try_from("2024-01-01T00:00:00.000".to_string())?;
        assert_eq!(
            incoming.created_at_or(fallback).to_string(),
            "2023-07-04T10:00:00.000"
        );
        Ok(())
    }

    #[test]
    fn test_incoming_word_tolerates_gaps() -> Fallible<()> {
        let incoming: IncomingWord =
            serde_json::from_str(r#"{"word":"  hola ","createdAt":"not a date"}"#)?;
        assert_eq!(incoming.trimmed_word(), Some("hola"));
        assert_eq!(incoming.trimmed_meaning(), "");
        let fallback = Timestamp::try_from("2024-01-01T00:00:00.000".to_string())?;
        assert_eq!(incoming.created_at_or(fallback), fallback);
        Ok(())
    }

    #[test]
    fn test_blank_word_is_none() {
        assert_eq!(IncomingWord::new("   ", "x").trimmed_word(), None);
        assert_eq!(IncomingWord::default().trimmed_word(), None);
    }
}
