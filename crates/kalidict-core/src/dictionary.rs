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

//! The word store interface, and the dictionary logic shared by every store.

use std::collections::HashSet;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::rng::TinyRng;
use crate::types::timestamp::Timestamp;
use crate::types::word::IncomingWord;
use crate::types::word::Word;
use crate::types::word::WordId;

/// How imported words are combined with the words already stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportPolicy {
    /// Add every entry.
    Append,
    /// Delete everything, then add every entry, keeping incoming ids.
    ReplaceExisting,
    /// Add only entries whose word (ignoring case) is not stored yet.
    OnlyAddMissing,
}

/// Where words live. Quiz sessions only ever see the result of
/// [`WordStore::list_words`].
pub trait WordStore {
    type Error;

    /// All words, ordered by word.
    fn list_words(&self) -> Result<Vec<Word>, Self::Error>;

    /// Add a word, returning its id. Both fields are trimmed and must not be
    /// empty.
    fn add_word(
        &mut self,
        word: &str,
        meaning: &str,
        created_at: Timestamp,
    ) -> Result<WordId, Self::Error>;

    /// Delete a word. Unknown ids are ignored.
    fn delete_word(&mut self, id: WordId) -> Result<(), Self::Error>;

    /// Import words, returning how many were added.
    fn import_words(
        &mut self,
        words: &[IncomingWord],
        policy: ImportPolicy,
        now: Timestamp,
    ) -> Result<usize, Self::Error>;
}

/// A word ready to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewWord {
    /// Only set when replacing the whole dictionary.
    pub id: Option<WordId>,
    pub word: String,
    pub meaning: String,
    pub created_at: Timestamp,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ImportPlan {
    /// Whether the store must be emptied first.
    pub clear: bool,
    pub words: Vec<NewWord>,
}

/// Trim and check a word typed in by the user.
pub fn validate_entry(word: &str, meaning: &str) -> Fallible<(String, String)> {
    let word = word.trim();
    let meaning = meaning.trim();
    if word.is_empty() {
        return fail("word must not be empty");
    }
    if meaning.is_empty() {
        return fail("meaning must not be empty");
    }
    Ok((word.to_string(), meaning.to_string()))
}

/// Work out what an import has to insert, given the words already stored.
/// Entries with a blank word are always skipped.
pub fn plan_import(
    existing: &[Word],
    incoming: &[IncomingWord],
    policy: ImportPolicy,
    now: Timestamp,
) -> ImportPlan {
    let mut seen: HashSet<String> = match policy {
        ImportPolicy::OnlyAddMissing => existing
            .iter()
            .map(|w| w.word.trim().to_lowercase())
            .collect(),
        ImportPolicy::Append | ImportPolicy::ReplaceExisting => HashSet::new(),
    };
    let mut used_ids: HashSet<WordId> = HashSet::new();
    let mut words = Vec::new();

    for entry in incoming {
        let Some(word) = entry.trimmed_word() else {
            continue;
        };
        if policy == ImportPolicy::OnlyAddMissing && !seen.insert(word.to_lowercase()) {
            continue;
        }
        let id = match (policy, entry.id) {
            (ImportPolicy::ReplaceExisting, Some(id)) if used_ids.insert(id) => Some(id),
            _ => None,
        };
        words.push(NewWord {
            id,
            word: word.to_string(),
            meaning: entry.trimmed_meaning().to_string(),
            created_at: entry.created_at_or(now),
        });
    }

    // Words keeping their id go first so fresh ids cannot take theirs.
    words.sort_by_key(|w| w.id.is_none());

    ImportPlan {
        clear: policy == ImportPolicy::ReplaceExisting,
        words,
    }
}

/// Case-insensitive search over words and meanings. A blank term matches
/// everything.
pub fn filter_words(words: &[Word], term: &str) -> Vec<Word> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return words.to_vec();
    }
    words
        .iter()
        .filter(|w| w.word.to_lowercase().contains(&term) || w.meaning.to_lowercase().contains(&term))
        .cloned()
        .collect()
}

/// A random word to study, never the `previous` one unless it is the only
/// word there is.
pub fn pick_random_word<'a>(
    words: &'a [Word],
    previous: Option<WordId>,
    rng: &mut TinyRng,
) -> Option<&'a Word> {
    if words.len() <= 1 {
        return words.first();
    }
    let candidates: Vec<&Word> = words.iter().filter(|w| Some(w.id) != previous).collect();
    if candidates.is_empty() {
        return words.first();
    }
    Some(candidates[rng.index(candidates.len())])
}

/// An in-memory word store. Backs the browser build, where the words are
/// persisted as JSON.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    words: Vec<Word>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words }
    }

    /// The stored words, in insertion order.
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// One past the largest id, or the smallest unused positive id once the
    /// largest is `WordId::MAX`.
    fn next_id(&self) -> WordId {
        let max = self.words.iter().map(|w| w.id).max().unwrap_or(0);
        match max.checked_add(1) {
            Some(id) => id,
            None => {
                let used: HashSet<WordId> = self.words.iter().map(|w| w.id).collect();
                (1..WordId::MAX).find(|id| !used.contains(id)).unwrap_or(max)
            }
        }
    }

    fn insert(&mut self, new: NewWord) -> WordId {
        let id = match new.id {
            Some(id) if !self.words.iter().any(|w| w.id == id) => id,
            _ => self.next_id(),
        };
        self.words.push(Word {
            id,
            word: new.word,
            meaning: new.meaning,
            created_at: Some(new.created_at),
        });
        id
    }
}

impl WordStore for MemoryStore {
    type Error = ErrorReport;

    fn list_words(&self) -> Fallible<Vec<Word>> {
        let mut words = self.words.clone();
        words.sort_by(|a, b| a.word.cmp(&b.word));
        Ok(words)
    }

    fn add_word(&mut self, word: &str, meaning: &str, created_at: Timestamp) -> Fallible<WordId> {
        let (word, meaning) = validate_entry(word, meaning)?;
        Ok(self.insert(NewWord {
            id: None,
            word,
            meaning,
            created_at,
        }))
    }

    fn delete_word(&mut self, id: WordId) -> Fallible<()> {
        self.words.retain(|w| w.id != id);
        Ok(())
    }

    fn import_words(
        &mut self,
        words: &[IncomingWord],
        policy: ImportPolicy,
        now: Timestamp,
    ) -> Fallible<usize> {
        let plan = plan_import(&self.words, words, policy, now);
        if plan.clear {
            self.words.clear();
        }
        let count = plan.words.len();
        for new in plan.words {
            self.insert(new);
        }
        Ok(count)
    }
}
