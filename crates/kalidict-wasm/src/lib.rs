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

//! WASM bindings for kalidict - keeps the dictionary and runs drill
//! sessions in the browser.

use std::fmt::Display;

use chrono::NaiveDate;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::console;

use kalidict_core::dictionary::filter_words;
use kalidict_core::dictionary::pick_random_word;
use kalidict_core::transfer::DEFAULT_EXPORT_PREFIX;
use kalidict_core::transfer::build_export;
use kalidict_core::transfer::export_file_name;
use kalidict_core::transfer::parse_dictionary_words;
use kalidict_core::{
    ImportPolicy, MemoryStore, QuizMode, Session, SessionConfig, Timestamp, TinyRng, WordId,
    WordStore, answer_choice_by_id, answer_written, load_next_prompt, start_session,
};

mod storage;

use storage::Storage;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console::log_1(&"kalidict WASM initialized".into());
}

/// The dictionary and the current drill session, driven from JavaScript.
///
/// Getters return JSON strings; the session is serialized with camelCase
/// field names and prompts tagged by `type`.
#[wasm_bindgen]
pub struct DrillApp {
    store: MemoryStore,
    storage: Storage,
    session: Option<Session>,
    rng: TinyRng,
    /// The last word shown by `random_word_json`, so it is not repeated.
    last_random: Option<WordId>,
}

#[wasm_bindgen]
impl DrillApp {
    /// Create the app, loading any dictionary saved in localStorage.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<DrillApp, JsValue> {
        let storage = Storage::new();
        let words = storage.load_words()?;
        console::log_1(&format!("Loaded {} words", words.len()).into());
        Ok(Self {
            store: MemoryStore::from_words(words),
            storage,
            session: None,
            rng: TinyRng::from_seed(random_seed()),
            last_random: None,
        })
    }

    #[wasm_bindgen]
    pub fn words_json(&self) -> Result<String, JsValue> {
        let words = self.store.list_words().map_err(js_error)?;
        to_json(&words)
    }

    /// Words whose word or meaning contains `term`, ignoring case.
    #[wasm_bindgen]
    pub fn search_json(&self, term: &str) -> Result<String, JsValue> {
        let words = self.store.list_words().map_err(js_error)?;
        to_json(&filter_words(&words, term))
    }

    #[wasm_bindgen]
    pub fn add_word(&mut self, word: &str, meaning: &str) -> Result<WordId, JsValue> {
        let id = self
            .store
            .add_word(word, meaning, now()?)
            .map_err(js_error)?;
        self.save()?;
        Ok(id)
    }

    #[wasm_bindgen]
    pub fn delete_word(&mut self, id: WordId) -> Result<(), JsValue> {
        self.store.delete_word(id).map_err(js_error)?;
        self.save()
    }

    /// Replace the dictionary with the words in an export file. Returns the
    /// number of words imported.
    #[wasm_bindgen]
    pub fn import_json(&mut self, json: &str) -> Result<usize, JsValue> {
        self.import(json, ImportPolicy::ReplaceExisting)
    }

    /// Add the words of a dictionary file that are missing. Returns the
    /// number of words added.
    #[wasm_bindgen]
    pub fn sync_json(&mut self, json: &str) -> Result<usize, JsValue> {
        self.import(json, ImportPolicy::OnlyAddMissing)
    }

    #[wasm_bindgen]
    pub fn export_json(&self) -> Result<String, JsValue> {
        let words = self.store.list_words().map_err(js_error)?;
        build_export(words, now()?).to_json().map_err(js_error)
    }

    /// Suggested download name for `export_json`.
    #[wasm_bindgen]
    pub fn export_file_name(&self) -> Result<String, JsValue> {
        Ok(export_file_name(DEFAULT_EXPORT_PREFIX, now()?.date()))
    }

    /// A random word, different from the previous pick when possible.
    /// `null` when the dictionary is empty.
    #[wasm_bindgen]
    pub fn random_word_json(&mut self) -> Result<Option<String>, JsValue> {
        let words = self.store.list_words().map_err(js_error)?;
        match pick_random_word(&words, self.last_random, &mut self.rng) {
            Some(word) => {
                self.last_random = Some(word.id);
                to_json(word).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Start a session over the whole dictionary. `mode` is one of
    /// `multiple-choice`, `written` or `mixed`.
    #[wasm_bindgen]
    pub fn start_session(&mut self, limit: usize, mode: &str) -> Result<String, JsValue> {
        let mode: QuizMode = mode.parse().map_err(js_error)?;
        let words = self.store.list_words().map_err(js_error)?;
        let session = start_session(
            SessionConfig {
                words,
                question_limit: limit,
                mode,
            },
            &mut self.rng,
        );
        self.session = Some(session);
        self.session_json()
    }

    /// The current session, or `null` before the first one starts.
    #[wasm_bindgen]
    pub fn session_json(&self) -> Result<String, JsValue> {
        to_json(&self.session)
    }

    #[wasm_bindgen]
    pub fn progress_json(&self) -> Result<String, JsValue> {
        to_json(&self.session.as_ref().map(Session::progress))
    }

    #[wasm_bindgen]
    pub fn answer_choice(&mut self, id: &str) -> Result<String, JsValue> {
        self.advance(|session, _| answer_choice_by_id(session, id))
    }

    #[wasm_bindgen]
    pub fn answer_written(&mut self, text: &str) -> Result<String, JsValue> {
        self.advance(|session, _| answer_written(session, text))
    }

    #[wasm_bindgen]
    pub fn next_prompt(&mut self) -> Result<String, JsValue> {
        self.advance(load_next_prompt)
    }
}

impl DrillApp {
    fn import(&mut self, json: &str, policy: ImportPolicy) -> Result<usize, JsValue> {
        let words = parse_dictionary_words(json).map_err(js_error)?;
        let count = self
            .store
            .import_words(&words, policy, now()?)
            .map_err(js_error)?;
        self.save()?;
        Ok(count)
    }

    fn advance(
        &mut self,
        step: impl FnOnce(&Session, &mut TinyRng) -> Session,
    ) -> Result<String, JsValue> {
        let Some(session) = &self.session else {
            return Err(JsValue::from_str("No session in progress"));
        };
        self.session = Some(step(session, &mut self.rng));
        self.session_json()
    }

    fn save(&self) -> Result<(), JsValue> {
        self.storage.save_words(self.store.words())
    }
}

fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(js_error)
}

/// Seed from the browser's crypto source, or the clock if it is missing.
fn random_seed() -> u64 {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => u64::from_le_bytes(bytes),
        Err(_) => js_sys::Date::now() as u64,
    }
}

/// The current local time.
fn now() -> Result<Timestamp, JsValue> {
    let date = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(date.get_full_year() as i32, date.get_month() + 1, date.get_date())
        .and_then(|d| {
            d.and_hms_milli_opt(
                date.get_hours(),
                date.get_minutes(),
                date.get_seconds(),
                date.get_milliseconds(),
            )
        })
        .map(Timestamp::new)
        .ok_or_else(|| JsValue::from_str("Invalid system time"))
}
