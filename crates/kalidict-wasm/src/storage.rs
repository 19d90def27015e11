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

//! Browser localStorage wrapper for persisting the dictionary.

use kalidict_core::Word;
use wasm_bindgen::prelude::*;
use web_sys::Storage as WebStorage;

/// The localStorage key holding the dictionary as a JSON array.
pub const WORDS_KEY: &str = "kalidict_words";

/// Falls back to keeping nothing when localStorage is unavailable, as in
/// private browsing.
pub struct Storage {
    inner: Option<WebStorage>,
}

impl Storage {
    pub fn new() -> Self {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        Self { inner }
    }

    pub fn load_words(&self) -> Result<Vec<Word>, JsValue> {
        let Some(storage) = &self.inner else {
            return Ok(Vec::new());
        };
        match storage.get_item(WORDS_KEY)? {
            Some(data) => serde_json::from_str(&data)
                .map_err(|e| JsValue::from_str(&format!("Failed to load words: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    pub fn save_words(&self, words: &[Word]) -> Result<(), JsValue> {
        let Some(storage) = &self.inner else {
            return Ok(());
        };
        let data = serde_json::to_string(words)
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize words: {e}")))?;
        storage.set_item(WORDS_KEY, &data)
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}
