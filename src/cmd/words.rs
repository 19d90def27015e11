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

use std::io::Write;

use kalidict_core::Timestamp;
use kalidict_core::TinyRng;
use kalidict_core::Word;
use kalidict_core::WordId;
use kalidict_core::WordStore;
use kalidict_core::dictionary::filter_words;
use kalidict_core::dictionary::pick_random_word;

use crate::db::Database;
use crate::error::Fallible;

pub fn list_words(db: &Database, search: Option<&str>, out: &mut impl Write) -> Fallible<()> {
    let words = db.list_words()?;
    let words = match search {
        Some(term) => filter_words(&words, term),
        None => words,
    };
    if words.is_empty() {
        writeln!(out, "No words found.")?;
        return Ok(());
    }
    for word in words.iter() {
        write_word(word, out)?;
    }
    Ok(())
}

pub fn add_word(db: &mut Database, word: &str, meaning: &str, out: &mut impl Write) -> Fallible<()> {
    let id = db.add_word(word, meaning, Timestamp::now())?;
    writeln!(out, "Added word #{id}.")?;
    Ok(())
}

pub fn delete_word(db: &mut Database, id: WordId, out: &mut impl Write) -> Fallible<()> {
    db.delete_word(id)?;
    writeln!(out, "Deleted word #{id}.")?;
    Ok(())
}

pub fn random_word(db: &Database, rng: &mut TinyRng, out: &mut impl Write) -> Fallible<()> {
    let words = db.list_words()?;
    match pick_random_word(&words, None, rng) {
        Some(word) => {
            writeln!(out, "{}", word.word)?;
            writeln!(out, "  {}", word.meaning)?;
        }
        None => writeln!(out, "The dictionary is empty. Add some words first.")?,
    }
    Ok(())
}

fn write_word(word: &Word, out: &mut impl Write) -> Fallible<()> {
    writeln!(out, "{:>5}  {}: {}", word.id, word.word, word.meaning)?;
    Ok(())
}
