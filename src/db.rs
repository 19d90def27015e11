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

use std::path::Path;

use kalidict_core::ImportPolicy;
use kalidict_core::IncomingWord;
use kalidict_core::Timestamp;
use kalidict_core::Word;
use kalidict_core::WordId;
use kalidict_core::WordStore;
use kalidict_core::dictionary::plan_import;
use kalidict_core::dictionary::validate_entry;
use rusqlite::Connection;
use rusqlite::params;

use crate::error::ErrorReport;
use crate::error::Fallible;

const SCHEMA: &str = "
create table if not exists words (
    id integer primary key autoincrement,
    word text not null,
    meaning text not null,
    created_at text not null
);
create index if not exists words_by_word on words (word);
";

/// The SQLite-backed dictionary.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(path: &Path) -> Fallible<Self> {
        log::debug!("Opening database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }
}

impl WordStore for Database {
    type Error = ErrorReport;

    fn list_words(&self) -> Fallible<Vec<Word>> {
        let mut stmt = self
            .conn
            .prepare("select id, word, meaning, created_at from words order by word")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut words = Vec::with_capacity(rows.len());
        for (id, word, meaning, created_at) in rows {
            words.push(Word {
                id,
                word,
                meaning,
                created_at: Some(Timestamp::try_from(created_at)?),
            });
        }
        Ok(words)
    }

    fn add_word(&mut self, word: &str, meaning: &str, created_at: Timestamp) -> Fallible<WordId> {
        let (word, meaning) = validate_entry(word, meaning)?;
        self.conn.execute(
            "insert into words (word, meaning, created_at) values (?1, ?2, ?3)",
            params![word, meaning, created_at.to_string()],
        )?;
        let id = self.conn.last_insert_rowid();
        log::debug!("Added word {id}: {word}");
        Ok(id)
    }

    fn delete_word(&mut self, id: WordId) -> Fallible<()> {
        let deleted = self
            .conn
            .execute("delete from words where id = ?1", params![id])?;
        log::debug!("Deleted {deleted} row(s) for word {id}");
        Ok(())
    }

    fn import_words(
        &mut self,
        words: &[IncomingWord],
        policy: ImportPolicy,
        now: Timestamp,
    ) -> Fallible<usize> {
        let existing = self.list_words()?;
        let plan = plan_import(&existing, words, policy, now);
        let tx = self.conn.transaction()?;
        if plan.clear {
            tx.execute("delete from words", [])?;
        }
        for new in plan.words.iter() {
            tx.execute(
                "insert into words (id, word, meaning, created_at) values (?1, ?2, ?3, ?4)",
                params![new.id, new.word, new.meaning, new.created_at.to_string()],
            )?;
        }
        tx.commit()?;
        log::debug!("Imported {} words ({policy:?})", plan.words.len());
        Ok(plan.words.len())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn now() -> Timestamp {
        Timestamp::try_from("2024-05-01T12:00:00.000".to_string()).unwrap()
    }

    #[test]
    fn test_add_list_delete() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        let perro = db.add_word(" perro ", "dog", now())?;
        db.add_word("gato", "cat", now())?;

        let words = db.list_words()?;
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].word, "gato");
        assert_eq!(words[1].word, "perro");
        assert_eq!(words[1].id, perro);
        assert_eq!(words[1].created_at, Some(now()));

        db.delete_word(perro)?;
        db.delete_word(12345)?;
        assert_eq!(db.list_words()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_add_rejects_blank() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        let err = db.add_word("", "dog", now()).unwrap_err();
        assert_eq!(err.to_string(), "error: word must not be empty");
        Ok(())
    }

    #[test]
    fn test_words_survive_reopening() -> Fallible<()> {
        let dir = tempdir()?;
        let path = dir.path().join("words.db");
        {
            let mut db = Database::new(&path)?;
            db.add_word("sol", "sun", now())?;
        }
        let db = Database::new(&path)?;
        assert_eq!(db.list_words()?[0].word, "sol");
        Ok(())
    }

    #[test]
    fn test_import_policies() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        db.add_word("perro", "dog", now())?;

        let added = db.import_words(
            &[
                IncomingWord::new("Perro", "dog"),
                IncomingWord::new("gato", "cat"),
            ],
            ImportPolicy::OnlyAddMissing,
            now(),
        )?;
        assert_eq!(added, 1);
        assert_eq!(db.list_words()?.len(), 2);

        let replaced = db.import_words(
            &[IncomingWord {
                id: Some(77),
                ..IncomingWord::new("luna", "moon")
            }],
            ImportPolicy::ReplaceExisting,
            now(),
        )?;
        assert_eq!(replaced, 1);
        let words = db.list_words()?;
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].id, 77);

        let next = db.add_word("mar", "sea", now())?;
        assert!(next > 77);
        Ok(())
    }

    #[test]
    fn test_replace_keeps_ids_given_after_fresh_entries() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        db.add_word("perro", "dog", now())?;
        let incoming = [
            IncomingWord::new("agua", "water"),
            IncomingWord {
                id: Some(1),
                ..IncomingWord::new("fuego", "fire")
            },
        ];
        db.import_words(&incoming, ImportPolicy::ReplaceExisting, now())?;
        let words = db.list_words()?;
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].word, "fuego");
        assert_eq!(words[1].id, 1);
        assert_ne!(words[0].id, 1);
        Ok(())
    }
}
