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

use std::fs::read_to_string;
use std::fs::write;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use kalidict_core::ImportPolicy;
use kalidict_core::Timestamp;
use kalidict_core::WordStore;
use kalidict_core::transfer::DEFAULT_EXPORT_PREFIX;
use kalidict_core::transfer::build_export;
use kalidict_core::transfer::export_file_name;
use kalidict_core::transfer::parse_dictionary_words;

use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

/// Replace the whole dictionary with the contents of an export file.
pub fn import_file(db: &mut Database, path: &Path, out: &mut impl Write) -> Fallible<()> {
    let words = read_words(path)?;
    let count = db.import_words(&words, ImportPolicy::ReplaceExisting, Timestamp::now())?;
    writeln!(out, "Successfully imported {count} words.")?;
    Ok(())
}

/// Add the words from a dictionary file that are not in the dictionary yet.
pub fn sync_file(db: &mut Database, path: &Path, out: &mut impl Write) -> Fallible<()> {
    let words = read_words(path)?;
    let count = db.import_words(&words, ImportPolicy::OnlyAddMissing, Timestamp::now())?;
    match count {
        0 => writeln!(out, "Your dictionary is already up to date.")?,
        1 => writeln!(out, "Added 1 new word.")?,
        n => writeln!(out, "Added {n} new words.")?,
    }
    Ok(())
}

/// Write every word to a JSON file. Without an explicit output path, a
/// dated file is created in the working directory.
pub fn export_file(db: &Database, output: Option<PathBuf>, out: &mut impl Write) -> Fallible<()> {
    let now = Timestamp::now();
    let path = output
        .unwrap_or_else(|| PathBuf::from(export_file_name(DEFAULT_EXPORT_PREFIX, now.date())));
    let document = build_export(db.list_words()?, now);
    write(&path, document.to_json()?)?;
    writeln!(
        out,
        "Exported {} words to {}.",
        document.words.len(),
        path.display()
    )?;
    Ok(())
}

fn read_words(path: &Path) -> Fallible<Vec<kalidict_core::IncomingWord>> {
    if !path.exists() {
        return fail(format!("file does not exist: {}", path.display()));
    }
    let text = read_to_string(path)?;
    Ok(parse_dictionary_words(&text)?)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_export_then_import() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        db.add_word("sol", "sun", Timestamp::now())?;
        db.add_word("luna", "moon", Timestamp::now())?;

        let file = dir.path().join("export.json");
        let mut out = Vec::new();
        export_file(&db, Some(file.clone()), &mut out)?;
        assert_eq!(
            String::from_utf8(out)?,
            format!("Exported 2 words to {}.\n", file.display())
        );

        let mut other = Database::new(&dir.path().join("other.db"))?;
        other.add_word("mar", "sea", Timestamp::now())?;
        let mut out = Vec::new();
        import_file(&mut other, &file, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "Successfully imported 2 words.\n");
        assert_eq!(other.list_words()?, db.list_words()?);
        Ok(())
    }

    #[test]
    fn test_sync() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        db.add_word("sol", "sun", Timestamp::now())?;

        let file = dir.path().join("dict.json");
        write(
            &file,
            r#"[{"word":"Sol","meaning":"sun"},{"word":"luna","meaning":"moon"}]"#,
        )?;
        let mut out = Vec::new();
        sync_file(&mut db, &file, &mut out)?;
        assert_eq!(String::from_utf8(out)?, "Added 1 new word.\n");

        let mut out = Vec::new();
        sync_file(&mut db, &file, &mut out)?;
        assert_eq!(
            String::from_utf8(out)?,
            "Your dictionary is already up to date.\n"
        );
        Ok(())
    }

    #[test]
    fn test_invalid_files() -> Fallible<()> {
        let dir = tempdir()?;
        let mut db = Database::new(&dir.path().join("words.db"))?;
        let mut out = Vec::new();

        let missing = dir.path().join("missing.json");
        assert!(import_file(&mut db, &missing, &mut out).is_err());

        let bad = dir.path().join("bad.json");
        write(&bad, r#"{"version":1}"#)?;
        let err = sync_file(&mut db, &bad, &mut out).unwrap_err();
        assert_eq!(err.to_string(), "error: Invalid dictionary format.");
        Ok(())
    }
}
