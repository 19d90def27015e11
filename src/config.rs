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
use std::path::Path;
use std::path::PathBuf;

use kalidict_core::QuizMode;
use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "kalidict.toml";

/// Settings that can be given in the configuration file. Everything is
/// optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    database: Option<PathBuf>,
    question_limit: Option<usize>,
    mode: Option<QuizMode>,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
pub struct Config {
    /// Path to the SQLite word database.
    pub database: PathBuf,
    /// Number of words asked per drill session.
    pub question_limit: usize,
    pub mode: QuizMode,
    pub host: String,
    pub port: u16,
    /// Directory delivered by `serve`.
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("kalidict.db"),
            question_limit: 10,
            mode: QuizMode::MultipleChoice,
            host: "127.0.0.1".to_string(),
            port: 3000,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl Config {
    /// Load the configuration: defaults, then the configuration file, then
    /// the `PORT` and `KALIDICT_DB` environment variables.
    pub fn load(path: Option<&Path>) -> Fallible<Self> {
        let text = match path {
            Some(path) => {
                if !path.exists() {
                    return fail("configuration file does not exist.");
                }
                Some(read_to_string(path)?)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Some(read_to_string(default)?)
                } else {
                    None
                }
            }
        };
        let config = match text {
            Some(text) => Self::parse(&text)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    fn parse(text: &str) -> Fallible<Self> {
        let file: ConfigFile = toml::from_str(text)?;
        let defaults = Self::default();
        let question_limit = file.question_limit.unwrap_or(defaults.question_limit);
        if question_limit == 0 {
            return fail("question_limit must be at least 1.");
        }
        Ok(Self {
            database: file.database.unwrap_or(defaults.database),
            question_limit,
            mode: file.mode.unwrap_or(defaults.mode),
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            static_dir: file.static_dir.unwrap_or(defaults.static_dir),
        })
    }

    fn with_env(self, var: impl Fn(&str) -> Option<String>) -> Fallible<Self> {
        let port = match var("PORT") {
            Some(port) => match port.trim().parse::<u16>() {
                Ok(port) => port,
                Err(_) => return fail(format!("invalid PORT: '{port}'.")),
            },
            None => self.port,
        };
        let database = var("KALIDICT_DB").map(PathBuf::from).unwrap_or(self.database);
        Ok(Self {
            port,
            database,
            ..self
        })
    }
}
