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

use std::io::stdin;
use std::io::stdout;
use std::path::PathBuf;
use std::process::exit;

use clap::Parser;
use clap::Subcommand;
use kalidict_core::QuizMode;
use kalidict_core::TinyRng;
use kalidict_core::WordId;
use kalidict_core::WordStore;
use tokio::spawn;

use crate::cmd::drill::DrillConfig;
use crate::cmd::drill::run_drill;
use crate::cmd::serve::server::ServeConfig;
use crate::cmd::serve::server::start_server;
use crate::cmd::transfer::export_file;
use crate::cmd::transfer::import_file;
use crate::cmd::transfer::sync_file;
use crate::cmd::words::add_word;
use crate::cmd::words::delete_word;
use crate::cmd::words::list_words;
use crate::cmd::words::random_word;
use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::utils::clock_seed;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. By default, kalidict.toml in the current working directory is used if present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Path to the word database. Overrides the configuration file.
    #[arg(long, global = true)]
    database: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the words in the dictionary.
    List {
        /// Only show words whose word or meaning contains this text.
        #[arg(long)]
        search: Option<String>,
    },
    /// Add a word to the dictionary.
    Add { word: String, meaning: String },
    /// Delete a word by id.
    Delete { id: WordId },
    /// Show a random word and its meaning.
    Random,
    /// Replace the dictionary with the words in a JSON file.
    Import { file: PathBuf },
    /// Add the words in a JSON file that are not in the dictionary yet.
    Sync { file: PathBuf },
    /// Export the dictionary to a JSON file.
    Export {
        /// Path to the output file. By default, a dated file in the current working directory.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Drill words in the terminal.
    Drill {
        /// Maximum number of words to ask. Must be at least 1.
        #[arg(long, value_parser = parse_question_limit)]
        limit: Option<usize>,
        /// One of multiple-choice, written, or mixed.
        #[arg(long)]
        mode: Option<QuizMode>,
        /// Seed for the word shuffler. By default, taken from the clock.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve a directory of static files, such as the browser app.
    Serve {
        /// The directory to serve. Default is the configured static_dir.
        directory: Option<PathBuf>,
        /// The host address to bind to.
        #[arg(long)]
        host: Option<String>,
        /// The port to use for the web server.
        #[arg(long)]
        port: Option<u16>,
        /// Whether to open the browser automatically. Default is false.
        #[arg(long)]
        open_browser: Option<bool>,
    },
}

fn parse_question_limit(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(limit) => Ok(limit),
        Err(e) => Err(e.to_string()),
    }
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let database = cli.database.unwrap_or_else(|| config.database.clone());
    let mut out = stdout().lock();
    match cli.command {
        Command::List { search } => {
            let db = Database::new(&database)?;
            list_words(&db, search.as_deref(), &mut out)
        }
        Command::Add { word, meaning } => {
            let mut db = Database::new(&database)?;
            add_word(&mut db, &word, &meaning, &mut out)
        }
        Command::Delete { id } => {
            let mut db = Database::new(&database)?;
            delete_word(&mut db, id, &mut out)
        }
        Command::Random => {
            let db = Database::new(&database)?;
            let mut rng = TinyRng::from_seed(clock_seed());
            random_word(&db, &mut rng, &mut out)
        }
        Command::Import { file } => {
            let mut db = Database::new(&database)?;
            import_file(&mut db, &file, &mut out)
        }
        Command::Sync { file } => {
            let mut db = Database::new(&database)?;
            sync_file(&mut db, &file, &mut out)
        }
        Command::Export { output } => {
            let db = Database::new(&database)?;
            export_file(&db, output, &mut out)
        }
        Command::Drill { limit, mode, seed } => {
            let db = Database::new(&database)?;
            let drill = DrillConfig {
                question_limit: limit.unwrap_or(config.question_limit),
                mode: mode.unwrap_or(config.mode),
                seed: seed.unwrap_or_else(clock_seed),
            };
            let mut input = stdin().lock();
            run_drill(db.list_words()?, drill, &mut input, &mut out)?;
            Ok(())
        }
        Command::Serve {
            directory,
            host,
            port,
            open_browser,
        } => {
            drop(out);
            let host = host.unwrap_or(config.host);
            let port = port.unwrap_or(config.port);
            if open_browser.unwrap_or(false) {
                // Open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            start_server(ServeConfig {
                directory: directory.unwrap_or(config.static_dir),
                host,
                port,
            })
            .await
        }
    }
}
