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

//! kalidict-core: the vocabulary drill engine.
//!
//! This library is WASM-compatible and provides:
//! - Answer normalization and edit-distance similarity
//! - Multiple-choice and written prompt generation
//! - The quiz session state machine (initial pass, then one review pass)
//! - The word store interface, import policies and JSON transfer

pub mod dictionary;
pub mod error;
pub mod prompt;
pub mod rng;
pub mod session;
pub mod similarity;
pub mod transfer;
pub mod types;

// Re-exports for convenience
pub use dictionary::{ImportPolicy, MemoryStore, WordStore};
pub use error::{ErrorReport, Fallible, fail};
pub use prompt::{Choice, Prompt, QuestionType, QuizMode};
pub use rng::TinyRng;
pub use session::{
    Phase, Progress, Session, SessionConfig, answer_choice_by_id, answer_multiple_choice,
    answer_written, load_next_prompt, start_session,
};
pub use types::date::Date;
pub use types::timestamp::Timestamp;
pub use types::word::{IncomingWord, Word, WordId};
