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

//! Building questions from words.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::rng::TinyRng;
use crate::rng::sample;
use crate::rng::shuffle;
use crate::similarity::normalize;
use crate::types::word::Word;

/// The maximum number of wrong meanings shown next to the right one.
pub const DISTRACTOR_COUNT: usize = 3;

const MULTIPLE_CHOICE_DESCRIPTION: &str = "What is the meaning of:";
const WRITTEN_DESCRIPTION: &str = "Type the word for this meaning:";

/// The kind of a single question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    Written,
}

/// The kind of questions a session asks. Fixed when the session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizMode {
    #[default]
    MultipleChoice,
    Written,
    /// Every question flips a coin between the other two.
    Mixed,
}

impl Display for QuizMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizMode::MultipleChoice => write!(f, "multiple-choice"),
            QuizMode::Written => write!(f, "written"),
            QuizMode::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for QuizMode {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple-choice" => Ok(QuizMode::MultipleChoice),
            "written" => Ok(QuizMode::Written),
            "mixed" => Ok(QuizMode::Mixed),
            _ => Err(ErrorReport::new(format!(
                "unknown quiz mode '{s}' (expected multiple-choice, written, or mixed)"
            ))),
        }
    }
}

/// One candidate answer of a multiple-choice question.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: String,
    /// A meaning.
    pub label: String,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultipleChoicePrompt {
    pub description: String,
    /// The word whose meaning is asked for.
    pub question: String,
    pub options: Vec<Choice>,
    pub correct_response: String,
    pub source_word: Word,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WrittenPrompt {
    pub description: String,
    /// The meaning the user has to find the word for.
    pub prompt: String,
    pub correct_response: String,
    pub normalized_correct: String,
    pub source_word: Word,
}

/// A question shown to the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Prompt {
    MultipleChoice(MultipleChoicePrompt),
    Written(WrittenPrompt),
}

impl Prompt {
    pub fn question_type(&self) -> QuestionType {
        match self {
            Prompt::MultipleChoice(_) => QuestionType::MultipleChoice,
            Prompt::Written(_) => QuestionType::Written,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Prompt::MultipleChoice(p) => &p.description,
            Prompt::Written(p) => &p.description,
        }
    }

    /// The text the user is asked about: a word, or a meaning.
    pub fn text(&self) -> &str {
        match self {
            Prompt::MultipleChoice(p) => &p.question,
            Prompt::Written(p) => &p.prompt,
        }
    }

    pub fn correct_response(&self) -> &str {
        match self {
            Prompt::MultipleChoice(p) => &p.correct_response,
            Prompt::Written(p) => &p.correct_response,
        }
    }

    pub fn source_word(&self) -> &Word {
        match self {
            Prompt::MultipleChoice(p) => &p.source_word,
            Prompt::Written(p) => &p.source_word,
        }
    }
}

/// Decide the type of the next question. Mixed mode decides anew each time.
pub fn resolve_question_type(mode: QuizMode, rng: &mut TinyRng) -> QuestionType {
    match mode {
        QuizMode::MultipleChoice => QuestionType::MultipleChoice,
        QuizMode::Written => QuestionType::Written,
        QuizMode::Mixed => {
            if rng.coin_flip() {
                QuestionType::MultipleChoice
            } else {
                QuestionType::Written
            }
        }
    }
}

pub fn create_prompt(
    word: &Word,
    question_type: QuestionType,
    word_pool: &[Word],
    rng: &mut TinyRng,
) -> Prompt {
    match question_type {
        QuestionType::MultipleChoice => {
            Prompt::MultipleChoice(create_multiple_choice_prompt(word, word_pool, rng))
        }
        QuestionType::Written => Prompt::Written(create_written_prompt(word)),
    }
}

/// Ask for the meaning of `correct_word`, with up to three meanings of other
/// words from the pool as distractors.
///
/// Choice ids are only unique within the prompt.
pub fn create_multiple_choice_prompt(
    correct_word: &Word,
    word_pool: &[Word],
    rng: &mut TinyRng,
) -> MultipleChoicePrompt {
    let candidates: Vec<&Word> = word_pool
        .iter()
        .filter(|w| w.id != correct_word.id)
        .collect();
    let distractors = sample(candidates, DISTRACTOR_COUNT, rng);

    let mut options = Vec::with_capacity(distractors.len() + 1);
    options.push(Choice {
        id: format!("correct-{}", correct_word.id),
        label: correct_word.meaning.clone(),
        is_correct: true,
    });
    for (index, w) in distractors.into_iter().enumerate() {
        options.push(Choice {
            id: format!("incorrect-{}-{index}", correct_word.id),
            label: w.meaning.clone(),
            is_correct: false,
        });
    }

    MultipleChoicePrompt {
        description: MULTIPLE_CHOICE_DESCRIPTION.to_string(),
        question: correct_word.word.clone(),
        options: shuffle(options, rng),
        correct_response: correct_word.meaning.clone(),
        source_word: correct_word.clone(),
    }
}

/// Show the meaning and ask for the word.
pub fn create_written_prompt(word: &Word) -> WrittenPrompt {
    WrittenPrompt {
        description: WRITTEN_DESCRIPTION.to_string(),
        prompt: word.meaning.clone(),
        correct_response: word.word.clone(),
        normalized_correct: normalize(&word.word),
        source_word: word.clone(),
    }
}
