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

//! The quiz session state machine.
//!
//! A session first asks every selected word once (the initial phase), then
//! asks the words missed during that pass one more time (the review phase),
//! then completes. Every transition takes a session by reference and returns
//! a new one; the caller keeps whichever value is current.

use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;

use crate::prompt::Choice;
use crate::prompt::Prompt;
use crate::prompt::QuizMode;
use crate::prompt::create_prompt;
use crate::prompt::resolve_question_type;
use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::similarity::normalize;
use crate::similarity::similarity;
use crate::types::word::Word;

/// Written answers at least this similar to the expected word are correct.
pub const CORRECT_THRESHOLD: f64 = 0.95;

/// Written answers at least this similar get the "close" feedback.
pub const CLOSE_THRESHOLD: f64 = 0.80;

pub const FEEDBACK_CHOICE_CORRECT: &str = "Great job!";
pub const FEEDBACK_CHOICE_WRONG: &str = "Not quite. Keep practicing!";
pub const FEEDBACK_WRITTEN_PERFECT: &str = "Perfect!";
pub const FEEDBACK_WRITTEN_CLOSE: &str = "Close! Double-check the spelling.";
pub const FEEDBACK_WRITTEN_WRONG: &str = "Keep practicing that spelling.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initial,
    Review,
}

pub struct SessionConfig {
    /// The word pool. Also the source of distractors for the whole session.
    pub words: Vec<Word>,
    /// The maximum number of words asked in the initial phase.
    pub question_limit: usize,
    pub mode: QuizMode,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub mode: QuizMode,
    /// Snapshot of the pool taken at start. Never changes.
    pub word_bank: Arc<[Word]>,
    /// Words still to ask in this phase. The next word is the last one.
    pub remaining_words: Vec<Word>,
    pub phase: Phase,
    /// Words answered wrong in the initial phase, without duplicates.
    pub missed_words: Vec<Word>,
    pub total_questions: usize,
    pub review_total: usize,
    /// Correct answers in the initial phase.
    pub score: usize,

    pub current_prompt: Option<Prompt>,
    pub correct_answer: String,
    pub question_answered: bool,
    pub selected_option_id: Option<String>,
    /// Rounded percentage, written answers only.
    pub similarity_score: Option<u32>,
    pub is_correct: bool,
    pub answer_feedback: String,

    pub test_complete: bool,
}

/// Where the user is within the current phase. Counting restarts when the
/// review phase begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub phase: Phase,
    /// 1-based index of the current question.
    pub position: usize,
    pub total: usize,
}

impl Session {
    pub fn progress(&self) -> Progress {
        let total = match self.phase {
            Phase::Initial => self.total_questions,
            Phase::Review => self.review_total,
        };
        Progress {
            phase: self.phase,
            position: total.saturating_sub(self.remaining_words.len()),
            total,
        }
    }

    /// Look up a choice of the current prompt by id.
    pub fn choice(&self, id: &str) -> Option<&Choice> {
        match &self.current_prompt {
            Some(Prompt::MultipleChoice(prompt)) => prompt.options.iter().find(|o| o.id == id),
            _ => None,
        }
    }

    /// The current prompt, if it still accepts an answer.
    fn open_prompt(&self) -> Option<&Prompt> {
        if self.question_answered {
            return None;
        }
        self.current_prompt.as_ref()
    }

    fn reset_question_state(&self) -> Session {
        Session {
            question_answered: false,
            selected_option_id: None,
            similarity_score: None,
            is_correct: false,
            answer_feedback: String::new(),
            ..self.clone()
        }
    }

    /// Apply the scoring rules shared by both question types. Only the
    /// initial phase counts towards the score or queues words for review.
    fn record_outcome(&self, is_correct: bool, word: &Word) -> Session {
        let mut next = self.clone();
        if self.phase == Phase::Initial {
            if is_correct {
                next.score += 1;
            } else if !next.missed_words.iter().any(|w| w.id == word.id) {
                next.missed_words.push(word.clone());
            }
        }
        next.question_answered = true;
        next.is_correct = is_correct;
        next
    }
}

/// Pick up to `question_limit` words at random and load the first question.
pub fn start_session(config: SessionConfig, rng: &mut TinyRng) -> Session {
    let SessionConfig {
        words,
        question_limit,
        mode,
    } = config;
    let total_questions = question_limit.min(words.len());
    let mut remaining_words = shuffle(words.clone(), rng);
    remaining_words.truncate(total_questions);
    log::debug!("Starting {mode} session with {total_questions} of {} words", words.len());

    let session = Session {
        mode,
        word_bank: Arc::from(words),
        remaining_words,
        phase: Phase::Initial,
        missed_words: Vec::new(),
        total_questions,
        review_total: 0,
        score: 0,
        current_prompt: None,
        correct_answer: String::new(),
        question_answered: false,
        selected_option_id: None,
        similarity_score: None,
        is_correct: false,
        answer_feedback: String::new(),
        test_complete: total_questions == 0,
    };
    load_next_prompt(&session, rng)
}

/// Move on to the next question, entering the review phase or completing
/// the session when the current phase runs out of words.
pub fn load_next_prompt(session: &Session, rng: &mut TinyRng) -> Session {
    let mut next = session.reset_question_state();

    if next.remaining_words.is_empty()
        && next.phase == Phase::Initial
        && !next.missed_words.is_empty()
    {
        log::debug!("Reviewing {} missed words", next.missed_words.len());
        next.phase = Phase::Review;
        next.review_total = next.missed_words.len();
        next.remaining_words = shuffle(next.missed_words.clone(), rng);
    }

    match next.remaining_words.pop() {
        Some(word) => {
            let question_type = resolve_question_type(next.mode, rng);
            let prompt = create_prompt(&word, question_type, &next.word_bank, rng);
            Session {
                correct_answer: prompt.correct_response().to_string(),
                current_prompt: Some(prompt),
                test_complete: false,
                ..next
            }
        }
        None => {
            log::debug!("Session complete with score {}/{}", next.score, next.total_questions);
            Session {
                current_prompt: None,
                correct_answer: String::new(),
                test_complete: true,
                ..next
            }
        }
    }
}

/// Answer the current multiple-choice question. Does nothing when there is
/// no open multiple-choice question.
pub fn answer_multiple_choice(session: &Session, choice: &Choice) -> Session {
    let Some(Prompt::MultipleChoice(prompt)) = session.open_prompt() else {
        return session.clone();
    };
    let next = session.record_outcome(choice.is_correct, &prompt.source_word);
    Session {
        selected_option_id: Some(choice.id.clone()),
        answer_feedback: if choice.is_correct {
            FEEDBACK_CHOICE_CORRECT
        } else {
            FEEDBACK_CHOICE_WRONG
        }
        .to_string(),
        ..next
    }
}

/// Answer the current multiple-choice question by choice id. Unknown ids
/// are ignored.
pub fn answer_choice_by_id(session: &Session, id: &str) -> Session {
    match session.choice(id) {
        Some(choice) => answer_multiple_choice(session, &choice.clone()),
        None => session.clone(),
    }
}

/// Answer the current written question. Does nothing when there is no open
/// written question, or when the answer is blank after normalization.
pub fn answer_written(session: &Session, raw_answer: &str) -> Session {
    let Some(Prompt::Written(prompt)) = session.open_prompt() else {
        return session.clone();
    };
    let answer = normalize(raw_answer);
    if answer.is_empty() {
        return session.clone();
    }

    let score = similarity(&answer, &prompt.normalized_correct);
    let is_correct = score >= CORRECT_THRESHOLD;
    let feedback = if is_correct {
        FEEDBACK_WRITTEN_PERFECT
    } else if score >= CLOSE_THRESHOLD {
        FEEDBACK_WRITTEN_CLOSE
    } else {
        FEEDBACK_WRITTEN_WRONG
    };

    let next = session.record_outcome(is_correct, &prompt.source_word);
    Session {
        similarity_score: Some((score * 100.0).round() as u32),
        answer_feedback: feedback.to_string(),
        ..next
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::Fallible;
    use crate::types::word::WordId;

    fn words(n: i64) -> Vec<Word> {
        (1..=n)
            .map(|i| Word::new(i, format!("word{i}"), format!("meaning{i}")))
            .collect()
    }

    fn start(words: Vec<Word>, question_limit: usize, mode: QuizMode, seed: u64) -> Session {
        let mut rng = TinyRng::from_seed(seed);
        start_session(
            SessionConfig {
                words,
                question_limit,
                mode,
            },
            &mut rng,
        )
    }

    fn current_word_id(session: &Session) -> WordId {
        session.current_prompt.as_ref().unwrap().source_word().id
    }

    fn answer_right(session: &Session) -> Session {
        match session.current_prompt.as_ref().unwrap() {
            Prompt::MultipleChoice(p) => {
                let choice = p.options.iter().find(|o| o.is_correct).unwrap().clone();
                answer_multiple_choice(session, &choice)
            }
            Prompt::Written(p) => answer_written(session, &p.correct_response.clone()),
        }
    }

    fn answer_wrong(session: &Session) -> Session {
        match session.current_prompt.as_ref().unwrap() {
            Prompt::MultipleChoice(p) => {
                let choice = p.options.iter().find(|o| !o.is_correct).unwrap().clone();
                answer_multiple_choice(session, &choice)
            }
            Prompt::Written(_) => answer_written(session, "zzzzzzzz"),
        }
    }

    #[test]
    fn test_empty_pool_completes_immediately() {
        let session = start(vec![], 10, QuizMode::MultipleChoice, 1);
        assert!(session.test_complete);
        assert!(session.current_prompt.is_none());
        assert_eq!(session.total_questions, 0);
        assert_eq!(session.correct_answer, "");
    }

    #[test]
    fn test_limit_larger_than_pool() {
        let mut rng = TinyRng::from_seed(4);
        let mut session = start(words(5), 10, QuizMode::MultipleChoice, 4);
        assert_eq!(session.total_questions, 5);

        let mut asked = HashSet::new();
        for _ in 0..5 {
            assert_eq!(session.phase, Phase::Initial);
            assert!(!session.test_complete);
            asked.insert(current_word_id(&session));
            session = load_next_prompt(&answer_right(&session), &mut rng);
        }
        assert_eq!(asked.len(), 5);
        assert!(session.test_complete);
        assert_eq!(session.score, 5);
        assert_eq!(session.phase, Phase::Initial);
    }

    #[test]
    fn test_limit_smaller_than_pool() {
        let session = start(words(10), 3, QuizMode::Written, 9);
        assert_eq!(session.total_questions, 3);
        assert_eq!(session.remaining_words.len(), 2);
        assert_eq!(session.word_bank.len(), 10);
    }

    #[test]
    fn test_missed_word_is_reviewed_once() {
        let mut rng = TinyRng::from_seed(21);
        let session = start(words(3), 3, QuizMode::Written, 21);

        let missed_id = current_word_id(&session);
        let session = load_next_prompt(&answer_wrong(&session), &mut rng);
        let session = load_next_prompt(&answer_right(&session), &mut rng);
        let session = answer_right(&session);
        assert_eq!(session.score, 2);
        assert_eq!(session.missed_words.len(), 1);

        let session = load_next_prompt(&session, &mut rng);
        assert_eq!(session.phase, Phase::Review);
        assert_eq!(session.review_total, 1);
        assert_eq!(current_word_id(&session), missed_id);
        assert!(!session.test_complete);

        let session = answer_right(&session);
        assert!(session.is_correct);
        assert_eq!(session.score, 2);

        let session = load_next_prompt(&session, &mut rng);
        assert!(session.test_complete);
        assert!(session.current_prompt.is_none());
    }

    #[test]
    fn test_review_misses_are_not_requeued() {
        let mut rng = TinyRng::from_seed(3);
        let session = start(words(2), 1, QuizMode::Written, 3);
        let session = load_next_prompt(&answer_wrong(&session), &mut rng);
        assert_eq!(session.phase, Phase::Review);

        let session = answer_wrong(&session);
        assert_eq!(session.missed_words.len(), 1);
        let session = load_next_prompt(&session, &mut rng);
        assert!(session.test_complete);
        assert_eq!(session.phase, Phase::Review);
    }

    #[test]
    fn test_missed_word_recorded_once() {
        let session = start(words(2), 2, QuizMode::Written, 8);
        let once = answer_wrong(&session);
        let reopened = Session {
            question_answered: false,
            ..once.clone()
        };
        let twice = answer_wrong(&reopened);
        assert_eq!(twice.missed_words.len(), 1);
    }

    #[test]
    fn test_answered_question_ignores_more_answers() {
        let session = start(words(4), 4, QuizMode::MultipleChoice, 6);
        let answered = answer_wrong(&session);
        let again = answer_right(&answered);
        assert_eq!(again, answered);
        assert!(!again.is_correct);
        assert_eq!(again.score, 0);
    }

    #[test]
    fn test_wrong_answer_type_is_ignored() {
        let mc = start(words(4), 4, QuizMode::MultipleChoice, 6);
        assert_eq!(answer_written(&mc, "word1"), mc);

        let written = start(words(4), 4, QuizMode::Written, 6);
        let choice = Choice {
            id: "correct-1".to_string(),
            label: "meaning1".to_string(),
            is_correct: true,
        };
        assert_eq!(answer_multiple_choice(&written, &choice), written);
    }

    #[test]
    fn test_answer_after_completion_is_ignored() {
        let session = start(vec![], 5, QuizMode::Written, 1);
        assert_eq!(answer_written(&session, "anything"), session);
        assert_eq!(answer_choice_by_id(&session, "correct-1"), session);
    }

    #[test]
    fn test_multiple_choice_answer_fields() {
        let session = start(words(4), 4, QuizMode::MultipleChoice, 12);
        let answered = answer_right(&session);
        assert!(answered.question_answered);
        assert!(answered.is_correct);
        assert_eq!(answered.answer_feedback, "Great job!");
        assert_eq!(answered.score, 1);
        let id = answered.selected_option_id.clone().unwrap();
        assert!(id.starts_with("correct-"));
        assert!(answered.similarity_score.is_none());

        let wrong = answer_wrong(&session);
        assert!(!wrong.is_correct);
        assert_eq!(wrong.answer_feedback, "Not quite. Keep practicing!");
        assert_eq!(wrong.score, 0);
        assert!(wrong.selected_option_id.unwrap().starts_with("incorrect-"));
    }

    #[test]
    fn test_answer_choice_by_id() {
        let session = start(words(4), 4, QuizMode::MultipleChoice, 12);
        assert_eq!(answer_choice_by_id(&session, "nope"), session);

        let id = format!("correct-{}", current_word_id(&session));
        let answered = answer_choice_by_id(&session, &id);
        assert!(answered.is_correct);
        assert_eq!(answered.selected_option_id, Some(id));
    }

    #[test]
    fn test_written_answers() {
        let ocean = vec![Word::new(1, "ocean", "a large body of salt water")];
        let session = start(ocean, 1, QuizMode::Written, 1);
        assert_eq!(session.correct_answer, "ocean");

        let perfect = answer_written(&session, "Ocean!");
        assert!(perfect.is_correct);
        assert_eq!(perfect.similarity_score, Some(100));
        assert_eq!(perfect.answer_feedback, "Perfect!");
        assert_eq!(perfect.score, 1);

        let swapped = answer_written(&session, "ocaen");
        assert!(!swapped.is_correct);
        assert_eq!(swapped.similarity_score, Some(60));
        assert_eq!(swapped.answer_feedback, "Keep practicing that spelling.");
        assert_eq!(swapped.missed_words.len(), 1);

        let close = answer_written(&session, "oceans");
        assert!(!close.is_correct);
        assert_eq!(close.similarity_score, Some(83));
        assert_eq!(close.answer_feedback, "Close! Double-check the spelling.");

        let blank = answer_written(&session, "   ");
        assert!(!blank.question_answered);
        assert_eq!(blank, session);
        assert_eq!(answer_written(&session, ""), session);
        assert_eq!(answer_written(&session, "?!"), session);
    }

    #[test]
    fn test_transitions_leave_input_untouched() {
        let mut rng = TinyRng::from_seed(5);
        let session = start(words(3), 3, QuizMode::Written, 5);
        let before = session.clone();
        let answered = answer_wrong(&session);
        let _ = load_next_prompt(&answered, &mut rng);
        assert_eq!(session, before);
        assert!(!session.question_answered);
        assert!(session.missed_words.is_empty());
    }

    #[test]
    fn test_next_prompt_resets_question_state() {
        let mut rng = TinyRng::from_seed(5);
        let session = start(words(3), 3, QuizMode::Written, 5);
        let next = load_next_prompt(&answer_written(&session, "wordz"), &mut rng);
        assert!(!next.question_answered);
        assert!(!next.is_correct);
        assert!(next.similarity_score.is_none());
        assert!(next.selected_option_id.is_none());
        assert_eq!(next.answer_feedback, "");
    }

    #[test]
    fn test_word_bank_is_shared_snapshot() {
        let mut rng = TinyRng::from_seed(5);
        let session = start(words(6), 2, QuizMode::MultipleChoice, 5);
        let next = load_next_prompt(&answer_right(&session), &mut rng);
        assert!(Arc::ptr_eq(&session.word_bank, &next.word_bank));
        assert_eq!(next.word_bank.len(), 6);
    }

    #[test]
    fn test_progress_resets_for_review() {
        let mut rng = TinyRng::from_seed(17);
        let session = start(words(3), 3, QuizMode::Written, 17);
        assert_eq!(
            session.progress(),
            Progress {
                phase: Phase::Initial,
                position: 1,
                total: 3
            }
        );
        let session = load_next_prompt(&answer_wrong(&session), &mut rng);
        assert_eq!(session.progress().position, 2);
        let session = load_next_prompt(&answer_wrong(&session), &mut rng);
        let session = load_next_prompt(&answer_right(&session), &mut rng);
        assert_eq!(
            session.progress(),
            Progress {
                phase: Phase::Review,
                position: 1,
                total: 2
            }
        );
    }

    #[test]
    fn test_mixed_mode_varies_question_types() {
        let mut rng = TinyRng::from_seed(33);
        let mut session = start(words(40), 40, QuizMode::Mixed, 33);
        let mut types = HashSet::new();
        while !session.test_complete {
            types.insert(session.current_prompt.as_ref().unwrap().question_type());
            session = load_next_prompt(&answer_right(&session), &mut rng);
        }
        assert_eq!(types.len(), 2);
        assert_eq!(session.score, 40);
    }

    #[test]
    fn test_session_json_keys() -> Fallible<()> {
        let session = start(words(2), 2, QuizMode::Written, 2);
        let json = serde_json::to_value(&session)?;
        assert_eq!(json["phase"], "initial");
        assert_eq!(json["mode"], "written");
        assert_eq!(json["testComplete"], false);
        assert_eq!(json["currentPrompt"]["type"], "written");
        Ok(())
    }
}
