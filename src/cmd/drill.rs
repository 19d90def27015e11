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

//! Drilling words in the terminal.

use std::io::BufRead;
use std::io::Write;

use kalidict_core::Phase;
use kalidict_core::Prompt;
use kalidict_core::QuizMode;
use kalidict_core::Session;
use kalidict_core::SessionConfig;
use kalidict_core::TinyRng;
use kalidict_core::Word;
use kalidict_core::answer_multiple_choice;
use kalidict_core::answer_written;
use kalidict_core::load_next_prompt;
use kalidict_core::start_session;

use crate::error::Fallible;

pub struct DrillConfig {
    pub question_limit: usize,
    pub mode: QuizMode,
    pub seed: u64,
}

/// Run a drill session over `words`, reading answers from `input`. Returns
/// the last session, which is incomplete if the input ran out.
pub fn run_drill(
    words: Vec<Word>,
    config: DrillConfig,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Fallible<Session> {
    let mut rng = TinyRng::from_seed(config.seed);
    let mut session = start_session(
        SessionConfig {
            words,
            question_limit: config.question_limit,
            mode: config.mode,
        },
        &mut rng,
    );
    if session.test_complete {
        writeln!(out, "No words to drill. Add some words first.")?;
        return Ok(session);
    }

    while !session.test_complete {
        let Some(prompt) = session.current_prompt.clone() else {
            break;
        };
        write_prompt(&session, &prompt, out)?;

        session = match read_answer(&session, &prompt, input, out)? {
            Some(answered) => answered,
            None => {
                writeln!(out)?;
                writeln!(out, "Session ended early.")?;
                return Ok(session);
            }
        };
        write_feedback(&session, out)?;

        let next = load_next_prompt(&session, &mut rng);
        if next.phase == Phase::Review && session.phase == Phase::Initial {
            writeln!(out)?;
            writeln!(out, "Let's review the {} word(s) you missed.", next.review_total)?;
        }
        session = next;
    }

    write_summary(&session, out)?;
    Ok(session)
}

fn write_prompt(session: &Session, prompt: &Prompt, out: &mut impl Write) -> Fallible<()> {
    let progress = session.progress();
    let label = match progress.phase {
        Phase::Initial => "Question",
        Phase::Review => "Review",
    };
    writeln!(out)?;
    writeln!(out, "{label} {}/{}", progress.position, progress.total)?;
    writeln!(out, "{}", prompt.description())?;
    writeln!(out, "  {}", prompt.text())?;
    if let Prompt::MultipleChoice(mc) = prompt {
        for (index, choice) in mc.options.iter().enumerate() {
            writeln!(out, "  {}) {}", index + 1, choice.label)?;
        }
    }
    Ok(())
}

/// Keep asking until the engine accepts an answer. `None` means the input
/// is exhausted.
fn read_answer(
    session: &Session,
    prompt: &Prompt,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Fallible<Option<Session>> {
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let answered = match prompt {
            Prompt::MultipleChoice(mc) => {
                let choice = line
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| mc.options.get(i));
                match choice {
                    Some(choice) => answer_multiple_choice(session, choice),
                    None => {
                        writeln!(
                            out,
                            "Please enter a number between 1 and {}.",
                            mc.options.len()
                        )?;
                        continue;
                    }
                }
            }
            Prompt::Written(_) => {
                answer_written(session, line.trim_end_matches(['\r', '\n']))
            }
        };
        if answered.question_answered {
            return Ok(Some(answered));
        }
    }
}

fn write_feedback(session: &Session, out: &mut impl Write) -> Fallible<()> {
    match session.similarity_score {
        Some(score) => writeln!(out, "{} ({score}% match)", session.answer_feedback)?,
        None => writeln!(out, "{}", session.answer_feedback)?,
    }
    if !session.is_correct {
        writeln!(out, "The answer was: {}", session.correct_answer)?;
    }
    Ok(())
}

fn write_summary(session: &Session, out: &mut impl Write) -> Fallible<()> {
    writeln!(out)?;
    writeln!(out, "Session complete!")?;
    writeln!(out, "Score: {}/{}", session.score, session.total_questions)?;
    if session.review_total > 0 {
        writeln!(out, "Reviewed {} missed word(s).", session.review_total)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn drill(words: Vec<Word>, mode: QuizMode, input: &str) -> Fallible<(Session, String)> {
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        let session = run_drill(
            words,
            DrillConfig {
                question_limit: 10,
                mode,
                seed: 42,
            },
            &mut input,
            &mut out,
        )?;
        Ok((session, String::from_utf8(out)?))
    }

    #[test]
    fn test_empty_dictionary() -> Fallible<()> {
        let (session, out) = drill(vec![], QuizMode::MultipleChoice, "")?;
        assert!(session.test_complete);
        assert_eq!(out, "No words to drill. Add some words first.\n");
        Ok(())
    }

    #[test]
    fn test_multiple_choice_session() -> Fallible<()> {
        let words = vec![Word::new(1, "sol", "sun")];
        let (session, out) = drill(words, QuizMode::MultipleChoice, "7\nabc\n1\n")?;
        assert!(session.test_complete);
        assert!(out.contains("Question 1/1\nWhat is the meaning of:\n  sol\n  1) sun\n"));
        assert!(out.contains("Please enter a number between 1 and 1."));
        assert!(out.contains("Great job!"));
        assert!(out.contains("Score: 1/1"));
        assert!(!out.contains("Reviewed"));
        Ok(())
    }

    #[test]
    fn test_written_session_with_review() -> Fallible<()> {
        let words = vec![Word::new(1, "ocean", "a large body of salt water")];
        let (session, out) = drill(words, QuizMode::Written, "\nocaen\nOcean.\n")?;
        assert!(session.test_complete);
        assert_eq!(session.score, 0);
        assert!(out.contains("Type the word for this meaning:\n  a large body of salt water\n"));
        assert!(out.contains("Keep practicing that spelling. (60% match)\nThe answer was: ocean\n"));
        assert!(out.contains("Let's review the 1 word(s) you missed."));
        assert!(out.contains("Review 1/1"));
        assert!(out.contains("Perfect! (100% match)"));
        assert!(out.contains("Score: 0/1\nReviewed 1 missed word(s).\n"));
        Ok(())
    }

    #[test]
    fn test_written_answers_with_line_endings() -> Fallible<()> {
        let words = vec![Word::new(1, "café", "coffee")];
        let (session, out) = drill(words, QuizMode::Written, "Cafe!\r\n")?;
        assert!(session.test_complete);
        assert_eq!(session.score, 1);
        assert!(out.contains("Perfect! (100% match)"));
        assert!(out.contains("Score: 1/1\n"));
        Ok(())
    }

    #[test]
    fn test_input_runs_out() -> Fallible<()> {
        let words = vec![Word::new(1, "sol", "sun"), Word::new(2, "luna", "moon")];
        let (session, out) = drill(words, QuizMode::Written, "")?;
        assert!(!session.test_complete);
        assert!(out.ends_with("Session ended early.\n"));
        Ok(())
    }
}
