// Quiz session: shuffles each question's answers into a numbered
// presentation list, checks the chosen number against the correct answer's
// position and keeps score.

use std::io::Write;

use crossterm::style::{style, Color, Stylize};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::QuizError;
use crate::input::{read_bounded_integer, Console, LineSource};
use crate::models::Question;

const THISTLE: Color = Color::Rgb { r: 0xFF, g: 0xD7, b: 0xFF };
const TEAL: Color = Color::Rgb { r: 0x00, g: 0x80, b: 0x80 };
const MINT: Color = Color::Rgb { r: 0x98, g: 0xFF, b: 0x98 };
const CRIMSON: Color = Color::Rgb { r: 0xDC, g: 0x14, b: 0x3C };

/// A question as shown to the player: the prompt and every answer in
/// shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_answer: String,
    correct_position: usize,
}

impl Presentation {
    pub fn build<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Self {
        let mut choices = question.incorrect_answers.clone();
        choices.push(question.correct_answer.clone());
        choices.shuffle(rng);
        // The correct answer was just pushed, so the lookup cannot miss.
        let correct_position =
            correct_position(&choices, &question.correct_answer).unwrap_or(choices.len());
        Presentation {
            prompt: question.prompt.clone(),
            choices,
            correct_answer: question.correct_answer.clone(),
            correct_position,
        }
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// 1-indexed position of the correct answer in `choices`.
    pub fn correct_position(&self) -> usize {
        self.correct_position
    }

    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_position
    }
}

/// 1-indexed position of the first choice equal to `correct_answer`.
pub fn correct_position(choices: &[String], correct_answer: &str) -> Option<usize> {
    choices
        .iter()
        .position(|c| c == correct_answer)
        .map(|i| i + 1)
}

/// Whether `selected` (1-indexed) picks `correct_answer` out of `choices`.
///
/// Answers are compared by text. If the same text appears more than once,
/// only its first occurrence counts as correct.
pub fn check_answer_correct(selected: usize, choices: &[String], correct_answer: &str) -> bool {
    correct_position(choices, correct_answer) == Some(selected)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

impl Score {
    pub fn new(total: usize) -> Self {
        Score { correct: 0, total }
    }

    pub fn record(&mut self, correct: bool) {
        if correct {
            self.correct += 1;
        }
    }

    /// Share of correct answers, truncated to a whole percent.
    pub fn percentage(&self) -> usize {
        if self.total == 0 {
            return 0;
        }
        self.correct * 100 / self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Presenting,
    AwaitingAnswer,
    Scored,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub selected: usize,
    pub correct: bool,
    pub correct_answer: String,
}

/// Walks the question list: `Presenting -> AwaitingAnswer -> Scored`, then
/// on to the next question or `Complete`.
pub struct QuizSession<'q> {
    questions: &'q [Question],
    index: usize,
    state: SessionState,
    current: Option<Presentation>,
    score: Score,
}

impl<'q> QuizSession<'q> {
    pub fn new(questions: &'q [Question]) -> Self {
        let state = if questions.is_empty() {
            SessionState::Complete
        } else {
            SessionState::Presenting
        };
        QuizSession {
            questions,
            index: 0,
            state,
            current: None,
            score: Score::new(questions.len()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 1-indexed number of the question being played.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> Score {
        self.score
    }

    /// Shuffle the current question's answers and wait for a choice. While
    /// already awaiting an answer the same presentation is returned.
    pub fn present<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Presentation> {
        match self.state {
            SessionState::Presenting => {
                let questions = self.questions;
                self.current = Some(Presentation::build(&questions[self.index], rng));
                self.state = SessionState::AwaitingAnswer;
                self.current.as_ref()
            }
            SessionState::AwaitingAnswer => self.current.as_ref(),
            SessionState::Scored | SessionState::Complete => None,
        }
    }

    /// Resolve the current question. Returns `None` unless a presentation
    /// is awaiting an answer.
    pub fn submit(&mut self, selected: usize) -> Option<Outcome> {
        if self.state != SessionState::AwaitingAnswer {
            return None;
        }
        let presentation = self.current.as_ref()?;
        let correct = presentation.is_correct(selected);
        let outcome = Outcome {
            selected,
            correct,
            correct_answer: presentation.correct_answer.clone(),
        };
        self.score.record(correct);
        self.state = SessionState::Scored;
        Some(outcome)
    }

    /// Move past a scored question.
    pub fn advance(&mut self) {
        if self.state != SessionState::Scored {
            return;
        }
        self.index += 1;
        self.current = None;
        self.state = if self.index < self.questions.len() {
            SessionState::Presenting
        } else {
            SessionState::Complete
        };
    }
}

/// Play every question through `console` and print the summary.
pub fn run_session<I, W, R>(
    console: &mut Console<I, W>,
    questions: &[Question],
    rng: &mut R,
) -> Result<Score, QuizError>
where
    I: LineSource,
    W: Write,
    R: Rng + ?Sized,
{
    let mut session = QuizSession::new(questions);
    loop {
        let (number, total) = (session.number(), session.total());
        let choices = match session.present(&mut *rng) {
            Some(presentation) => {
                render_presentation(console, number, total, presentation)?;
                presentation.len()
            }
            None => break,
        };
        let selected = read_bounded_integer(console, choices)?;
        if let Some(outcome) = session.submit(selected) {
            render_outcome(console, &outcome)?;
        }
        session.advance();
    }
    let score = session.score();
    render_summary(console, &score)?;
    Ok(score)
}

fn render_presentation<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    number: usize,
    total: usize,
    presentation: &Presentation,
) -> Result<(), QuizError> {
    console.println("")?;
    console.println(style(format!("Question {number}/{total}")).dim())?;
    console.println(format!(" {}", style(&presentation.prompt).with(THISTLE)))?;
    console.println("")?;
    for (index, choice) in presentation.choices.iter().enumerate() {
        console.println(format!(
            "{} : {}",
            style(index + 1).with(TEAL).bold(),
            choice
        ))?;
    }
    Ok(())
}

fn render_outcome<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    outcome: &Outcome,
) -> Result<(), QuizError> {
    console.println("")?;
    if outcome.correct {
        console.println(style("Correct! You get 1 point!").with(MINT))?;
    } else {
        console.println(style("Nope. No points for you.").with(CRIMSON))?;
        console.println(format!(
            "{} {}",
            style("The correct answer was:").with(THISTLE),
            outcome.correct_answer
        ))?;
    }
    Ok(())
}

fn render_summary<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    score: &Score,
) -> Result<(), QuizError> {
    console.println("")?;
    console.println(format!(
        "You answered {} ({}%) questions correct.",
        style(format!("{}/{}", score.correct, score.total)).with(MINT),
        score.percentage()
    ))?;
    Ok(())
}
