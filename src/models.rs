// Plain records parsed from the trivia API plus the two validated query
// parameters (difficulty and question count).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// A named grouping of questions, identified by the API's numeric ID.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u32,
    pub name: String,
}

/// One trivia question as returned by `api.php`. The API sends extra
/// fields (`type`, `difficulty`, `category`) which are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Question {
    #[serde(rename = "question")]
    pub prompt: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl Question {
    pub fn new(
        prompt: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
        }
    }

    /// The API encodes every text field with HTML entities by default.
    pub(crate) fn decoded(self) -> Self {
        Self {
            prompt: decode_entities(&self.prompt),
            correct_answer: decode_entities(&self.correct_answer),
            incorrect_answers: self
                .incorrect_answers
                .iter()
                .map(|a| decode_entities(a))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| QuizError::InvalidDifficulty(s.to_string()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of questions requested in one batch, always within
/// `QuestionCount::MIN..=QuestionCount::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionCount(u8);

impl QuestionCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(count: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&count).then_some(Self(count))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for QuestionCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl FromStr for QuestionCount {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(QuestionCount::new)
            .ok_or_else(|| QuizError::InvalidCount(s.to_string()))
    }
}

impl fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decode the HTML entities the trivia API emits. Unknown or malformed
/// entities are left untouched.
fn decode_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}
