// Error taxonomy for the quiz client.
// Validation and transport failures propagate to `main`; bad interactive
// input never reaches this type except when the input loop itself gives up.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("Difficulty can only be easy, medium or hard (got `{0}`).")]
    InvalidDifficulty(String),

    #[error("Quiz can only have 1 - 10 questions (got `{0}`).")]
    InvalidCount(String),

    #[error("request to {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("unexpected response format: {0}")]
    DataFormat(String),

    #[error("trivia API rejected the request (code {code}): {reason}")]
    Api { code: u8, reason: &'static str },

    #[error("input closed before a valid answer was given")]
    Cancelled,

    #[error("gave up after {attempts} invalid inputs")]
    RetriesExhausted { attempts: u32 },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl QuizError {
    /// Build the `Api` variant from an Open Trivia DB `response_code`.
    pub fn from_response_code(code: u8) -> Self {
        let reason = match code {
            1 => "not enough questions for this category and difficulty",
            2 => "invalid parameter",
            3 => "session token not found",
            4 => "session token exhausted",
            5 => "rate limited, try again in a few seconds",
            _ => "unknown response code",
        };
        QuizError::Api { code, reason }
    }
}
