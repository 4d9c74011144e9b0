// Library root
// -----------
// The binary (`main.rs`) parses flags and hands an API client and a
// console to `ui::play`. Everything else lives here so it can be tested
// without a network or a terminal.
//
// Module responsibilities:
// - `api`: HTTP calls to the Open Trivia Database behind a `Transport`.
// - `models`: categories, questions and the validated query parameters.
// - `error`: the `QuizError` taxonomy.
// - `input`: the `Console` handle and the bounded answer prompt.
// - `quiz`: presentation lists, answer checking and the session loop.
// - `ui`: category selection, banners and the overall flow.
pub mod api;
pub mod error;
pub mod input;
pub mod models;
pub mod quiz;
pub mod ui;

pub use api::{ApiClient, HttpTransport, QuestionQuery, Transport};
pub use error::QuizError;
pub use input::{read_bounded_integer, Console, LineSource, ReaderInput, TerminalInput};
pub use models::{Category, Difficulty, Question, QuestionCount};
pub use quiz::{check_answer_correct, run_session, Presentation, QuizSession, Score, SessionState};
pub use ui::{play, render_categories, select_category, QuizOptions};
