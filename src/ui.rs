// UI layer: the top-level quiz flow plus the category picker.
// Every function takes the `Console` it talks through; nothing writes to
// stdout directly.

use std::io::Write;
use std::time::Duration;

use crossterm::style::{style, Color, Stylize};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use rand::Rng;

use crate::api::{ApiClient, QuestionQuery, Transport};
use crate::error::QuizError;
use crate::input::{Console, LineSource};
use crate::models::{Category, Difficulty, QuestionCount};
use crate::quiz::{run_session, Score};

pub const CATEGORY_PROMPT: &str = "Enter the category ID";
pub const INVALID_CATEGORY: &str = "Please enter a valid category ID.";

const CELL_WIDTH: usize = 40;
const LAVENDER: Color = Color::Rgb { r: 0xE6, g: 0xE6, b: 0xFA };
const LEMON: Color = Color::Rgb { r: 0xFF, g: 0xFA, b: 0xCD };
const SLATE: Color = Color::Rgb { r: 0x5F, g: 0xFF, b: 0xFF };

/// Validated command-line choices for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizOptions {
    pub difficulty: Difficulty,
    pub amount: QuestionCount,
}

impl QuizOptions {
    pub fn parse(difficulty: &str, amount: &str) -> Result<Self, QuizError> {
        Ok(QuizOptions {
            difficulty: difficulty.parse()?,
            amount: amount.parse()?,
        })
    }
}

/// Run a whole session: pick a category, fetch the questions, play them
/// and print the score.
pub fn play<T, I, W, R>(
    api: &ApiClient<T>,
    console: &mut Console<I, W>,
    options: &QuizOptions,
    rng: &mut R,
) -> Result<Score, QuizError>
where
    T: Transport,
    I: LineSource,
    W: Write,
    R: Rng + ?Sized,
{
    render_banner(console, "The Quiztine Chapel")?;
    console.println("")?;
    console.println("Welcome to the Quiz! These are the categories:")?;
    console.println("")?;

    let categories = with_spinner("Fetching categories...", || api.fetch_categories())?;
    render_categories(console, &categories)?;
    let category = select_category(console, &categories)?;

    let query = QuestionQuery {
        category,
        difficulty: options.difficulty,
        amount: options.amount,
    };
    let questions = with_spinner("Fetching questions...", || api.fetch_question_batch(&query))?;

    render_banner(console, "In the name of knowledge, let us begin!")?;
    let score = run_session(console, &questions, rng)?;
    info!(
        "session finished: {}/{} correct",
        score.correct, score.total
    );
    render_banner(
        console,
        "Your pilgrimage of knowledge ends here… until next time!",
    )?;
    Ok(score)
}

/// Show every category as `name (ID: id)` in fixed-width columns.
pub fn render_categories<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    categories: &[Category],
) -> Result<(), QuizError> {
    let columns = (usize::from(console.width()) / CELL_WIDTH).max(1);
    for row in categories.chunks(columns) {
        let mut line = String::new();
        for (i, category) in row.iter().enumerate() {
            let plain_len = format!("{} (ID: {})", category.name, category.id)
                .chars()
                .count();
            line.push_str(&format!(
                "{} (ID: {})",
                category.name,
                style(category.id).with(LEMON).bold()
            ));
            if i + 1 < row.len() {
                line.push_str(&" ".repeat(CELL_WIDTH.saturating_sub(plain_len).max(1)));
            }
        }
        console.println(line)?;
    }
    Ok(())
}

/// Prompt until the player enters the ID of one of `categories`.
pub fn select_category<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    categories: &[Category],
) -> Result<u32, QuizError> {
    let picked = console.retry_until(CATEGORY_PROMPT, INVALID_CATEGORY, |line| {
        let id = line.parse::<u32>().ok()?;
        categories.iter().find(|c| c.id == id)
    })?;
    console.println(format!(
        "\nYou have picked {}.\n",
        style(&picked.name).with(SLATE)
    ))?;
    Ok(picked.id)
}

fn render_banner<I: LineSource, W: Write>(
    console: &mut Console<I, W>,
    title: &str,
) -> Result<(), QuizError> {
    let width = usize::from(console.width());
    let side = width.saturating_sub(title.chars().count() + 2) / 2;
    let rule = "─".repeat(side);
    console.println(format!(
        "{} {} {}",
        style(&rule).dark_grey(),
        style(title).with(LAVENDER).bold(),
        style(&rule).dark_grey()
    ))?;
    Ok(())
}

/// Run `task` while a spinner ticks on stderr.
fn with_spinner<T>(message: &'static str, task: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    let result = task();
    spinner.finish_and_clear();
    result
}
