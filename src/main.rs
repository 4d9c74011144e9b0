// Entrypoint for the quiz CLI.
// - Keeps `main` small: validate flags, build the API client and console,
//   then hand them to `ui::play`.
// - Returns `anyhow::Result` so any failure exits non-zero with its cause.

use anyhow::Context;
use clap::Parser;
use trivia_quiz::{play, ApiClient, Console, QuizError, QuizOptions};

#[derive(Parser, Debug)]
#[command(version, about = "Command line trivia quiz", long_about = None)]
struct Args {
    /// Select difficulty level (easy, medium or hard)
    #[arg(short, long, default_value = "easy")]
    difficulty: String,

    /// Number of questions in the quiz (1 - 10)
    #[arg(short, long, default_value = "1")]
    amount: String,

    /// Give up after this many invalid inputs at a single prompt
    #[arg(long)]
    max_attempts: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Bad flags fail here, before any request is made.
    let options = QuizOptions::parse(&args.difficulty, &args.amount)?;

    // Base URL comes from `TRIVIA_API_URL` or defaults to opentdb.com.
    let api = ApiClient::from_env().context("Failed to set up the trivia API client")?;
    let mut console = Console::stdio().with_max_attempts(args.max_attempts);
    let mut rng = rand::thread_rng();

    match play(&api, &mut console, &options, &mut rng) {
        Ok(_) => Ok(()),
        Err(QuizError::Cancelled) => {
            log::info!("session cancelled by end of input");
            eprintln!("\nQuiz cancelled.");
            std::process::exit(130);
        }
        Err(e) => Err(e.into()),
    }
}
