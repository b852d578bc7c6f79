use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{LifelineEffect, LifelineKind, PlayerId, QuestionRecord};
use quiz_core::{Phase, QuizError, QuizSession, TickOutcome};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{Clock, GameHistoryService, QuizLoopService, QuizRequest};
use storage::repository::Storage;
use storage::sample::{SAMPLE_GRADE, SAMPLE_SUBJECT, sample_repository};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::info;
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const OPTION_LABELS: [char; 4] = ['A', 'B', 'C', 'D'];

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidGrade { raw: String },
    InvalidPlayer { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidGrade { raw } => write!(f, "invalid --grade value: {raw}"),
            ArgsError::InvalidPlayer { raw } => write!(f, "invalid --player value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--subject <name>] [--grade <n>] [--mode <difficulty>] [--player <id>] [--shuffle] [--seed <u64>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --subject {SAMPLE_SUBJECT}");
    eprintln!("  --grade {SAMPLE_GRADE}");
    eprintln!("  --mode automatic   (or easy, medium, hard)");
    eprintln!("  --player 1");
    eprintln!("  --seed   (random; set it to replay shuffles and eliminations)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_SUBJECT, QUIZ_GRADE, QUIZ_MODE, QUIZ_PLAYER, QUIZ_SEED, RUST_LOG");
}

struct Args {
    request: QuizRequest,
    shuffle: bool,
    seed: Option<u64>,
}

impl Args {
    /// Generator for question shuffling and eliminate; seeded runs repeat exactly.
    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut subject =
            std::env::var("QUIZ_SUBJECT").unwrap_or_else(|_| SAMPLE_SUBJECT.to_owned());
        let mut grade = std::env::var("QUIZ_GRADE")
            .ok()
            .and_then(|value| value.parse::<u8>().ok())
            .unwrap_or(SAMPLE_GRADE);
        let mut difficulty = std::env::var("QUIZ_MODE").unwrap_or_else(|_| "automatic".to_owned());
        let mut player = std::env::var("QUIZ_PLAYER")
            .ok()
            .and_then(|value| value.parse::<PlayerId>().ok())
            .unwrap_or_else(|| PlayerId::new(1));
        let mut shuffle = false;
        let mut seed = std::env::var("QUIZ_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok());

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--subject" => subject = require_value(args, "--subject")?,
                "--grade" => {
                    let value = require_value(args, "--grade")?;
                    grade = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidGrade { raw: value.clone() })?;
                }
                "--mode" => difficulty = require_value(args, "--mode")?,
                "--player" => {
                    let value = require_value(args, "--player")?;
                    player = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidPlayer { raw: value.clone() })?;
                }
                "--shuffle" => shuffle = true,
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(
                        value
                            .parse()
                            .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?,
                    );
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            request: QuizRequest {
                player,
                subject,
                grade,
                difficulty,
            },
            shuffle,
            seed,
        })
    }
}

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Select(usize),
    Confirm,
    Lifeline(LifelineKind),
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim().to_ascii_lowercase();
        match line.as_str() {
            "a" | "b" | "c" | "d" => line
                .chars()
                .next()
                .map(|c| Self::Select(c as usize - 'a' as usize)),
            "ok" | "y" => Some(Self::Confirm),
            "skip" => Some(Self::Lifeline(LifelineKind::Skip)),
            "50" | "eliminate" => Some(Self::Lifeline(LifelineKind::Eliminate)),
            "hint" => Some(Self::Lifeline(LifelineKind::Hint)),
            "quit" | "q" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn render_question(session: &QuizSession, question: &QuestionRecord) {
    let progress = session.progress();
    println!();
    println!(
        "Question {}/{} for {} (guaranteed {})",
        progress.index + 1,
        progress.total,
        progress.current_prize.unwrap_or_default(),
        progress.guaranteed_money,
    );
    println!("{}", question.statement());
    for index in session.visible_options() {
        if let Some(text) = question.option(index) {
            println!("  {}) {text}", OPTION_LABELS[index]);
        }
    }
    println!("[a-d] select, ok confirm, 50 / hint / skip lifelines, quit");
}

async fn wait_for_feedback(session: &mut QuizSession) -> Result<TickOutcome, QuizError> {
    loop {
        match session.poll()? {
            TickOutcome::Pending => tokio::time::sleep(POLL_INTERVAL).await,
            outcome => return Ok(outcome),
        }
    }
}

async fn play(
    session: &mut QuizSession,
    input: &mut Lines<BufReader<Stdin>>,
    rng: &mut StdRng,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut shown_index = None;

    while !session.is_terminal() {
        if let Some(question) = session.current_question() {
            if shown_index != Some(session.current_index()) {
                render_question(session, question);
                shown_index = Some(session.current_index());
            }
        }

        let Some(line) = input.next_line().await? else {
            session.quit()?;
            break;
        };
        let Some(command) = Command::parse(&line) else {
            println!("unrecognised input: {}", line.trim());
            continue;
        };

        let applied = match command {
            Command::Select(index) => session.select_option(index).map(|()| {
                println!("selected {}; type ok to lock it in", OPTION_LABELS[index]);
            }),
            Command::Confirm => session.confirm_answer().map(|feedback| {
                if feedback.correct {
                    println!("Correct! You have {}.", feedback.accumulated_money);
                } else {
                    println!(
                        "Wrong, the answer was {}.",
                        OPTION_LABELS[feedback.correct_option]
                    );
                }
            }),
            Command::Lifeline(kind) => {
                session
                    .activate_lifeline_with_rng(kind, rng)
                    .map(|effect| match effect {
                        LifelineEffect::Skipped => println!("Question skipped."),
                        LifelineEffect::Eliminated { .. } => shown_index = None,
                        LifelineEffect::Hint(hint) => println!("Hint: {hint}"),
                    })
            }
            Command::Quit => session.quit().map(|_| ()),
        };
        if let Err(err) = applied {
            println!("{err}");
            continue;
        }

        if matches!(session.phase(), Phase::ResultShown { .. }) {
            wait_for_feedback(session).await?;
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::from_repository(sample_repository()?);
    let quiz_loop = QuizLoopService::new(
        Clock::default_clock(),
        Arc::clone(&storage.questions),
        Arc::clone(&storage.games),
    )
    .with_shuffle(parsed.shuffle);
    let history = GameHistoryService::new(Arc::clone(&storage.games));

    let mut rng = parsed.rng();
    if let Some(seed) = parsed.seed {
        info!(seed, "using seeded generator");
    }
    let mut quiz = quiz_loop
        .start_quiz_with_rng(parsed.request, &mut rng)
        .await?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    play(quiz.session_mut(), &mut input, &mut rng).await?;

    if let Some(result) = quiz.result().copied() {
        println!();
        println!("Game over: {}. You take home {}.", result.outcome, result.money_awarded);
    }
    quiz_loop.record_result(&mut quiz).await?;

    let player = quiz.request().player;
    let totals = history.totals(player).await?;
    info!(
        %player,
        games = totals.games_played,
        total_money = totals.total_money,
        "player totals"
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_player_commands() {
        assert_eq!(Command::parse(" B "), Some(Command::Select(1)));
        assert_eq!(Command::parse("ok"), Some(Command::Confirm));
        assert_eq!(
            Command::parse("50"),
            Some(Command::Lifeline(LifelineKind::Eliminate))
        );
        assert_eq!(Command::parse("QUIT"), Some(Command::Quit));
        assert_eq!(Command::parse("e"), None);
    }

    #[test]
    fn parses_flags() {
        let mut args = ["--mode", "hard", "--grade", "4", "--player", "7", "--shuffle"]
            .into_iter()
            .map(String::from);
        let parsed = Args::parse(&mut args).unwrap();
        assert_eq!(parsed.request.difficulty, "hard");
        assert_eq!(parsed.request.grade, 4);
        assert_eq!(parsed.request.player, PlayerId::new(7));
        assert!(parsed.shuffle);
    }

    #[test]
    fn seed_flag_makes_generator_repeatable() {
        use rand::Rng;

        let mut args = ["--seed", "1234"].into_iter().map(String::from);
        let parsed = Args::parse(&mut args).unwrap();
        assert_eq!(parsed.seed, Some(1234));

        let first: Vec<u32> = parsed.rng().random_iter().take(4).collect();
        let second: Vec<u32> = parsed.rng().random_iter().take(4).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_seed() {
        let mut args = ["--seed", "-1"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut args),
            Err(ArgsError::InvalidSeed { raw }) if raw == "-1"
        ));
        let mut args = ["--seed"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut args),
            Err(ArgsError::MissingValue { flag: "--seed" })
        ));
    }

    #[test]
    fn rejects_bad_grade() {
        let mut args = ["--grade", "ten"].into_iter().map(String::from);
        assert!(matches!(
            Args::parse(&mut args),
            Err(ArgsError::InvalidGrade { .. })
        ));
    }
}
