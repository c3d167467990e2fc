use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use examdraw::exam::DEFAULT_QUESTION_COUNT;
use examdraw::{db, MockExam, MockExamConfig, QuestionBank};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "examdraw")]
#[command(version, about = "Draw a balanced mock exam from a question bank", long_about = None)]
struct Args {
    /// Question bank as JSON.
    #[arg(short, long, value_name = "FILE", conflicts_with = "db")]
    bank: Option<PathBuf>,
    /// Question bank as an SQLite database written by `bankio import`.
    #[arg(short, long, value_name = "FILE")]
    db: Option<PathBuf>,
    /// Mock exam configuration as JSON.
    #[arg(short, long, value_name = "FILE")]
    exam: Option<PathBuf>,
    #[arg(short, long)]
    question_count: Option<u32>,
    /// Restrict the exam to these categories, in this order.
    #[arg(long = "category", value_name = "NAME")]
    categories: Vec<String>,
    #[arg(long)]
    seed: Option<u64>,
    /// Print the correct answer and explanation under each question.
    #[arg(short, long)]
    answers: bool,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, Error)]
enum Error {
    #[error("no question bank given (use --bank or --db)")]
    NoBank,
    #[error("the bank has no categories")]
    NoCategories,
    #[error(transparent)]
    Exam(#[from] examdraw::Error),
}

fn load_bank(args: &Args) -> Result<QuestionBank, Error> {
    if let Some(path) = &args.bank {
        return Ok(QuestionBank::from_json_file(path)?);
    }
    let path = args.db.as_ref().ok_or(Error::NoBank)?;
    let conn = db::open_db(path)?;
    let bank = db::load_bank(&conn);
    db::close_db(conn)?;
    Ok(bank?)
}

fn build_config(args: &Args, bank: &QuestionBank) -> Result<MockExamConfig, Error> {
    let mut config = match &args.exam {
        Some(path) => MockExamConfig::from_json_file(path)?,
        None => MockExamConfig {
            exam_id: String::from("mock"),
            exam_title: String::from("Mock Examination"),
            total_questions: DEFAULT_QUESTION_COUNT,
            time_limit: 0,
            pass_threshold: 80,
            exit_path: None,
            categories: bank.categories().to_vec(),
        },
    };
    if !args.categories.is_empty() {
        config.categories = args.categories.clone();
    }
    if config.categories.is_empty() {
        return Err(Error::NoCategories);
    }
    Ok(config)
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let bank = match load_bank(&args) {
        Ok(bank) => bank,
        Err(err) => {
            println!("{}", format!("Could not load the question bank: {}", err).bright_red());
            return Err(err);
        }
    };
    debug!("[Setup] Bank has {} questions.", bank.len());

    let config = match build_config(&args, &bank) {
        Ok(config) => config,
        Err(Error::NoCategories) => {
            warn!("[Setup] No categories found.");
            println!(
                "{}",
                "No categories found. Come back when the bank has some questions!".yellow()
            );
            return Err(Error::NoCategories);
        }
        Err(err) => return Err(err),
    };
    debug!("[Setup] Config: {:?}", config);

    let mut rng: Box<dyn RngCore> = match args.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::rng()),
    };
    let exam = MockExam::draw(&bank, &config, args.question_count, rng.as_mut())?;

    println!(
        "{}",
        format!(
            "==========> {} ({} questions) <==========",
            exam.config.exam_title,
            exam.len()
        )
        .cyan()
    );
    if exam.is_short() {
        println!(
            "{}",
            format!(
                "Only {} of the {} requested questions are available.",
                exam.len(),
                exam.requested
            )
            .yellow()
        );
    }

    for (idx, question) in exam.questions.iter().enumerate() {
        let leading = format!("{}/{}. ", idx + 1, exam.len());
        println!(
            "{}{}",
            leading.cyan(),
            format!("{} ({})", question.question, question.difficulty)
                .black()
                .bold()
                .on_white()
        );

        let Some((options, correct)) = question.options_shuffled(rng.as_mut()) else {
            warn!("[Setup] Question {} has no valid correct answer.", question.id);
            continue;
        };
        let indent = " ".repeat(leading.len());
        for (i, option) in options.iter().enumerate() {
            println!("{}{}. {}", indent, format!("{}", i + 1).bold(), option);
        }
        if args.answers {
            println!(
                "{}",
                format!("{}Answer: {}. {}", indent, correct + 1, options[correct]).green()
            );
            println!("{}{}", indent, question.explanation.dimmed());
        }
        println!();
    }

    for (category, count) in exam.category_counts() {
        println!("{}", format!("  {}: {}", category, count).blue());
    }
    println!(
        "{}",
        format!(
            "Pass mark: {}/{} ({}%)",
            exam.pass_mark(),
            exam.len(),
            exam.config.pass_threshold
        )
        .cyan()
    );
    if exam.config.time_limit > 0 {
        println!(
            "{}",
            format!("Time limit: {} minutes", exam.config.time_limit / 60).cyan()
        );
    }

    Ok(())
}
