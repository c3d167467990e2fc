use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use examdraw::{db, QuestionBank};
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bankio")]
#[command(version, about = "Move question banks between JSON and SQLite", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    /// Delete the database before importing into it.
    #[arg(short, long, default_value = "false")]
    refresh_db: bool,
    #[arg(short, long, value_name = "FILE", default_value = "questions.db")]
    db: PathBuf,

    json: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// JSON bank into the database.
    Import,
    /// Database out to a JSON bank.
    Export,
}

fn import(args: &Args) -> examdraw::Result<()> {
    let bank = QuestionBank::from_json_file(&args.json)?;
    info!(
        "{}",
        format!(
            "Importing {} questions in {} categories...",
            bank.len(),
            bank.categories().len()
        )
        .blue()
    );
    for category in bank.categories() {
        info!(
            "{}",
            format!("├ Category: {} ({} questions)", category, bank.count_in(category)).blue()
        );
        let tiers: Vec<String> = bank
            .difficulty_breakdown(category)
            .iter()
            .map(|(difficulty, n)| format!("{} {}", n, difficulty))
            .collect();
        info!("{}", format!("│  └ {}", tiers.join(", ")).blue());
    }

    if args.refresh_db && args.db.exists() {
        info!("{}", format!("Removing {:?}", args.db).yellow());
        std::fs::remove_file(&args.db)?;
    }
    let mut conn = db::create_or_open(&args.db)?;
    let stored = db::store_bank(&mut conn, &bank);
    db::close_db(conn)?;
    stored
}

fn export(args: &Args) -> examdraw::Result<()> {
    let conn = db::open_db(&args.db)?;
    let bank = db::load_bank(&conn);
    db::close_db(conn)?;
    let bank = bank?;
    info!(
        "{}",
        format!("Exporting {} questions to {:?}", bank.len(), args.json).blue()
    );
    std::fs::write(&args.json, bank.to_json_string()?)?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();
    info!(
        "{}",
        format!("File at {:?} and Database at {:?}", args.json, args.db).cyan()
    );

    let result = match args.command {
        Commands::Import => import(&args),
        Commands::Export => {
            if !args.db.exists() {
                error!("{}", format!("No database at {:?}!", args.db).red());
                std::process::exit(1);
            }
            export(&args)
        }
    };

    match result {
        Ok(()) => info!("{}", "Done!".green()),
        Err(err) => {
            error!("{}", format!("{}", err).red());
            std::process::exit(1);
        }
    }
}
