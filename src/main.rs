use clap::Parser;
use std::path::PathBuf;

mod commands;
mod config;
mod error;
mod export;
mod grouping;
mod loader;
mod models;
mod output;
mod review;
mod session;

use crate::config::Config;
use crate::grouping::QuestionGroups;
use crate::output::OutputFormat;
use crate::session::Session;

/// LLM Response Scoring - page through questions and rate each model's answer from 1 to 5
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV file with question_id, question_text, llm and response columns
    data_file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where exported scores are written
    #[arg(short, long)]
    export_path: Option<PathBuf>,

    /// Output format: plain or json
    #[arg(short, long, default_value = "plain")]
    output: OutputFormat,

    /// Verbose output - log navigation, edits and saves to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(data_file) = args.data_file {
        config.data_path = data_file;
    }
    if let Some(export_path) = args.export_path {
        config.export_path = export_path;
    }
    let default_score = config.initial_score()?;

    let rows = loader::load_responses(&config.data_path)?;
    let groups = QuestionGroups::from_rows(rows);
    if groups.is_empty() {
        anyhow::bail!("No questions found in data.");
    }
    tracing::info!(
        questions = groups.len(),
        responses = groups.row_count(),
        "Ready to score"
    );

    let mut session = Session::new(&groups, default_score, config.export_path, args.output);
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    session.run(stdin.lock(), &mut stdout)?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "llm_scorer=debug"
    } else {
        "llm_scorer=warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
