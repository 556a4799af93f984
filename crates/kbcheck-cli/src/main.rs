//! CLI for validating model responses against a knowledge base.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kbcheck_core::{
    build_index, load_records_json_file, similarity, validate, KnowledgeBase, Normalizer,
    Summary, TracingSink, ValidatorConfig,
};

#[derive(Parser)]
#[command(name = "kbcheck", version)]
#[command(about = "Validate model responses against a knowledge base", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a file of model responses
    Validate {
        /// Knowledge base (JSON, or YAML by extension)
        #[arg(long)]
        kb: PathBuf,

        /// Model responses (JSON list of records)
        #[arg(long)]
        responses: PathBuf,

        /// Where to write the per-question results
        #[arg(long, default_value = "validation_results.json")]
        results_out: PathBuf,

        /// Where to write the run summary
        #[arg(long, default_value = "validation_summary.json")]
        summary_out: PathBuf,

        /// Also write the full report (results, summary, timestamp)
        #[arg(long)]
        report_out: Option<PathBuf>,

        /// Validator config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the similarity threshold
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Print the similarity of two answers
    Score {
        a: String,
        b: String,

        /// Compare the strings without normalizing them
        #[arg(long)]
        raw: bool,
    },

    /// Look up the KB answer for a question
    Lookup {
        /// Knowledge base (JSON, or YAML by extension)
        #[arg(long)]
        kb: PathBuf,

        /// Validator config (YAML, or JSON by extension)
        #[arg(short, long)]
        config: Option<PathBuf>,

        question: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref(), cli.verbose)?;

    match cli.command {
        Commands::Validate {
            kb,
            responses,
            results_out,
            summary_out,
            report_out,
            config,
            threshold,
        } => run_validate(
            &kb,
            &responses,
            &results_out,
            &summary_out,
            report_out.as_deref(),
            config.as_deref(),
            threshold,
        ),
        Commands::Score { a, b, raw } => {
            let score = if raw {
                similarity(&a, &b)
            } else {
                let normalizer = Normalizer::default();
                similarity(&normalizer.normalize(&a), &normalizer.normalize(&b))
            };
            println!("{:.3}", score);
            Ok(())
        }
        Commands::Lookup {
            kb,
            config,
            question,
        } => {
            let config = load_config(config.as_deref())?;
            let kb = KnowledgeBase::from_file(&kb)
                .with_context(|| format!("Failed to load knowledge base {}", kb.display()))?;
            let index = build_index(kb, &config)?;
            match index.lookup(&question) {
                Some(answer) => {
                    println!("{}", answer);
                    Ok(())
                }
                None => bail!("RETRY: out-of-domain"),
            }
        }
    }
}

fn init_tracing(log_file: Option<&Path>, verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ValidatorConfig> {
    match path {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(ValidatorConfig::default()),
    }
}

fn run_validate(
    kb_path: &Path,
    responses_path: &Path,
    results_out: &Path,
    summary_out: &Path,
    report_out: Option<&Path>,
    config_path: Option<&Path>,
    threshold: Option<f64>,
) -> Result<()> {
    tracing::info!("Starting validation process");

    let mut config = load_config(config_path)?;
    if let Some(t) = threshold {
        config = config.with_threshold(t)?;
    }

    let kb = KnowledgeBase::from_file(kb_path)
        .with_context(|| format!("Failed to load knowledge base {}", kb_path.display()))?;
    let records = load_records_json_file(responses_path)
        .with_context(|| format!("Failed to load responses {}", responses_path.display()))?;
    tracing::info!(
        kb_entries = kb.len(),
        records = records.len(),
        threshold = config.similarity_threshold,
        "Inputs loaded"
    );

    let index = build_index(kb, &config)?;
    let report = validate(&records, &index, &config, &mut TracingSink)?;

    write_json(results_out, &report.results)?;
    tracing::info!("Validation results saved to {}", results_out.display());

    log_summary(&report.summary);
    write_json(summary_out, &report.summary)?;
    tracing::info!("Summary saved to {}", summary_out.display());

    if let Some(path) = report_out {
        write_json(path, &report)?;
        tracing::info!("Report saved to {}", path.display());
    }

    Ok(())
}

fn log_summary(summary: &Summary) {
    tracing::info!("=== VALIDATION SUMMARY ===");
    tracing::info!("Total questions: {}", summary.total_questions);
    tracing::info!("KB questions: {}", summary.kb_questions);
    tracing::info!("Edge questions: {}", summary.edge_questions);
    tracing::info!("OK responses: {}", summary.ok_responses);
    tracing::info!("RETRY responses: {}", summary.retry_responses);
    tracing::info!("Out of domain: {}", summary.out_of_domain);
    tracing::info!("Answer differs: {}", summary.answer_differs);
    tracing::info!("Matches KB: {}", summary.matches_kb);
    tracing::info!("Average similarity (KB): {}", summary.average_similarity_kb);
    tracing::info!("Hallucination rate: {}%", summary.hallucination_rate);
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}
