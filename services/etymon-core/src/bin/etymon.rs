//! Etymon CLI
//!
//! - `estimate`: pick the phonetically nearest candidate language per headword
//! - `score`: graded accuracy of a written report against known etymologies
//! - `run`: both, in one pass
//! - `paths`: print the relatedness graph's shortest-path matrix

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use etymon_core::logging::init_tracing;
use etymon_core::{
    build_metric, Dataset, Estimate, EtymonConfig, GradedScorer, ReportColumns, ScoreReport,
};

#[derive(Parser)]
#[command(name = "etymon")]
#[command(author, version, about = "Guess donor languages by phonetic distance and score the guesses")]
struct Cli {
    /// JSON run configuration (defaults to the built-in six-language setup)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter, overridden by RUST_LOG
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct EstimateArgs {
    /// Input CSV with one column per candidate language
    #[arg(long)]
    input: PathBuf,

    /// Where to write the augmented CSV
    #[arg(long)]
    output: PathBuf,

    /// Spread rows over worker threads
    #[arg(long)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add predicted language, rendering and distance columns to a dataset
    Estimate(EstimateArgs),

    /// Score an already estimated dataset against its ground-truth column
    Score {
        #[arg(long)]
        input: PathBuf,

        /// Column holding predicted languages (names or indices)
        #[arg(long)]
        predicted_column: Option<String>,

        #[arg(long)]
        truth_column: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Estimate, write the augmented dataset, then score it
    Run {
        #[command(flatten)]
        estimate: EstimateArgs,

        #[arg(long)]
        json: bool,
    },

    /// Print shortest-path distances between configured languages
    Paths {
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<EtymonConfig> {
    match path {
        Some(path) => EtymonConfig::load(path)
            .with_context(|| format!("invalid configuration {}", path.display())),
        None => Ok(EtymonConfig::default()),
    }
}

fn estimate(config: &EtymonConfig, args: &EstimateArgs) -> Result<(Dataset, Vec<Option<Estimate>>)> {
    let languages = config.language_set()?;
    let metric = build_metric(config).context("failed to load phonetic resources")?;
    let dataset = Dataset::from_path(&args.input, &languages, config.headword_column.as_deref())
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let estimates = if args.parallel {
        dataset.estimate_parallel(metric.as_ref(), config.scan)
    } else {
        dataset.estimate(metric.as_ref(), config.scan)
    };

    dataset
        .save_augmented(&args.output, &languages, &estimates, &ReportColumns::from(config))
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok((dataset, estimates))
}

fn print_report(report: &ScoreReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Estimate(args) => {
            estimate(&config, &args)?;
        }

        Commands::Score {
            input,
            predicted_column,
            truth_column,
            json,
        } => {
            let languages = config.language_set()?;
            let scorer = GradedScorer::new(languages, &config.relatedness_graph()?)?;
            let dataset =
                Dataset::from_path(&input, scorer.languages(), config.headword_column.as_deref())
                    .with_context(|| format!("failed to read {}", input.display()))?;
            let report = dataset.score_report(
                &scorer,
                predicted_column.as_deref().unwrap_or(&config.predicted_column),
                truth_column.as_deref().unwrap_or(&config.truth_column),
            )?;
            print_report(&report, json)?;
        }

        Commands::Run { estimate: args, json } => {
            let scorer = GradedScorer::new(config.language_set()?, &config.relatedness_graph()?)?;
            let (dataset, estimates) = estimate(&config, &args)?;
            let report = dataset.score_estimates(&scorer, &estimates, &config.truth_column)?;
            print_report(&report, json)?;
        }

        Commands::Paths { json } => {
            let languages = config.language_set()?;
            let graph = config.relatedness_graph()?;
            let paths = graph.shortest_paths();

            if json {
                let mut export = graph.to_json(&languages);
                export["shortest_paths"] = serde_json::json!(paths.to_rows());
                println!("{}", serde_json::to_string_pretty(&export)?);
            } else {
                for (language, row) in languages.iter().zip(paths.to_rows()) {
                    let cells: Vec<String> = row.iter().map(|d| format!("{d:.3}")).collect();
                    println!("{:<16} {}", language.name, cells.join("  "));
                }
            }
        }
    }

    Ok(())
}
