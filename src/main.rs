use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use regime_rubric::config::{load_config, run_init, AppConfig};
use regime_rubric::output;
use regime_rubric::provider::{SnapshotProvider, METRICS};
use regime_rubric::rank::score_and_rank;
use regime_rubric::{Horizon, Regime, RegimeMixture, RegimeWeights, RubricScorer, ScoringError};

const EXIT_SUCCESS: i32 = 0;
const EXIT_DATA: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score and rank companies (all companies in the data file if none given)
    Score {
        companies: Vec<String>,

        #[command(flatten)]
        opts: ScoreOpts,

        /// Print tab-separated rank, score, company
        #[arg(long, conflicts_with = "json")]
        tsv: bool,
    },
    /// Show the full per-group breakdown for one company
    Explain {
        company: String,

        #[command(flatten)]
        opts: ScoreOpts,
    },
    /// List every metric id the rubric reads
    Metrics,
    /// Write a starter config file
    Init {
        /// Overwrite an existing file without asking
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
struct ScoreOpts {
    /// Scoring horizon
    #[arg(long, value_enum, default_value_t = Horizon::Mid)]
    horizon: Horizon,

    /// Snapshot date (YYYY-MM-DD); latest when omitted
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Snapshot data file (JSON); overrides `data` in the config
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Regime weight as name=weight, repeatable; overrides the config mixture
    #[arg(short, long = "regime", value_parser = parse_regime_pair)]
    regimes: Vec<(Regime, f64)>,

    /// Print breakdowns as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
#[command(name = "regime-rubric")]
#[command(about = "Regime-weighted company scoring rubric", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/regime-rubric/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn parse_regime_pair(s: &str) -> Result<(Regime, f64), String> {
    RegimeWeights::parse_pair(s).map_err(|e| e.to_string())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// the default level.
fn init_tracing(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code_for(err: &ScoringError) -> i32 {
    match err {
        ScoringError::Validation(_) => EXIT_CONFIG,
        ScoringError::MixtureUnavailable(_) => EXIT_DATA,
    }
}

/// Caller-side mixture: command line first, then the config file.
/// Validated here so a bad mixture fails once instead of per company.
fn caller_mixture(opts: &ScoreOpts, config: &AppConfig) -> Option<RegimeWeights> {
    let weights = if opts.regimes.is_empty() {
        config.regime_mixture.clone()
    } else {
        Some(opts.regimes.iter().copied().collect())
    };

    if let Some(ref w) = weights {
        if let Err(e) = RegimeMixture::normalize(w) {
            eprintln!("Regime mixture error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
    weights
}

fn build_scorer(opts: &ScoreOpts, config: &AppConfig) -> RubricScorer<SnapshotProvider> {
    let Some(data_path) = opts.data.clone().or_else(|| config.data.clone()) else {
        eprintln!("No data file given. Pass --data FILE or set `data:` in the config.");
        std::process::exit(EXIT_CONFIG);
    };

    let provider = match SnapshotProvider::load(&data_path) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Data error: {:#}", e);
            std::process::exit(EXIT_DATA);
        }
    };

    match RubricScorer::new(provider, config.rubric.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Rubric config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let start_time = Instant::now();

    // Commands that need no config
    match &cli.command {
        Commands::Metrics => {
            let use_colors = output::should_use_colors();
            println!("{}", output::format_metric_catalog(METRICS, use_colors));
            std::process::exit(EXIT_SUCCESS);
        }
        Commands::Init { force } => {
            if let Err(e) = run_init(cli.config.clone(), *force) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_CONFIG);
            }
            std::process::exit(EXIT_SUCCESS);
        }
        _ => {}
    }

    let config = match load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    match cli.command {
        Commands::Score {
            companies,
            opts,
            tsv,
        } => {
            let mixture = caller_mixture(&opts, &config);
            let scorer = Arc::new(build_scorer(&opts, &config));

            let companies = if companies.is_empty() {
                scorer.provider().companies().map(str::to_string).collect()
            } else {
                companies
            };
            if companies.is_empty() {
                eprintln!("No companies to score: the data file has none.");
                std::process::exit(EXIT_DATA);
            }
            debug!(count = companies.len(), horizon = %opts.horizon, "scoring companies");

            let ranking =
                match score_and_rank(scorer, &companies, opts.horizon, opts.as_of, mixture).await {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("{:#}", e);
                        std::process::exit(EXIT_DATA);
                    }
                };

            for (company, reason) in &ranking.failed {
                warn!(company = %company, "skipped: {}", reason);
            }

            if opts.json {
                match serde_json::to_string_pretty(&ranking.scored) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize breakdowns: {}", e);
                        std::process::exit(EXIT_DATA);
                    }
                }
            } else if tsv {
                println!("{}", output::format_tsv(&ranking.scored));
            } else {
                let use_colors = output::should_use_colors();
                println!("{}", output::format_ranked_table(&ranking.scored, use_colors));
            }

            debug!(
                scored = ranking.scored.len(),
                elapsed = ?start_time.elapsed(),
                "done"
            );
        }
        Commands::Explain { company, opts } => {
            let mixture = caller_mixture(&opts, &config);
            let scorer = build_scorer(&opts, &config);

            let breakdown = match scorer.score_company(&company, opts.horizon, opts.as_of, mixture) {
                Ok(b) => b,
                Err(e) => {
                    eprintln!("Scoring error: {}", e);
                    std::process::exit(exit_code_for(&e));
                }
            };

            if breakdown.company_unknown() {
                eprintln!("Unknown company '{}': the data file has no entry for it.", company);
                std::process::exit(EXIT_DATA);
            }

            if opts.json {
                match serde_json::to_string_pretty(&breakdown) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Failed to serialize breakdown: {}", e);
                        std::process::exit(EXIT_DATA);
                    }
                }
            } else {
                let use_colors = output::should_use_colors();
                println!(
                    "{}",
                    output::format_explanation(&breakdown, &scorer.config().weights, use_colors)
                );
            }
        }
        Commands::Metrics | Commands::Init { .. } => {}
    }

    std::process::exit(EXIT_SUCCESS);
}
