//! Seeded self-play for Zero-Sum Defense.
//!
//! Runs a batch of bot-vs-bot (or sandbox) matches in parallel and prints a
//! JSON report to stdout. Match `i` uses seed `--seed + i`, so any single
//! match can be replayed on its own.

mod runner;

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use zerosum_core::{MatchConfig, MatchMode, MatchStatus};

use crate::runner::{play_match, MatchSummary};

#[derive(Parser, Debug)]
#[command(author, version, about = "Zero-Sum Defense self-play runner", long_about = None)]
struct Args {
    /// Number of matches to play
    #[arg(short, long, default_value_t = 16)]
    matches: u64,

    /// Seed of the first match
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Turn limit per match
    #[arg(long, default_value_t = 200)]
    max_turns: usize,

    /// Play single-seat sandbox matches
    #[arg(long)]
    sandbox: bool,

    /// Match settings as JSON, e.g. '{"max_energy": 6, "nexus_hp": 2}'
    #[arg(long)]
    config: Option<String>,

    /// Log filter directive
    #[arg(long, default_value = "warn")]
    log: String,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    config: MatchConfig,
    matches: usize,
    finished: usize,
    wins: Vec<usize>,
    average_turns: f64,
    results: Vec<MatchSummary>,
}

impl Report {
    fn new(config: MatchConfig, results: Vec<MatchSummary>) -> Self {
        let mut wins = vec![0; config.mode.seat_count()];
        for winner in results.iter().filter_map(|r| r.winner) {
            if let Some(count) = wins.get_mut(winner) {
                *count += 1;
            }
        }
        let finished = results.iter().filter(|r| r.status == MatchStatus::GameOver).count();
        let total_turns: usize = results.iter().map(|r| r.turns).sum();
        #[allow(clippy::cast_precision_loss)]
        let average_turns = if results.is_empty() {
            0.0
        } else {
            total_turns as f64 / results.len() as f64
        };
        Self {
            config,
            matches: results.len(),
            finished,
            wins,
            average_turns,
            results,
        }
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Args) -> Result<MatchConfig> {
    let mut config = match &args.config {
        Some(json) => serde_json::from_str(json).context("parsing --config")?,
        None => MatchConfig::default(),
    };
    if args.sandbox {
        config.mode = MatchMode::Sandbox;
    }
    config
        .validate(config.mode.seat_count())
        .context("invalid match configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log);
    let config = load_config(&args)?;

    info!(matches = args.matches, seed = args.seed, mode = ?config.mode, "starting self-play");
    let results = (0..args.matches)
        .into_par_iter()
        .map(|i| play_match(config.clone(), args.seed.wrapping_add(i), args.max_turns))
        .collect::<Result<Vec<_>>>()?;

    let report = Report::new(config, results);
    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
