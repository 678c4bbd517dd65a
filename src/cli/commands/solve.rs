//! Solve command - Exact solution of a registered environment

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use super::tables::export_json;
use crate::{
    app::{App, SolveConfig},
    cli::output::{format_number, print_section, print_stats_table},
    dictionary::{ProgressObserver, TableKind},
    enumeration::{DEFAULT_SENTINEL, load_ground_truths},
    exact::{Blinkered, Canonicalization},
    mouselab::TermReward,
    ports::{NoopObserver, TableObserver},
};

#[derive(Parser, Debug)]
#[command(about = "Solve a registered environment exactly")]
pub struct SolveArgs {
    /// Registered environment name (see `list-envs`)
    pub env: String,

    /// Flat inspection cost per reveal
    #[arg(long, short = 'c', default_value_t = 1.0)]
    pub cost: f64,

    /// State reduction before memoization (hash-tree, sort-tree, identity)
    #[arg(long, default_value = "hash-tree")]
    pub canonicalization: Canonicalization,

    /// Continuation restriction (none, recursive, children, branch, single-action)
    #[arg(long, default_value = "none")]
    pub blinkered: Blinkered,

    /// Termination payout (expected, ground-truth, zero)
    #[arg(long, default_value = "expected")]
    pub term_reward: TermReward,

    /// Fraction of trials whose termination payout is rewarded
    #[arg(long, default_value_t = 1.0)]
    pub pct_reward: f64,

    /// Seed for sampling a ground truth (needed for ground-truth payouts)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Table to build after solving (q, pi)
    #[arg(long, short = 't')]
    pub table: Option<TableKind>,

    /// JSON file of trials whose `stateRewards` restrict the table
    #[arg(long)]
    pub ground_truths: Option<PathBuf>,

    /// Stand-in for hidden entries while deduplicating states
    #[arg(long, default_value_t = DEFAULT_SENTINEL, allow_hyphen_values = true)]
    pub sentinel: f64,

    /// Save the table as MessagePack
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Export the table as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

pub fn execute(args: SolveArgs) -> Result<()> {
    if args.table.is_none() && (args.output.is_some() || args.json.is_some()) {
        bail!("--output and --json need a table; pass --table q or --table pi");
    }

    let app = App::new()?;
    let mut config = SolveConfig::new()
        .with_canonicalization(args.canonicalization)
        .with_blinkered(args.blinkered)
        .with_sentinel(args.sentinel)
        .with_cost(args.cost)
        .with_term_reward(args.term_reward)
        .with_pct_reward(args.pct_reward);
    if let Some(kind) = args.table {
        config = config.with_table(kind);
    }
    if let Some(seed) = args.seed {
        config = config.with_ground_truth_seed(seed);
    }

    let ground_truths = match &args.ground_truths {
        Some(path) => Some(
            load_ground_truths(path)
                .with_context(|| format!("loading ground truths from {}", path.display()))?,
        ),
        None => None,
    };

    print_section(&format!("Solving {}", args.env));
    let mut progress = ProgressObserver::new();
    let mut quiet = NoopObserver;
    let observer: &mut dyn TableObserver = if args.no_progress {
        &mut quiet
    } else {
        &mut progress
    };
    let summary = app
        .solve(&args.env, &config, ground_truths.as_deref(), observer)
        .with_context(|| format!("solving {}", args.env))?;

    let value = format!("{:.2}", summary.value);
    let solve_time = format!("{:.3} sec", summary.solve_time.as_secs_f64());
    let total_time = format!("{:.3} sec", summary.total_time.as_secs_f64());
    let q_calls = format_number(summary.stats.q_calls as usize);
    let v_calls = format_number(summary.stats.v_calls as usize);
    let cached = format_number(summary.stats.cached_values);
    let canonicalization = config.canonicalization.to_string();
    let blinkered = config.blinkered.to_string();
    let pct_reward = format!("{:.2}", config.pct_reward);
    print_stats_table(&[
        ("Optimal value", value.as_str()),
        ("Solve time", solve_time.as_str()),
        ("Total time", total_time.as_str()),
        ("Q calls", q_calls.as_str()),
        ("V calls", v_calls.as_str()),
        ("Cached values", cached.as_str()),
        ("Canonicalization", canonicalization.as_str()),
        ("Blinkered", blinkered.as_str()),
        ("Rewarded fraction", pct_reward.as_str()),
    ]);

    if let Some(table) = &summary.table {
        println!("\n{} table: {} entries", table.kind(), format_number(table.len()));
        if let Some(path) = &args.output {
            app.save_table(table, path)
                .with_context(|| format!("saving table to {}", path.display()))?;
            println!("Table saved to: {}", path.display());
        }
        if let Some(path) = &args.json {
            export_json(table, path)?;
            println!("Table exported to: {}", path.display());
        }
    }

    Ok(())
}
