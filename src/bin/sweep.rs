//! Run the benchmark matrix against the simulator.
//!
//! One ledger row is appended per `(scenario, chunk, threads)`
//! configuration; reruns append to the same ledger and the analysis
//! side resolves duplicates by keeping the most recent row.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use wavebench_rs::exec::{Aggregator, RunOptions, SweepRunner};
use wavebench_rs::experiment::{locate_simulator, presets, Scenario, SIMULATOR_CANDIDATES};
use wavebench_rs::ledger::Ledger;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the wave_propagation benchmark matrix")]
struct Args {
    /// Path to the simulator binary (autodetected when omitted)
    #[arg(long)]
    exe: Option<PathBuf>,

    /// Directory for the ledger and relocated energy traces
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// TOML scenario file replacing the built-in matrix
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Measure only scenarios with this label (repeatable)
    #[arg(long)]
    only: Vec<String>,

    /// Discarded warm-up runs per configuration
    #[arg(long, default_value_t = 1)]
    warmup: usize,

    /// Timed repetitions per configuration
    #[arg(long, default_value_t = 3)]
    repeats: usize,

    /// Aggregator applied to the repetition timings (median or min)
    #[arg(long, default_value = "median")]
    aggregator: String,

    /// Kill a run exceeding this many seconds (unbounded when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Skip failing configurations instead of aborting the sweep
    #[arg(long)]
    keep_going: bool,
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let aggregator: Aggregator = args.aggregator.parse()?;
    if args.repeats == 0 {
        return Err("--repeats must be at least 1".into());
    }

    let exe = match args.exe {
        Some(path) => path,
        None => locate_simulator().ok_or_else(|| {
            format!(
                "simulator binary not found (tried {}); build it first or pass --exe",
                SIMULATOR_CANDIDATES.join(", ")
            )
        })?,
    };

    let mut scenarios: Vec<Scenario> = match &args.scenarios {
        Some(path) => presets::load_scenarios(path)?,
        None => presets::default_matrix(),
    };
    if !args.only.is_empty() {
        for label in &args.only {
            if !scenarios.iter().any(|s| &s.label == label) {
                return Err(format!("--only {}: no such scenario label", label).into());
            }
        }
        scenarios.retain(|s| args.only.contains(&s.label));
    }

    let options = RunOptions {
        warmup: args.warmup,
        repeats: args.repeats,
        aggregator,
        timeout: args.timeout_secs.map(Duration::from_secs),
    };
    let runner = SweepRunner::new(&exe, &args.results_dir, options, args.keep_going)?;
    let ledger = Ledger::new(args.results_dir.join("matrix_results.csv"));

    let total: usize = scenarios.iter().map(|s| s.configurations()).sum();
    println!(
        "Sweeping {} configurations from {} scenarios ({} warm-up, {} repeats, {} aggregate)",
        total,
        scenarios.len(),
        options.warmup,
        options.repeats,
        options.aggregator
    );

    let summary = runner.run(&scenarios, &ledger)?;

    println!(
        "Done: {} configurations measured, {} skipped",
        summary.completed, summary.skipped
    );
    println!("Results saved to {}", ledger.path().display());
    println!(
        "Per-configuration energy traces in {}/energy_*.dat",
        args.results_dir.display()
    );
    Ok(())
}
