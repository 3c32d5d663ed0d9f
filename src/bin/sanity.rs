//! Run the sanity validation cases.
//!
//! Reports physically-motivated diagnostics (energy decay, drive-induced
//! non-monotonicity) for human judgment. A violated expectation is
//! reported, not fatal; a simulator failure or an absent trace is.

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use wavebench_rs::experiment::{locate_simulator, SIMULATOR_CANDIDATES};
use wavebench_rs::sanity::{default_cases, SanityMetric, SanityValidator};

#[derive(Parser, Debug)]
#[command(author, version, about = "Sanity-check the wave_propagation simulator")]
struct Args {
    /// Path to the simulator binary (autodetected when omitted)
    #[arg(long)]
    exe: Option<PathBuf>,

    /// Directory the harvested sanity traces land in
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Kill a run exceeding this many seconds (unbounded when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let exe = match args.exe {
        Some(path) => path,
        None => locate_simulator().ok_or_else(|| {
            format!(
                "simulator binary not found (tried {}); build it first or pass --exe",
                SIMULATOR_CANDIDATES.join(", ")
            )
        })?,
    };

    let validator = SanityValidator::new(
        exe,
        &args.results_dir,
        args.timeout_secs.map(Duration::from_secs),
    )?;

    let mut failures = 0;
    for case in default_cases() {
        match validator.run_case(&case) {
            Ok(outcome) => match outcome.metric {
                SanityMetric::EnergyDrop { percent: Some(drop) } => {
                    println!(
                        "[{}] energy drop ≈ {:.1}% over {} readings ({:.3} s)",
                        outcome.name, drop, outcome.samples, outcome.elapsed
                    );
                }
                SanityMetric::EnergyDrop { percent: None } => {
                    println!(
                        "[{}] energy drop undefined (initial energy not positive)",
                        outcome.name
                    );
                }
                SanityMetric::Increases { rises, steps } => {
                    println!(
                        "[{}] energy rises in {}/{} steps ({:.3} s)",
                        outcome.name, rises, steps, outcome.elapsed
                    );
                }
            },
            Err(err) => {
                // Case failures are isolated; the remaining cases still run.
                eprintln!("[{}] failed: {}", case.name, err);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} sanity case(s) failed to run", failures).into());
    }
    println!("Sanity report complete; traces in {}/sanity_*.dat", args.results_dir.display());
    Ok(())
}
