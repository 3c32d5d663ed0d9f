//! Analyse the result ledger.
//!
//! Prints the best-configuration scaling table and Amdahl fit of every
//! `(topology, schedule)` group, plus the time-versus-chunk profile
//! where a chunk sweep was measured, and writes plain-data scaling CSVs
//! for downstream plotting.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use wavebench_rs::analysis::{
    analyze_ledger, chunk_profile, dedup_latest, group_by_schedule, write_scaling_csv,
    GroupAnalysis,
};
use wavebench_rs::ledger::Ledger;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyse the wave_propagation sweep ledger")]
struct Args {
    /// Ledger produced by the sweep
    #[arg(long, default_value = "results/matrix_results.csv")]
    ledger: PathBuf,

    /// Directory the scaling CSVs are written into
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Print tables only; skip writing scaling CSVs
    #[arg(long)]
    no_export: bool,
}

fn main() {
    env_logger::init();
    if let Err(err) = run(Args::parse()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let rows = Ledger::new(&args.ledger).load()?;
    println!("Loaded {} ledger rows from {}", rows.len(), args.ledger.display());

    let results = analyze_ledger(&rows);
    if results.is_empty() {
        return Err("ledger contains no usable measurements".into());
    }

    let mut succeeded = 0;
    for result in &results {
        match result {
            Ok(analysis) => {
                succeeded += 1;
                print_group(analysis);
                if !args.no_export {
                    let path = write_scaling_csv(analysis, &args.results_dir)?;
                    println!("  table written to {}", path.display());
                }
            }
            Err(err) => {
                // Group-scoped failure: report and keep analysing the rest.
                eprintln!("group skipped: {}", err);
            }
        }
    }

    print_chunk_profiles(&rows);

    if succeeded == 0 {
        return Err("no group produced a scaling curve".into());
    }
    Ok(())
}

fn print_group(analysis: &GroupAnalysis) {
    println!();
    println!(
        "=== {} / {} (best chunk per thread count) ===",
        analysis.topology, analysis.schedule
    );
    println!(
        "{:>8} {:>8} {:>12} {:>16} {:>16}",
        "threads", "chunk", "time [s]", "speedup", "efficiency"
    );
    for point in &analysis.curve.points {
        println!(
            "{:>8} {:>8} {:>12.6} {:>9.3} ±{:>5.3} {:>9.3} ±{:>5.3}",
            point.threads,
            point.chunk.to_string(),
            point.time,
            point.speedup,
            point.speedup_err,
            point.efficiency,
            point.efficiency_err,
        );
    }

    match &analysis.amdahl {
        Ok(fit) => {
            println!("  Amdahl serial fraction f ≈ {:.4}", fit.serial_fraction);
            let predicted = fit.predicted_curve(&analysis.curve.thread_counts());
            let rendered: Vec<String> = predicted
                .iter()
                .map(|(threads, speedup)| format!("S({})={:.3}", threads, speedup))
                .collect();
            println!("  predicted: {}", rendered.join("  "));
        }
        Err(err) => println!("  Amdahl fit unavailable: {}", err),
    }
}

/// Time-versus-chunk tables for groups where more than one chunk was
/// measured at the highest thread count.
fn print_chunk_profiles(rows: &[wavebench_rs::ledger::Measurement]) {
    let deduped = dedup_latest(rows);
    for ((topology, schedule), group) in group_by_schedule(&deduped) {
        let Some((threads, profile)) = chunk_profile(&group) else {
            continue;
        };
        if profile.len() < 2 {
            continue;
        }
        println!();
        println!(
            "=== {} / {}: time vs chunk at threads={} ===",
            topology, schedule, threads
        );
        for (chunk, time) in profile {
            println!("{:>8} {:>12.6} s", chunk.to_string(), time);
        }
    }
}
