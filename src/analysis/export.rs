//! Plain-data export of scaling tables
//!
//! Writes one CSV per analysed group so downstream consumers (plotting
//! scripts, report generators) can work from plain data without linking
//! against the harness. Rendering itself is out of scope.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::GroupAnalysis;

/// Write `scaling_<topology>_<schedule>.csv` into `dir`.
///
/// Columns: `threads, chunk, time_sec, time_mean, time_std, speedup,
/// speedup_err, efficiency, efficiency_err, amdahl_pred`. The
/// prediction column is blank when the group's Amdahl fit failed.
pub fn write_scaling_csv(analysis: &GroupAnalysis, dir: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!(
        "scaling_{}_{}.csv",
        analysis.topology, analysis.schedule
    ));
    let mut file = File::create(&path)?;

    writeln!(
        file,
        "threads,chunk,time_sec,time_mean,time_std,speedup,speedup_err,efficiency,efficiency_err,amdahl_pred"
    )?;
    for point in &analysis.curve.points {
        let predicted = match &analysis.amdahl {
            Ok(fit) => format!("{:.6}", fit.predict(point.threads)),
            Err(_) => String::new(),
        };
        writeln!(
            file,
            "{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{}",
            point.threads,
            point.chunk,
            point.time,
            point.time_mean,
            point.time_std,
            point.speedup,
            point.speedup_err,
            point.efficiency,
            point.efficiency_err,
            predicted,
        )?;
    }
    Ok(path)
}

// =================================================================================================
// Tests
// =================================================================================================
