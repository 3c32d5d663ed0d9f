//! Analysis engine
//!
//! Consumes the ledger and derives the scaling picture:
//!
//! - **`grouping`**: duplicate resolution, partitioning by
//!   `(topology, schedule)`, best-chunk selection per thread count,
//!   and the chunk-sweep profile
//! - **`scaling`**: speedup and efficiency relative to the
//!   single-thread baseline, with uncertainty propagation
//! - **`amdahl`**: least-squares estimate of the serial fraction and
//!   the predicted speedup curve
//! - **`export`**: plain-data CSV tables for downstream consumers
//!   (plotting itself is out of scope)
//!
//! All derivatives are transient: they are recomputed on demand from
//! the ledger and never persisted as ground truth.
//!
//! # Failure Isolation
//!
//! Analysis failures are scoped to their group. A `(topology, schedule)`
//! group without a `threads == 1` baseline fails its speedup
//! computation; a group without a multi-thread point fails its Amdahl
//! fit; neither aborts unrelated groups in the same pass.

// =================================================================================================
// Module Declarations
// =================================================================================================

mod amdahl;
mod export;
mod grouping;
mod scaling;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use amdahl::AmdahlFit;
pub use export::write_scaling_csv;
pub use grouping::{
    best_per_thread, chunk_profile, dedup_latest, group_by_chunk, group_by_schedule,
};
pub use scaling::{scaling_curve, ScalingCurve, ScalingPoint};

use crate::error::HarnessError;
use crate::experiment::{Schedule, Topology};
use crate::ledger::Measurement;

// =================================================================================================
// Group Analysis
// =================================================================================================

/// Complete derived picture of one `(topology, schedule)` group.
#[derive(Debug)]
pub struct GroupAnalysis {
    pub topology: Topology,
    pub schedule: Schedule,

    /// Best-configuration scaling curve of the group
    pub curve: ScalingCurve,

    /// Amdahl fit over the curve's multi-thread points; `Err` when the
    /// group has single-thread data only
    pub amdahl: Result<AmdahlFit, HarnessError>,
}

/// Analyse every `(topology, schedule)` group of a ledger.
///
/// Duplicate configuration keys are resolved most-recent-wins before
/// grouping (a resumed sweep supersedes its stale rows), and rows with
/// non-positive times are discarded as invalid runs. Per-group failures
/// come back as `Err` entries without affecting the other groups.
pub fn analyze_ledger(rows: &[Measurement]) -> Vec<Result<GroupAnalysis, HarnessError>> {
    let deduped = dedup_latest(rows);
    let valid: Vec<Measurement> = deduped
        .into_iter()
        .filter(|row| row.time_sec > 0.0)
        .collect();

    group_by_schedule(&valid)
        .into_iter()
        .map(|((topology, schedule), group)| {
            scaling_curve(topology, schedule, &group).map(|curve| {
                let amdahl = AmdahlFit::fit(&curve);
                GroupAnalysis {
                    topology,
                    schedule,
                    curve,
                    amdahl,
                }
            })
        })
        .collect()
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{Chunk, GridSize};
    use crate::ledger::Measurement;

    fn row(schedule: Schedule, chunk: Chunk, threads: u32, time_sec: f64) -> Measurement {
        Measurement {
            label: "2d_case".to_string(),
            topology: Topology::TwoD,
            size: GridSize::Plane { lx: 256, ly: 256 },
            steps: 1000,
            schedule,
            chunk,
            threads,
            time_sec,
            time_mean: time_sec,
            time_std: 0.0,
            energy_first: None,
            energy_last: None,
            energy_lines: 0,
            stdout_last: String::new(),
            stderr_last: String::new(),
        }
    }

    #[test]
    fn test_groups_are_isolated_on_failure() {
        // Static group has a baseline; dynamic group does not.
        let rows = vec![
            row(Schedule::Static, Chunk::Fixed(512), 1, 10.0),
            row(Schedule::Static, Chunk::Fixed(512), 2, 5.5),
            row(Schedule::Dynamic, Chunk::Fixed(512), 2, 5.0),
        ];

        let results = analyze_ledger(&rows);
        assert_eq!(results.len(), 2);

        let ok: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        let failed: Vec<_> = results.iter().filter(|r| r.is_err()).collect();
        assert_eq!(ok.len(), 1);
        assert_eq!(failed.len(), 1);
        assert!(matches!(
            failed[0].as_ref().unwrap_err(),
            HarnessError::MissingBaseline {
                schedule: Schedule::Dynamic,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_times_are_discarded() {
        let rows = vec![
            row(Schedule::Static, Chunk::Fixed(512), 1, 10.0),
            row(Schedule::Static, Chunk::Fixed(512), 2, 0.0),
        ];
        let results = analyze_ledger(&rows);
        let analysis = results[0].as_ref().unwrap();
        assert_eq!(analysis.curve.points.len(), 1, "zero-time row must drop");
    }

    #[test]
    fn test_end_to_end_scaling_numbers() {
        // Ledger rows from the specification's end-to-end scenario.
        let rows = vec![
            row(Schedule::Static, Chunk::Fixed(512), 1, 10.0),
            row(Schedule::Static, Chunk::Fixed(512), 2, 5.5),
            row(Schedule::Static, Chunk::Fixed(512), 4, 3.2),
        ];

        let results = analyze_ledger(&rows);
        assert_eq!(results.len(), 1);
        let analysis = results[0].as_ref().unwrap();

        let speedups: Vec<f64> = analysis.curve.points.iter().map(|p| p.speedup).collect();
        assert_eq!(speedups[0], 1.0);
        assert!((speedups[1] - 1.818_181_8).abs() < 1e-6);
        assert!((speedups[2] - 3.125).abs() < 1e-12);

        let efficiencies: Vec<f64> = analysis.curve.points.iter().map(|p| p.efficiency).collect();
        assert_eq!(efficiencies[0], 1.0);
        assert!((efficiencies[1] - 0.909_090_9).abs() < 1e-6);
        assert!((efficiencies[2] - 0.781_25).abs() < 1e-12);

        let fit = analysis.amdahl.as_ref().unwrap();
        // f_2 = (1/1.8182 - 1/2)/(1 - 1/2) = 0.1
        // f_4 = (1/3.125 - 1/4)/(1 - 1/4) = 0.07/0.75 ≈ 0.0933
        assert!((fit.serial_fraction - 0.096_666_7).abs() < 1e-4);
    }
}
