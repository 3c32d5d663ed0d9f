//! Speedup and efficiency with uncertainty propagation
//!
//! Given the best-configuration series of a `(topology, schedule)`
//! group, every point is normalised against the `threads == 1`
//! baseline:
//!
//! ```text
//! S(p) = T1 / T(p)        E(p) = S(p) / p
//! ```
//!
//! When the ledger carries repetition statistics (mean and standard
//! deviation of the elapsed times), the timing uncertainty propagates
//! into the derived quantities:
//!
//! ```text
//! σ_S(p) = S(p) · sqrt((σ_T1/T1)² + (σ_Tp/Tp)²)
//! σ_E(p) = σ_S(p) / p
//! ```
//!
//! A missing baseline is an error — the harness never substitutes a
//! default for T1, which would silently fabricate speedups.

use super::grouping::best_per_thread;
use crate::error::HarnessError;
use crate::experiment::{Chunk, Schedule, Topology};
use crate::ledger::Measurement;

// =================================================================================================
// Scaling Point
// =================================================================================================

/// One thread count of a group's best-configuration series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingPoint {
    pub threads: u32,

    /// Chunk that won best-configuration selection at this thread count
    pub chunk: Chunk,

    /// Aggregated elapsed time in seconds
    pub time: f64,

    /// Mean of the repetition timings
    pub time_mean: f64,

    /// Standard deviation of the repetition timings
    pub time_std: f64,

    pub speedup: f64,
    pub speedup_err: f64,
    pub efficiency: f64,
    pub efficiency_err: f64,
}

/// Best-configuration scaling series of one `(topology, schedule)` pair,
/// sorted by thread count ascending.
#[derive(Debug, Clone)]
pub struct ScalingCurve {
    pub topology: Topology,
    pub schedule: Schedule,
    pub points: Vec<ScalingPoint>,
}

impl ScalingCurve {
    /// Thread counts of the curve, ascending.
    pub fn thread_counts(&self) -> Vec<u32> {
        self.points.iter().map(|p| p.threads).collect()
    }
}

// =================================================================================================
// Curve Computation
// =================================================================================================

/// Compute the scaling curve of one group.
///
/// Selects the best chunk per thread count, locates the single-thread
/// baseline (failing with [`HarnessError::MissingBaseline`] when
/// absent), and derives speedup/efficiency with propagated errors.
pub fn scaling_curve(
    topology: Topology,
    schedule: Schedule,
    rows: &[Measurement],
) -> Result<ScalingCurve, HarnessError> {
    let best = best_per_thread(rows);
    let baseline = best
        .iter()
        .find(|m| m.threads == 1)
        .ok_or(HarnessError::MissingBaseline { topology, schedule })?
        .clone();

    let points = best
        .iter()
        .map(|sample| {
            let speedup = baseline.time_sec / sample.time_sec;
            let efficiency = speedup / f64::from(sample.threads);
            let speedup_err = propagate_ratio_error(speedup, &baseline, sample);
            ScalingPoint {
                threads: sample.threads,
                chunk: sample.chunk,
                time: sample.time_sec,
                time_mean: sample.time_mean,
                time_std: sample.time_std,
                speedup,
                speedup_err,
                efficiency,
                efficiency_err: speedup_err / f64::from(sample.threads),
            }
        })
        .collect();

    Ok(ScalingCurve {
        topology,
        schedule,
        points,
    })
}

/// σ_S = S · sqrt((σ1/T1)² + (σp/Tp)²), using the repetition means as
/// the reference times. Zero when neither side carries spread data.
fn propagate_ratio_error(speedup: f64, baseline: &Measurement, sample: &Measurement) -> f64 {
    if baseline.time_std <= 0.0 && sample.time_std <= 0.0 {
        return 0.0;
    }
    let rel_baseline = relative_spread(baseline);
    let rel_sample = relative_spread(sample);
    speedup * (rel_baseline * rel_baseline + rel_sample * rel_sample).sqrt()
}

fn relative_spread(m: &Measurement) -> f64 {
    if m.time_mean > 0.0 {
        m.time_std / m.time_mean
    } else {
        0.0
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::GridSize;

    fn row(threads: u32, time_sec: f64, time_std: f64) -> Measurement {
        Measurement {
            label: "2d_case".to_string(),
            topology: Topology::TwoD,
            size: GridSize::Plane { lx: 256, ly: 256 },
            steps: 1000,
            schedule: Schedule::Static,
            chunk: Chunk::Fixed(512),
            threads,
            time_sec,
            time_mean: time_sec,
            time_std,
            energy_first: None,
            energy_last: None,
            energy_lines: 0,
            stdout_last: String::new(),
            stderr_last: String::new(),
        }
    }

    #[test]
    fn test_baseline_speedup_is_exactly_one() {
        let rows = vec![row(1, 10.0, 0.0), row(2, 5.5, 0.0)];
        let curve = scaling_curve(Topology::TwoD, Schedule::Static, &rows).unwrap();
        assert_eq!(curve.points[0].speedup, 1.0);
        assert_eq!(curve.points[0].efficiency, 1.0);
    }

    #[test]
    fn test_efficiency_is_speedup_over_threads_exactly() {
        let rows = vec![row(1, 10.0, 0.0), row(2, 5.5, 0.0), row(4, 3.2, 0.0)];
        let curve = scaling_curve(Topology::TwoD, Schedule::Static, &rows).unwrap();
        for point in &curve.points {
            assert_eq!(point.efficiency, point.speedup / f64::from(point.threads));
        }
    }

    #[test]
    fn test_missing_baseline_is_an_error() {
        let rows = vec![row(2, 5.5, 0.0), row(4, 3.2, 0.0)];
        let err = scaling_curve(Topology::TwoD, Schedule::Static, &rows).unwrap_err();
        assert!(matches!(err, HarnessError::MissingBaseline { .. }));
    }

    #[test]
    fn test_error_propagation_formula() {
        // T1 = 10 ± 0.5, T2 = 5 ± 0.2  →  S = 2,
        // σ_S = 2·sqrt(0.05² + 0.04²) = 2·sqrt(0.0041)
        let rows = vec![row(1, 10.0, 0.5), row(2, 5.0, 0.2)];
        let curve = scaling_curve(Topology::TwoD, Schedule::Static, &rows).unwrap();
        let point = &curve.points[1];
        let expected = 2.0 * (0.05f64.powi(2) + 0.04f64.powi(2)).sqrt();
        assert!((point.speedup_err - expected).abs() < 1e-12);
        assert!((point.efficiency_err - expected / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_no_spread_data_means_zero_errors() {
        let rows = vec![row(1, 10.0, 0.0), row(4, 3.2, 0.0)];
        let curve = scaling_curve(Topology::TwoD, Schedule::Static, &rows).unwrap();
        assert!(curve.points.iter().all(|p| p.speedup_err == 0.0));
        assert!(curve.points.iter().all(|p| p.efficiency_err == 0.0));
    }

    #[test]
    fn test_points_sorted_by_threads() {
        let rows = vec![row(8, 2.0, 0.0), row(1, 10.0, 0.0), row(4, 3.2, 0.0)];
        let curve = scaling_curve(Topology::TwoD, Schedule::Static, &rows).unwrap();
        assert_eq!(curve.thread_counts(), vec![1, 4, 8]);
    }
}
