//! Sanity validator
//!
//! Runs a small fixed set of known configurations through the execution
//! engine and checks physically-motivated expectations on the energy
//! trace:
//!
//! - **Undriven (decay) cases**: with damping and no external source,
//!   energy must fall from the first to the last reading. The validator
//!   reports the percentage drop.
//! - **Driven (source) cases**: an external drive makes the energy
//!   non-monotonic. The validator counts step-to-step increases and
//!   reports the ratio against total steps.
//!
//! These are diagnostic reports for human judgment, not gates: a
//! violated expectation never raises. The validator does raise when the
//! simulator itself fails to run or produces no usable trace at all.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;

use crate::error::{HarnessError, RunContext};
use crate::exec::{Aggregator, ExecutionEngine, RunOptions, TraceClaim};
use crate::experiment::{Chunk, GridSize, Invocation, Scenario, Schedule};
use crate::trace::read_series;

// =================================================================================================
// Cases
// =================================================================================================

/// Physical expectation class of a sanity case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseKind {
    /// Damped, undriven: energy should decay
    Decay,

    /// Externally driven: energy should be non-monotonic
    Driven,
}

/// One named sanity configuration.
#[derive(Debug, Clone)]
pub struct SanityCase {
    pub name: &'static str,
    pub kind: CaseKind,
    pub scenario: Scenario,
}

impl SanityCase {
    fn chunk(&self) -> Chunk {
        self.scenario.chunks[0]
    }

    fn threads(&self) -> u32 {
        self.scenario.threads[0]
    }
}

/// The fixed validation set: two decay cases (one per topology) and one
/// driven 1D case.
pub fn default_cases() -> Vec<SanityCase> {
    let decay_extras = |s0: f64, omega: f64| {
        let mut extra = std::collections::BTreeMap::new();
        extra.insert("gamma".to_string(), 0.01);
        extra.insert("S0".to_string(), s0);
        extra.insert("omega".to_string(), omega);
        extra
    };

    vec![
        SanityCase {
            name: "1d_decay",
            kind: CaseKind::Decay,
            scenario: Scenario {
                label: "1d_decay".to_string(),
                size: GridSize::Line { n: 20000 },
                schedule: Schedule::Dynamic,
                chunks: vec![Chunk::Fixed(256)],
                threads: vec![4],
                steps: 300,
                extra: decay_extras(0.0, 0.0),
            },
        },
        SanityCase {
            name: "2d_decay",
            kind: CaseKind::Decay,
            scenario: Scenario {
                label: "2d_decay".to_string(),
                size: GridSize::Plane { lx: 128, ly: 128 },
                schedule: Schedule::Dynamic,
                chunks: vec![Chunk::Fixed(256)],
                threads: vec![4],
                steps: 300,
                extra: decay_extras(0.0, 0.0),
            },
        },
        SanityCase {
            name: "1d_source",
            kind: CaseKind::Driven,
            scenario: Scenario {
                label: "1d_source".to_string(),
                size: GridSize::Line { n: 20000 },
                schedule: Schedule::Guided,
                chunks: vec![Chunk::Fixed(64)],
                threads: vec![4],
                steps: 300,
                extra: decay_extras(0.1, 0.5),
            },
        },
    ]
}

// =================================================================================================
// Metrics
// =================================================================================================

/// Percentage energy drop from first to last reading.
///
/// `None` when the series is empty or starts at non-positive energy
/// (the drop is undefined there, not zero).
pub fn energy_drop_percent(series: &[f64]) -> Option<f64> {
    let first = *series.first()?;
    let last = *series.last()?;
    if first > 0.0 {
        Some((first - last) / first * 100.0)
    } else {
        None
    }
}

/// `(rises, steps)`: step-to-step increases over total steps.
pub fn count_increases(series: &[f64]) -> (usize, usize) {
    let steps = series.len().saturating_sub(1);
    let rises = series.windows(2).filter(|pair| pair[1] > pair[0]).count();
    (rises, steps)
}

/// Diagnostic metric of one completed case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SanityMetric {
    /// Decay case: percentage drop, when defined
    EnergyDrop { percent: Option<f64> },

    /// Driven case: step-to-step increases over total steps
    Increases { rises: usize, steps: usize },
}

/// Report of one sanity case.
#[derive(Debug, Clone)]
pub struct SanityOutcome {
    pub name: &'static str,
    pub kind: CaseKind,

    /// Wall-clock run time in seconds
    pub elapsed: f64,

    /// Number of energy readings in the trace
    pub samples: usize,

    pub metric: SanityMetric,
}

// =================================================================================================
// Validator
// =================================================================================================

/// Runs the fixed case set against a simulator binary.
#[derive(Debug)]
pub struct SanityValidator {
    exe: PathBuf,
    results_dir: PathBuf,
    engine: ExecutionEngine,
}

impl SanityValidator {
    /// Create a validator; fails when the binary is missing.
    pub fn new(
        exe: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        timeout: Option<Duration>,
    ) -> Result<Self, HarnessError> {
        let exe = exe.into();
        if !exe.is_file() {
            return Err(HarnessError::CollaboratorNotFound { path: exe });
        }
        // One untimed-quality run per case: no warm-up, single repetition.
        let options = RunOptions {
            warmup: 0,
            repeats: 1,
            aggregator: Aggregator::Median,
            timeout,
        };
        Ok(Self {
            exe,
            results_dir: results_dir.into(),
            engine: ExecutionEngine::new(options),
        })
    }

    /// Run every default case, in order.
    pub fn run_all(&self) -> Result<Vec<SanityOutcome>, HarnessError> {
        default_cases()
            .iter()
            .map(|case| self.run_case(case))
            .collect()
    }

    /// Run one case and derive its diagnostic metric.
    pub fn run_case(&self, case: &SanityCase) -> Result<SanityOutcome, HarnessError> {
        let context = RunContext {
            label: case.scenario.label.clone(),
            chunk: case.chunk(),
            threads: case.threads(),
        };
        let invocation = Invocation::new(&self.exe, &case.scenario, case.chunk(), case.threads());

        let claim = TraceClaim::claim(&self.results_dir)?;
        let run = self.engine.measure(&invocation, &context)?;

        // Full series is needed for step-to-step analysis, so read it
        // before the harvest relocates the file.
        let series = read_series(claim.path())?;
        let trace_path = claim.path().to_path_buf();
        claim.harvest(&format!("sanity_{}.dat", case.name))?;

        if series.is_empty() {
            return Err(HarnessError::TraceMissing {
                name: case.name.to_string(),
                path: trace_path,
            });
        }

        let metric = match case.kind {
            CaseKind::Decay => SanityMetric::EnergyDrop {
                percent: energy_drop_percent(&series),
            },
            CaseKind::Driven => {
                let (rises, steps) = count_increases(&series);
                SanityMetric::Increases { rises, steps }
            }
        };
        info!("sanity case {} completed in {:.3} s", case.name, run.stats.aggregate);

        Ok(SanityOutcome {
            name: case.name,
            kind: case.kind,
            elapsed: run.stats.aggregate,
            samples: series.len(),
            metric,
        })
    }

    /// Results directory the harvested traces land in.
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_trace_reports_eighty_percent_drop() {
        let drop = energy_drop_percent(&[10.0, 8.0, 5.0, 2.0]).unwrap();
        assert!((drop - 80.0).abs() < 1e-12);
    }

    #[test]
    fn test_driven_trace_reports_two_of_three_increases() {
        let (rises, steps) = count_increases(&[10.0, 12.0, 9.0, 11.0]);
        assert_eq!((rises, steps), (2, 3));
    }

    #[test]
    fn test_drop_undefined_for_non_positive_start() {
        assert_eq!(energy_drop_percent(&[0.0, 1.0]), None);
        assert_eq!(energy_drop_percent(&[]), None);
    }

    #[test]
    fn test_increases_of_short_series() {
        assert_eq!(count_increases(&[]), (0, 0));
        assert_eq!(count_increases(&[5.0]), (0, 0));
    }

    #[test]
    fn test_default_cases_are_valid_scenarios() {
        let cases = default_cases();
        assert_eq!(cases.len(), 3);
        for case in &cases {
            case.scenario.validate().unwrap();
            assert_eq!(case.scenario.chunks.len(), 1);
            assert_eq!(case.scenario.threads.len(), 1);
        }
        // The driven case must actually drive the system.
        let driven = cases.iter().find(|c| c.kind == CaseKind::Driven).unwrap();
        assert_eq!(driven.scenario.extra.get("S0"), Some(&0.1));
        assert_eq!(driven.scenario.extra.get("omega"), Some(&0.5));
    }

    #[test]
    fn test_missing_binary_is_rejected() {
        let err = SanityValidator::new("no/such/simulator", "results", None).unwrap_err();
        assert!(matches!(err, HarnessError::CollaboratorNotFound { .. }));
    }
}
