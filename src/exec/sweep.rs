//! Sweep driver
//!
//! Expands a scenario list into configurations, measures each one
//! through the execution engine, and appends one ledger row per
//! configuration. Strictly sequential: the shared trace path allows at
//! most one simulator process in flight per results directory.
//!
//! # Failure Policy
//!
//! - A missing simulator binary aborts construction — it would
//!   invalidate every subsequent run.
//! - A failing configuration aborts the sweep by default; with
//!   `keep_going` the failure is logged with its exact cell and the
//!   sweep continues, so one broken configuration cannot sink an
//!   overnight campaign.
//! - Rows already appended stay in the ledger either way; a rerun
//!   resumes by re-measuring only what is missing (the analysis side
//!   resolves duplicate keys by keeping the most recent row).

use std::path::{Path, PathBuf};

use log::{error, info};

use super::engine::{ExecutionEngine, RunOptions};
use crate::error::{HarnessError, RunContext};
use crate::experiment::{Invocation, Scenario};
use crate::ledger::{Ledger, Measurement};

// =================================================================================================
// Sweep Summary
// =================================================================================================

/// Counters reported after a sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Configurations measured and appended to the ledger
    pub completed: usize,

    /// Configurations skipped after a failure (`keep_going` only)
    pub skipped: usize,
}

// =================================================================================================
// Sweep Runner
// =================================================================================================

/// Sequential sweep coordinator.
#[derive(Debug)]
pub struct SweepRunner {
    exe: PathBuf,
    results_dir: PathBuf,
    engine: ExecutionEngine,
    keep_going: bool,
}

impl SweepRunner {
    /// Create a runner for a simulator binary.
    ///
    /// Fails with [`HarnessError::CollaboratorNotFound`] when the binary
    /// does not exist — every run would fail the same way.
    pub fn new(
        exe: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        options: RunOptions,
        keep_going: bool,
    ) -> Result<Self, HarnessError> {
        let exe = exe.into();
        if !exe.is_file() {
            return Err(HarnessError::CollaboratorNotFound { path: exe });
        }
        Ok(Self {
            exe,
            results_dir: results_dir.into(),
            engine: ExecutionEngine::new(options),
            keep_going,
        })
    }

    /// Results directory this runner measures into.
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Run every configuration of every scenario, appending to `ledger`.
    pub fn run(
        &self,
        scenarios: &[Scenario],
        ledger: &Ledger,
    ) -> Result<SweepSummary, HarnessError> {
        let mut summary = SweepSummary::default();

        for scenario in scenarios {
            debug_assert!(scenario.validate().is_ok(), "unvalidated scenario in sweep");
            for &chunk in &scenario.chunks {
                for &threads in &scenario.threads {
                    let context = RunContext {
                        label: scenario.label.clone(),
                        chunk,
                        threads,
                    };
                    match self.measure_cell(scenario, &context) {
                        Ok(measurement) => {
                            info!(
                                "OK: {} -> {:.6} s",
                                context, measurement.time_sec
                            );
                            ledger.append(&measurement)?;
                            summary.completed += 1;
                        }
                        Err(err @ HarnessError::CollaboratorNotFound { .. }) => {
                            // Launch failures invalidate the rest of the sweep.
                            return Err(err);
                        }
                        Err(err) if self.keep_going => {
                            error!("skipping {}: {}", context, err);
                            summary.skipped += 1;
                        }
                        Err(err) => {
                            error!(
                                "sweep aborted after {} ledger rows: {}",
                                summary.completed, err
                            );
                            return Err(err);
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Measure one cell of the matrix and build its ledger row.
    fn measure_cell(
        &self,
        scenario: &Scenario,
        context: &RunContext,
    ) -> Result<Measurement, HarnessError> {
        let invocation = Invocation::new(&self.exe, scenario, context.chunk, context.threads);
        let dest_name = format!(
            "energy_{}_chunk{}_t{}.dat",
            scenario.label, context.chunk, context.threads
        );
        let (run, trace) =
            self.engine
                .measure_with_trace(&invocation, context, &self.results_dir, &dest_name)?;

        Ok(Measurement {
            label: scenario.label.clone(),
            topology: scenario.topology(),
            size: scenario.size,
            steps: scenario.steps,
            schedule: scenario.schedule,
            chunk: context.chunk,
            threads: context.threads,
            time_sec: run.stats.aggregate,
            time_mean: run.stats.mean,
            time_std: run.stats.std,
            energy_first: trace.first,
            energy_last: trace.last,
            energy_lines: trace.valid_lines,
            stdout_last: run.stdout_last,
            stderr_last: run.stderr_last,
        })
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_rejected_at_construction() {
        let err = SweepRunner::new(
            "definitely/not/wave_propagation",
            "results",
            RunOptions::default(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, HarnessError::CollaboratorNotFound { .. }));
    }

    #[test]
    fn test_summary_default_is_zeroed() {
        let summary = SweepSummary::default();
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.skipped, 0);
    }
}
