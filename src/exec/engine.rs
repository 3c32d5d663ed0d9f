//! Execution engine
//!
//! Runs the simulator once per configuration cell: a configurable
//! number of warm-up runs whose timings are discarded (but whose exit
//! status is still checked), followed by the timed repetitions that
//! feed the aggregator.
//!
//! # Timing
//!
//! Each sample spans process launch to process exit, measured with
//! `Instant` immediately around the subprocess lifetime. Output capture
//! buffers are set up before the stopwatch starts; trace harvesting
//! happens after it stops.
//!
//! # Bounded Wait
//!
//! The simulator imposes no timeout of its own; a hung process would
//! block the sweep indefinitely. `RunOptions::timeout` installs an
//! optional deadline: the engine polls the child and kills it when the
//! limit is exceeded, reporting [`HarnessError::Timeout`]. The default
//! (`None`) preserves the unbounded wait.

use std::io;
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::debug;

use super::aggregate::{Aggregator, TimingStats};
use super::claim::TraceClaim;
use crate::error::{HarnessError, RunContext};
use crate::experiment::Invocation;
use crate::trace::TraceSummary;

/// How often the bounded wait polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

// =================================================================================================
// Run Options
// =================================================================================================

/// Measurement-collection protocol for one sweep.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Discarded priming runs before the measured repetitions
    pub warmup: usize,

    /// Timed repetitions per configuration (at least 1)
    pub repeats: usize,

    /// Reduction applied to the repetition timings
    pub aggregator: Aggregator,

    /// Optional bounded wait per run; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            warmup: 1,
            repeats: 3,
            aggregator: Aggregator::Median,
            timeout: None,
        }
    }
}

// =================================================================================================
// Timed Run
// =================================================================================================

/// Result of measuring one configuration.
#[derive(Debug, Clone)]
pub struct TimedRun {
    /// Aggregate and distribution statistics over the repetitions
    pub stats: TimingStats,

    /// Raw per-repetition wall-clock samples in seconds
    pub samples: Vec<f64>,

    /// Final non-empty stdout line of the last repetition
    pub stdout_last: String,

    /// Final non-empty stderr line of the last repetition
    pub stderr_last: String,
}

/// One subprocess execution, already status-checked.
struct SingleRun {
    elapsed: f64,
    stdout_last: String,
    stderr_last: String,
}

// =================================================================================================
// Execution Engine
// =================================================================================================

/// Sequential executor of simulator invocations.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionEngine {
    options: RunOptions,
}

impl ExecutionEngine {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Measure one configuration: warm-ups, then timed repetitions.
    ///
    /// Fails on the first non-zero exit (warm-up included), surfacing
    /// the captured stderr tail for diagnosis.
    pub fn measure(
        &self,
        invocation: &Invocation,
        context: &RunContext,
    ) -> Result<TimedRun, HarnessError> {
        for i in 0..self.options.warmup {
            let run = self.run_once(invocation, context)?;
            debug!(
                "warmup {}/{} for {}: {:.3} s (discarded)",
                i + 1,
                self.options.warmup,
                context,
                run.elapsed
            );
        }

        let mut samples = Vec::with_capacity(self.options.repeats);
        let mut stdout_last = String::new();
        let mut stderr_last = String::new();
        for i in 0..self.options.repeats {
            let run = self.run_once(invocation, context)?;
            debug!(
                "repeat {}/{} for {}: {:.3} s",
                i + 1,
                self.options.repeats,
                context,
                run.elapsed
            );
            samples.push(run.elapsed);
            stdout_last = run.stdout_last;
            stderr_last = run.stderr_last;
        }

        let stats = TimingStats::from_samples(&samples, self.options.aggregator);
        Ok(TimedRun {
            stats,
            samples,
            stdout_last,
            stderr_last,
        })
    }

    /// Measure one configuration while exclusively owning the shared
    /// trace path, then harvest the trace to `dest_name`.
    ///
    /// The claim is taken before the first warm-up and released on all
    /// exit paths; see [`TraceClaim`].
    pub fn measure_with_trace(
        &self,
        invocation: &Invocation,
        context: &RunContext,
        results_dir: &Path,
        dest_name: &str,
    ) -> Result<(TimedRun, TraceSummary), HarnessError> {
        let claim = TraceClaim::claim(results_dir)?;
        let run = self.measure(invocation, context)?;
        let summary = claim.harvest(dest_name)?;
        Ok((run, summary))
    }

    /// Launch, wait, time and status-check one subprocess execution.
    fn run_once(
        &self,
        invocation: &Invocation,
        context: &RunContext,
    ) -> Result<SingleRun, HarnessError> {
        let start = Instant::now();
        let child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                if err.kind() == io::ErrorKind::NotFound {
                    HarnessError::CollaboratorNotFound {
                        path: invocation.program.clone(),
                    }
                } else {
                    HarnessError::Io(err)
                }
            })?;

        let output = match self.options.timeout {
            None => child.wait_with_output()?,
            Some(limit) => wait_with_deadline(child, limit, context)?,
        };
        let elapsed = start.elapsed().as_secs_f64();

        if !output.status.success() {
            return Err(HarnessError::Execution {
                context: context.clone(),
                status: output.status.to_string(),
                stderr_tail: last_line(&output.stderr),
            });
        }

        Ok(SingleRun {
            elapsed,
            stdout_last: last_line(&output.stdout),
            stderr_last: last_line(&output.stderr),
        })
    }
}

/// Poll the child until exit or deadline; kill and report on deadline.
fn wait_with_deadline(
    mut child: Child,
    limit: Duration,
    context: &RunContext,
) -> Result<Output, HarnessError> {
    let deadline = Instant::now() + limit;
    loop {
        match child.try_wait()? {
            // Exited: collect remaining pipe contents and the status.
            Some(_) => return Ok(child.wait_with_output()?),
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(HarnessError::Timeout {
                    context: context.clone(),
                    limit_secs: limit.as_secs(),
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}

/// Final non-empty line of a captured stream, trimmed.
fn last_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}

// =================================================================================================
// Tests
// =================================================================================================
