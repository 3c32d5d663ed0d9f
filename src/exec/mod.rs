//! Execution engine
//!
//! This module handles HOW measurements are taken:
//!
//! - **`aggregate`**: reduction of repeated timing samples into one
//!   measurement (median or minimum) plus mean/stddev for uncertainty
//! - **`claim`**: scoped exclusive ownership of the shared trace-file
//!   path during one invocation
//! - **`engine`**: warm-up, timed repetitions, output capture, optional
//!   bounded wait
//! - **`sweep`**: the sequential driver expanding scenarios into
//!   configurations and appending ledger rows
//!
//! # Sequential-Access Hazard
//!
//! The simulator overwrites `energy_trace.dat` in the results directory
//! on every run. The engine therefore serialises invocations: it claims
//! the trace path before the first warm-up, and relocates the harvest to
//! a per-configuration name before the next configuration starts. The
//! claim releases the path on all exit paths, including failure, so a
//! stale trace is never visible to the next configuration.
//!
//! # Timing Discipline
//!
//! The stopwatch spans process launch to process exit only. Trace
//! parsing and relocation happen outside the timed region, keeping the
//! measurement a property of the simulator alone.

// =================================================================================================
// Module Declarations
// =================================================================================================

mod aggregate;
mod claim;
mod engine;
mod sweep;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use aggregate::{Aggregator, TimingStats};
pub use claim::{TraceClaim, TRACE_FILE};
pub use engine::{ExecutionEngine, RunOptions, TimedRun};
pub use sweep::{SweepRunner, SweepSummary};
