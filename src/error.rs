//! Error taxonomy for the harness
//!
//! Every failure carries the specific configuration that produced it so
//! that a partially completed sweep can be resumed from the report alone.
//!
//! # Propagation Policy
//!
//! - A missing simulator binary invalidates every subsequent run and
//!   aborts the whole sweep.
//! - A non-zero exit from any run (warm-up included) is fatal by default;
//!   callers may opt into skip-and-continue.
//! - Analysis failures (`MissingBaseline`, `InsufficientData`) are scoped
//!   to their `(topology, schedule)` group and never abort unrelated
//!   groups.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::experiment::{Chunk, Schedule, Topology};

// =================================================================================================
// Run Context
// =================================================================================================

/// The configuration a failure is attributed to.
///
/// Rendered into every execution-side error message so the operator can
/// identify and rerun the exact failing cell of the sweep matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Scenario label (e.g. `2d_dynamic_best`)
    pub label: String,

    /// Chunk candidate under test
    pub chunk: Chunk,

    /// Thread count under test
    pub threads: u32,
}

impl fmt::Display for RunContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scenario '{}' (chunk={}, threads={})",
            self.label, self.chunk, self.threads
        )
    }
}

// =================================================================================================
// Harness Error
// =================================================================================================

/// All failure classes of the harness.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The simulator binary does not exist at the resolved path.
    ///
    /// Fatal: a missing binary invalidates every subsequent run.
    #[error(
        "simulator binary not found at '{}'; build the simulator first \
         or point --exe at an existing binary",
        path.display()
    )]
    CollaboratorNotFound { path: PathBuf },

    /// The simulator exited non-zero on some repetition (warm-up included).
    #[error("simulator exited with {status} for {context}; stderr: {stderr_tail}")]
    Execution {
        context: RunContext,
        /// Human-readable exit status (code or terminating signal).
        status: String,
        /// Final non-empty line of captured standard error.
        stderr_tail: String,
    },

    /// The simulator exceeded the configured time limit and was killed.
    #[error("simulator exceeded the {limit_secs} s time limit for {context}")]
    Timeout { context: RunContext, limit_secs: u64 },

    /// The ledger file is absent; analysis cannot proceed.
    #[error(
        "ledger not found at '{}'; run the sweep first: `cargo run --bin sweep`",
        path.display()
    )]
    LedgerMissing { path: PathBuf },

    /// No `threads == 1` measurement exists for the group.
    ///
    /// Fatal to that group's speedup computation only.
    #[error(
        "no single-thread baseline for {topology}/{schedule}; \
         speedup needs a threads=1 measurement in the group"
    )]
    MissingBaseline {
        topology: Topology,
        schedule: Schedule,
    },

    /// The group has no measurement with more than one thread.
    ///
    /// Fatal to that group's Amdahl fit only.
    #[error(
        "Amdahl fit for {topology}/{schedule} needs at least one \
         measurement with more than one thread"
    )]
    InsufficientData {
        topology: Topology,
        schedule: Schedule,
    },

    /// A sanity case produced no usable energy trace.
    #[error("no energy trace produced for '{name}' (expected at '{}')", path.display())]
    TraceMissing { name: String, path: PathBuf },

    /// Underlying I/O failure (ledger writes, trace relocation, spawning).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// Whether the failure is scoped to a single analysis group rather
    /// than the whole pass.
    pub fn is_group_scoped(&self) -> bool {
        matches!(
            self,
            HarnessError::MissingBaseline { .. } | HarnessError::InsufficientData { .. }
        )
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_context_display_names_the_cell() {
        let ctx = RunContext {
            label: "2d_dynamic_best".to_string(),
            chunk: Chunk::Fixed(512),
            threads: 8,
        };
        let text = ctx.to_string();
        assert!(text.contains("2d_dynamic_best"));
        assert!(text.contains("chunk=512"));
        assert!(text.contains("threads=8"));
    }

    #[test]
    fn test_group_scoped_classification() {
        let err = HarnessError::MissingBaseline {
            topology: Topology::TwoD,
            schedule: Schedule::Dynamic,
        };
        assert!(err.is_group_scoped());

        let err = HarnessError::CollaboratorNotFound {
            path: PathBuf::from("./wave_propagation"),
        };
        assert!(!err.is_group_scoped());
    }
}
