//! Scoped ownership of the shared trace-file path
//!
//! The simulator writes its energy trace to a single well-known path in
//! the results directory, overwriting it on every run. [`TraceClaim`]
//! makes that global mutable path a resource the execution engine
//! exclusively owns for the duration of one invocation:
//!
//! 1. claim — remove any stale trace left by a previous configuration
//! 2. run — the simulator (re)writes the trace
//! 3. harvest — parse the summary and relocate the file to a unique
//!    per-configuration name
//! 4. release — guaranteed on all exit paths; an unharvested claim
//!    removes the leftover trace on drop so it is never visible to the
//!    next configuration

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::trace::TraceSummary;

/// File name the simulator writes its energy trace to, relative to the
/// results directory.
pub const TRACE_FILE: &str = "energy_trace.dat";

// =================================================================================================
// Trace Claim
// =================================================================================================

/// Exclusive ownership of `<results>/energy_trace.dat` for one
/// invocation.
#[derive(Debug)]
pub struct TraceClaim {
    trace_path: PathBuf,
    released: bool,
}

impl TraceClaim {
    /// Claim the trace path under `results_dir`.
    ///
    /// Creates the results directory when missing and removes any stale
    /// trace file, so readings can never leak across configurations.
    pub fn claim(results_dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(results_dir)?;
        let trace_path = results_dir.join(TRACE_FILE);
        if trace_path.exists() {
            fs::remove_file(&trace_path)?;
        }
        Ok(Self {
            trace_path,
            released: false,
        })
    }

    /// The claimed path (where the simulator will write).
    pub fn path(&self) -> &Path {
        &self.trace_path
    }

    /// Parse the trace and relocate it to `dest_name` in the same
    /// directory, consuming the claim.
    ///
    /// An absent trace yields an empty summary and relocates nothing —
    /// the caller decides whether missing data is acceptable.
    pub fn harvest(mut self, dest_name: &str) -> io::Result<TraceSummary> {
        let summary = TraceSummary::parse(&self.trace_path)?;
        if self.trace_path.exists() {
            let dest = self.trace_path.with_file_name(dest_name);
            relocate(&self.trace_path, &dest)?;
        }
        self.released = true;
        Ok(summary)
    }
}

impl Drop for TraceClaim {
    fn drop(&mut self) {
        // Failure path: the run errored before harvest. Remove the
        // half-written trace so the next configuration starts clean.
        if !self.released && self.trace_path.exists() {
            let _ = fs::remove_file(&self.trace_path);
        }
    }
}

/// Rename with a copy-and-remove fallback for filesystems where rename
/// across mount points fails.
fn relocate(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(src, dest)?;
            fs::remove_file(src)
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
