//! Simulator invocation builder
//!
//! Pure mapping from `(Scenario, chunk, threads)` to the simulator's
//! command line. Deterministic, no side effects.
//!
//! The builder never emits `--dump-frames` or `--frame-every`: the
//! harness always runs the simulator in its lightweight mode so that
//! timing measurements are not contaminated by per-step frame I/O.

use std::path::{Path, PathBuf};

use super::scenario::{Chunk, GridSize, Scenario};

// =================================================================================================
// Binary Autodetection
// =================================================================================================

/// Candidate names tried by [`locate_simulator`], in order.
pub const SIMULATOR_CANDIDATES: [&str; 4] = [
    "wave_propagation",
    "wave_propagation.exe",
    "./wave_propagation",
    "./wave_propagation.exe",
];

/// Try to autodetect the simulator executable in the working directory.
///
/// Returns the first candidate that exists as a regular file, or `None`
/// when the simulator has not been built yet.
pub fn locate_simulator() -> Option<PathBuf> {
    SIMULATOR_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.is_file())
}

// =================================================================================================
// Command Builder
// =================================================================================================

/// Build the simulator argument list for one configuration.
///
/// Flag order: `--network`, `--steps`, `--schedule`, `--chunk`,
/// `--threads`, then the topology-specific size flags (`--N` for 1D,
/// `--Lx`/`--Ly` for 2D), then every extra parameter as `--<key>
/// <value>` in sorted key order.
///
/// # Example
///
/// ```rust
/// use wavebench_rs::experiment::{build_command, Chunk, GridSize, Scenario, Schedule};
///
/// let scenario = Scenario {
///     label: "1d_small".to_string(),
///     size: GridSize::Line { n: 20000 },
///     schedule: Schedule::Static,
///     chunks: vec![Chunk::Fixed(512)],
///     threads: vec![4],
///     steps: 1000,
///     extra: Default::default(),
/// };
///
/// let args = build_command(&scenario, Chunk::Fixed(512), 4);
/// assert_eq!(args[0..2], ["--network".to_string(), "1d".to_string()]);
/// assert!(args.contains(&"--N".to_string()));
/// ```
pub fn build_command(scenario: &Scenario, chunk: Chunk, threads: u32) -> Vec<String> {
    let mut args = vec![
        "--network".to_string(),
        scenario.topology().to_string(),
        "--steps".to_string(),
        scenario.steps.to_string(),
        "--schedule".to_string(),
        scenario.schedule.to_string(),
        "--chunk".to_string(),
        chunk.to_string(),
        "--threads".to_string(),
        threads.to_string(),
    ];

    match scenario.size {
        GridSize::Line { n } => {
            args.push("--N".to_string());
            args.push(n.to_string());
        }
        GridSize::Plane { lx, ly } => {
            args.push("--Lx".to_string());
            args.push(lx.to_string());
            args.push("--Ly".to_string());
            args.push(ly.to_string());
        }
    }

    // BTreeMap iteration gives deterministic (sorted) flag order.
    for (key, value) in &scenario.extra {
        args.push(format!("--{}", key));
        args.push(value.to_string());
    }

    args
}

// =================================================================================================
// Invocation
// =================================================================================================

/// A fully resolved simulator invocation: binary plus argument list.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Path to the simulator binary
    pub program: PathBuf,

    /// Complete argument list for one configuration
    pub args: Vec<String>,
}

impl Invocation {
    /// Resolve one configuration of a scenario against a binary path.
    pub fn new(program: &Path, scenario: &Scenario, chunk: Chunk, threads: u32) -> Self {
        Self {
            program: program.to_path_buf(),
            args: build_command(scenario, chunk, threads),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
