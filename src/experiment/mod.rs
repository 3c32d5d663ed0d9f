//! Experiment definitions
//!
//! This module defines WHAT the harness measures:
//!
//! - **`scenario`**: the declarative experiment model
//!   - `Scenario`: one family of runs (topology, size, schedule,
//!     candidate chunks, candidate thread counts)
//!   - `Topology`, `GridSize`, `Schedule`, `Chunk`: the typed vocabulary
//! - **`command`**: the pure mapping from a configuration to a simulator
//!   invocation
//! - **`presets`**: the built-in scenario matrix and TOML scenario files
//!
//! # Design
//!
//! A scenario is created once per experiment definition and never
//! mutated; many scenarios form one sweep. The same scenario can be
//! measured under different run options (warm-up count, repetitions,
//! aggregator): that is the execution engine's concern, not the
//! scenario's.

// =================================================================================================
// Module Declarations
// =================================================================================================

mod command;
pub mod presets;
mod scenario;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use command::{build_command, locate_simulator, Invocation, SIMULATOR_CANDIDATES};
pub use scenario::{Chunk, GridSize, Scenario, Schedule, Topology};
