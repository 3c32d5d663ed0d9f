//! Built-in scenario matrix and TOML scenario files
//!
//! The default matrix reproduces the standard measurement campaign for
//! the simulator: best-schedule scaling on the 2D lattice, a
//! deliberately poor static case for contrast, a chunk sweep at the
//! highest thread count, and two 1D cases showing how problem size
//! changes scaling behaviour.
//!
//! A TOML file with one `[[scenario]]` table per entry can replace the
//! built-in matrix:
//!
//! ```toml
//! [[scenario]]
//! label = "2d_dynamic_best"
//! size = { lx = 256, ly = 256 }
//! schedule = "dynamic"
//! chunks = [512]
//! threads = [1, 2, 4, 8]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::scenario::{Chunk, GridSize, Scenario, Schedule};

// =================================================================================================
// Default Matrix
// =================================================================================================

/// The built-in sweep matrix.
pub fn default_matrix() -> Vec<Scenario> {
    vec![
        Scenario {
            label: "2d_dynamic_best".to_string(),
            size: GridSize::Plane { lx: 256, ly: 256 },
            schedule: Schedule::Dynamic,
            chunks: vec![Chunk::Fixed(512)],
            threads: vec![1, 2, 4, 8],
            steps: 1000,
            extra: BTreeMap::new(),
        },
        Scenario {
            label: "2d_guided_alternative".to_string(),
            size: GridSize::Plane { lx: 256, ly: 256 },
            schedule: Schedule::Guided,
            chunks: vec![Chunk::Fixed(256)],
            threads: vec![1, 2, 4, 8],
            steps: 1000,
            extra: BTreeMap::new(),
        },
        Scenario {
            label: "2d_static_bad".to_string(),
            size: GridSize::Plane { lx: 256, ly: 256 },
            schedule: Schedule::Static,
            chunks: vec![Chunk::Fixed(512)],
            threads: vec![1, 8],
            steps: 1000,
            extra: BTreeMap::new(),
        },
        Scenario {
            label: "2d_dynamic_chunk_sweep".to_string(),
            size: GridSize::Plane { lx: 256, ly: 256 },
            schedule: Schedule::Dynamic,
            chunks: vec![
                Chunk::Fixed(128),
                Chunk::Fixed(256),
                Chunk::Fixed(512),
                Chunk::Auto,
            ],
            threads: vec![8],
            steps: 1000,
            extra: BTreeMap::new(),
        },
        Scenario {
            label: "1d_small_bad".to_string(),
            size: GridSize::Line { n: 20000 },
            schedule: Schedule::Static,
            chunks: vec![Chunk::Fixed(512)],
            threads: vec![1, 2, 4],
            steps: 1000,
            extra: BTreeMap::new(),
        },
        Scenario {
            label: "1d_large_better".to_string(),
            size: GridSize::Line { n: 200000 },
            schedule: Schedule::Dynamic,
            chunks: vec![Chunk::Fixed(256)],
            threads: vec![1, 2, 4],
            steps: 1000,
            extra: BTreeMap::new(),
        },
    ]
}

// =================================================================================================
// Scenario Files
// =================================================================================================

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "scenario")]
    scenarios: Vec<Scenario>,
}

/// Load a scenario list from a TOML file.
///
/// Every scenario is validated before the list is returned; the file
/// must contain at least one `[[scenario]]` entry.
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, String> {
    let contents = fs::read_to_string(path)
        .map_err(|err| format!("failed to read scenario file {}: {}", path.display(), err))?;
    let file: ScenarioFile = toml::from_str(&contents)
        .map_err(|err| format!("failed to parse scenario file {}: {}", path.display(), err))?;

    if file.scenarios.is_empty() {
        return Err(format!(
            "scenario file {} contains no [[scenario]] entries",
            path.display()
        ));
    }
    for scenario in &file.scenarios {
        scenario.validate()?;
    }
    Ok(file.scenarios)
}

// =================================================================================================
// Tests
// =================================================================================================
