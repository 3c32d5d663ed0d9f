//! Experiment scenario definition
//!
//! A scenario describes one family of simulator runs: the network
//! topology and size, the OpenMP schedule, and the candidate chunk sizes
//! and thread counts to sweep over.
//!
//! # Design
//!
//! The same scenario is expanded into one configuration per
//! `(chunk, threads)` pair by the sweep driver. This is the "WHAT to
//! measure" (not "HOW to measure").
//!
//! Chunk is a tagged variant rather than free text: the simulator
//! accepts either a positive integer or the literal `auto`, and the
//! distinction survives command building, ledger storage, and sort-key
//! computation (`auto` orders after every fixed value).

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =================================================================================================
// Topology
// =================================================================================================

/// Network topology of the simulated medium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topology {
    /// One-dimensional chain (`--network 1d`)
    OneD,

    /// Two-dimensional lattice (`--network 2d`)
    TwoD,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topology::OneD => write!(f, "1d"),
            Topology::TwoD => write!(f, "2d"),
        }
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1d" => Ok(Topology::OneD),
            "2d" => Ok(Topology::TwoD),
            other => Err(format!("unknown topology '{}' (expected 1d or 2d)", other)),
        }
    }
}

// =================================================================================================
// Grid Size
// =================================================================================================

/// Problem size, tagged by topology
///
/// The invariant "dimension keys match the topology" holds by
/// construction: a 1D scenario carries `n`, a 2D scenario carries
/// `lx`/`ly`, and no other combination exists.
///
/// # TOML representation
///
/// ```toml
/// size = { n = 20000 }          # 1D
/// size = { lx = 256, ly = 256 } # 2D
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridSize {
    /// 1D chain of `n` nodes
    Line { n: u32 },

    /// 2D lattice of `lx` × `ly` nodes
    Plane { lx: u32, ly: u32 },
}

impl GridSize {
    /// Topology implied by the size variant
    pub fn topology(&self) -> Topology {
        match self {
            GridSize::Line { .. } => Topology::OneD,
            GridSize::Plane { .. } => Topology::TwoD,
        }
    }

    /// Total number of nodes
    pub fn nodes(&self) -> u64 {
        match self {
            GridSize::Line { n } => u64::from(*n),
            GridSize::Plane { lx, ly } => u64::from(*lx) * u64::from(*ly),
        }
    }

    /// Validate that every dimension is positive
    pub fn validate(&self) -> Result<(), String> {
        match self {
            GridSize::Line { n } if *n == 0 => Err("N must be positive".to_string()),
            GridSize::Plane { lx, ly } if *lx == 0 || *ly == 0 => {
                Err("Lx and Ly must be positive".to_string())
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridSize::Line { n } => write!(f, "N={}", n),
            GridSize::Plane { lx, ly } => write!(f, "{}x{}", lx, ly),
        }
    }
}

// =================================================================================================
// Schedule
// =================================================================================================

/// OpenMP loop schedule of the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    Static,
    Dynamic,
    Guided,
}

impl Schedule {
    /// All schedules, in the order analysis tables report them
    pub const ALL: [Schedule; 3] = [Schedule::Static, Schedule::Dynamic, Schedule::Guided];
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schedule::Static => write!(f, "static"),
            Schedule::Dynamic => write!(f, "dynamic"),
            Schedule::Guided => write!(f, "guided"),
        }
    }
}

impl FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "static" => Ok(Schedule::Static),
            "dynamic" => Ok(Schedule::Dynamic),
            "guided" => Ok(Schedule::Guided),
            other => Err(format!(
                "unknown schedule '{}' (expected static, dynamic or guided)",
                other
            )),
        }
    }
}

// =================================================================================================
// Chunk
// =================================================================================================

/// Chunk size passed to the simulator's `--chunk` flag
///
/// Either a fixed positive integer or the literal `auto` (the simulator
/// picks its own chunking). `Auto` orders after every fixed value so
/// that chunk-sweep tables list numeric chunks ascending with `auto`
/// last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chunk {
    /// Explicit chunk size
    Fixed(u32),

    /// Let the simulator choose (`--chunk auto`)
    Auto,
}

impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Chunk::Fixed(a), Chunk::Fixed(b)) => a.cmp(b),
            (Chunk::Fixed(_), Chunk::Auto) => Ordering::Less,
            (Chunk::Auto, Chunk::Fixed(_)) => Ordering::Greater,
            (Chunk::Auto, Chunk::Auto) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chunk::Fixed(value) => write!(f, "{}", value),
            Chunk::Auto => write!(f, "auto"),
        }
    }
}

impl FromStr for Chunk {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "auto" {
            return Ok(Chunk::Auto);
        }
        match s.parse::<u32>() {
            Ok(0) => Err("chunk must be positive".to_string()),
            Ok(value) => Ok(Chunk::Fixed(value)),
            Err(_) => Err(format!("invalid chunk '{}' (expected integer or auto)", s)),
        }
    }
}

impl Serialize for Chunk {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Chunk::Fixed(value) => serializer.serialize_u32(*value),
            Chunk::Auto => serializer.serialize_str("auto"),
        }
    }
}

impl<'de> Deserialize<'de> for Chunk {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChunkVisitor;

        impl Visitor<'_> for ChunkVisitor {
            type Value = Chunk;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a positive integer or the string \"auto\"")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Chunk, E> {
                if value == 0 || value > u64::from(u32::MAX) {
                    return Err(E::custom(format!("chunk {} out of range", value)));
                }
                Ok(Chunk::Fixed(value as u32))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Chunk, E> {
                if value <= 0 {
                    return Err(E::custom(format!("chunk {} must be positive", value)));
                }
                self.visit_u64(value as u64)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Chunk, E> {
                value.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(ChunkVisitor)
    }
}

// =================================================================================================
// Scenario
// =================================================================================================

/// One declared experiment family
///
/// # Examples
///
/// ```rust
/// use wavebench_rs::experiment::{Chunk, GridSize, Scenario, Schedule};
///
/// let scenario = Scenario {
///     label: "2d_dynamic_chunk_sweep".to_string(),
///     size: GridSize::Plane { lx: 256, ly: 256 },
///     schedule: Schedule::Dynamic,
///     chunks: vec![Chunk::Fixed(128), Chunk::Fixed(256), Chunk::Auto],
///     threads: vec![8],
///     steps: 1000,
///     extra: Default::default(),
/// };
/// assert!(scenario.validate().is_ok());
/// assert_eq!(scenario.configurations(), 3);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique label, used in ledger rows and relocated trace names
    pub label: String,

    /// Problem size (implies the topology)
    pub size: GridSize,

    /// OpenMP schedule under test
    pub schedule: Schedule,

    /// Candidate chunk sizes, in sweep order
    pub chunks: Vec<Chunk>,

    /// Candidate thread counts, in sweep order
    pub threads: Vec<u32>,

    /// Number of simulation steps per run
    #[serde(default = "Scenario::default_steps")]
    pub steps: u32,

    /// Pass-through physics parameters (`S0`, `omega`, `gamma`, ...),
    /// emitted as `--<key> <value>` flags in sorted order
    #[serde(default)]
    pub extra: BTreeMap<String, f64>,
}

impl Scenario {
    fn default_steps() -> u32 {
        1000
    }

    /// Topology implied by the grid size
    pub fn topology(&self) -> Topology {
        self.size.topology()
    }

    /// Number of configurations this scenario expands into
    pub fn configurations(&self) -> usize {
        self.chunks.len() * self.threads.len()
    }

    /// Verify scenario content before sweeping
    pub fn validate(&self) -> Result<(), String> {
        if self.label.trim().is_empty() {
            return Err("scenario label must not be empty".to_string());
        }
        self.size.validate()?;
        if self.chunks.is_empty() {
            return Err(format!("scenario '{}' has no chunk candidates", self.label));
        }
        if self.threads.is_empty() {
            return Err(format!("scenario '{}' has no thread candidates", self.label));
        }
        if self.threads.iter().any(|&t| t == 0) {
            return Err(format!("scenario '{}' has a zero thread count", self.label));
        }
        if self.steps == 0 {
            return Err(format!("scenario '{}' has zero steps", self.label));
        }
        for (key, value) in &self.extra {
            if !value.is_finite() {
                return Err(format!(
                    "scenario '{}': parameter {} is not finite",
                    self.label, key
                ));
            }
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep_scenario() -> Scenario {
        Scenario {
            label: "2d_dynamic_chunk_sweep".to_string(),
            size: GridSize::Plane { lx: 256, ly: 256 },
            schedule: Schedule::Dynamic,
            chunks: vec![Chunk::Fixed(128), Chunk::Fixed(256), Chunk::Auto],
            threads: vec![1, 8],
            steps: 1000,
            extra: BTreeMap::new(),
        }
    }

    #[test]
    fn test_chunk_ordering_puts_auto_last() {
        let mut chunks = vec![Chunk::Auto, Chunk::Fixed(512), Chunk::Fixed(128)];
        chunks.sort();
        assert_eq!(
            chunks,
            vec![Chunk::Fixed(128), Chunk::Fixed(512), Chunk::Auto]
        );
    }

    #[test]
    fn test_chunk_display_parse_round_trip() {
        for chunk in [Chunk::Fixed(1), Chunk::Fixed(512), Chunk::Auto] {
            let text = chunk.to_string();
            assert_eq!(text.parse::<Chunk>().unwrap(), chunk);
        }
        assert!("0".parse::<Chunk>().is_err());
        assert!("fast".parse::<Chunk>().is_err());
    }

    #[test]
    fn test_grid_size_implies_topology() {
        assert_eq!(GridSize::Line { n: 20000 }.topology(), Topology::OneD);
        assert_eq!(
            GridSize::Plane { lx: 256, ly: 256 }.topology(),
            Topology::TwoD
        );
    }

    #[test]
    fn test_scenario_validation() {
        let scenario = sweep_scenario();
        assert!(scenario.validate().is_ok());
        assert_eq!(scenario.configurations(), 6);

        let mut bad = sweep_scenario();
        bad.threads = vec![];
        assert!(bad.validate().is_err());

        let mut bad = sweep_scenario();
        bad.threads = vec![0];
        assert!(bad.validate().is_err());

        let mut bad = sweep_scenario();
        bad.size = GridSize::Plane { lx: 0, ly: 256 };
        assert!(bad.validate().is_err());

        let mut bad = sweep_scenario();
        bad.extra.insert("gamma".to_string(), f64::NAN);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_scenario_toml_round_trip() {
        let text = r#"
            label = "1d_large_better"
            size = { n = 200000 }
            schedule = "dynamic"
            chunks = [256, "auto"]
            threads = [1, 2, 4]

            [extra]
            gamma = 0.01
        "#;
        let scenario: Scenario = toml::from_str(text).unwrap();
        assert_eq!(scenario.topology(), Topology::OneD);
        assert_eq!(scenario.steps, 1000, "steps should default to 1000");
        assert_eq!(scenario.chunks, vec![Chunk::Fixed(256), Chunk::Auto]);
        assert_eq!(scenario.extra.get("gamma"), Some(&0.01));
    }
}
