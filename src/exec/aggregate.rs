//! Timing-sample aggregation
//!
//! Repeated wall-clock samples are reduced to a single measurement by
//! the selected aggregator. Median is the default because it is robust
//! to occasional scheduling-induced outliers; minimum is offered for
//! scenarios where the best-case time is the figure of interest.
//!
//! Mean and standard deviation are computed alongside regardless of the
//! aggregator, so the analysis engine can propagate timing uncertainty
//! into speedup and efficiency errors.

use std::fmt;
use std::str::FromStr;

// =================================================================================================
// Aggregator
// =================================================================================================

/// Reduction applied to repeated timing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregator {
    /// Median of the samples (robust default)
    #[default]
    Median,

    /// Minimum of the samples (best-case time)
    Minimum,
}

impl fmt::Display for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregator::Median => write!(f, "median"),
            Aggregator::Minimum => write!(f, "min"),
        }
    }
}

impl FromStr for Aggregator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "median" => Ok(Aggregator::Median),
            "min" | "minimum" => Ok(Aggregator::Minimum),
            other => Err(format!(
                "unknown aggregator '{}' (expected median or min)",
                other
            )),
        }
    }
}

// =================================================================================================
// Timing Statistics
// =================================================================================================

/// Aggregate plus distribution statistics of one configuration's samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingStats {
    /// The selected aggregate (median or minimum) in seconds
    pub aggregate: f64,

    /// Arithmetic mean of the samples in seconds
    pub mean: f64,

    /// Population standard deviation of the samples in seconds
    /// (zero for a single sample)
    pub std: f64,
}

impl TimingStats {
    /// Reduce a non-empty sample set.
    ///
    /// # Panics
    ///
    /// Panics when `samples` is empty; the execution engine always
    /// collects at least one repetition.
    pub fn from_samples(samples: &[f64], aggregator: Aggregator) -> Self {
        assert!(
            !samples.is_empty(),
            "timing aggregation needs at least one sample"
        );

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance = samples
            .iter()
            .map(|value| {
                let diff = value - mean;
                diff * diff
            })
            .sum::<f64>()
            / samples.len() as f64;

        let aggregate = match aggregator {
            Aggregator::Median => median(samples),
            Aggregator::Minimum => samples.iter().copied().fold(f64::INFINITY, f64::min),
        };

        Self {
            aggregate,
            mean,
            std: variance.sqrt(),
        }
    }
}

/// Median of an unsorted sample set (mean of the middle pair for even
/// counts).
fn median(samples: &[f64]) -> f64 {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

// =================================================================================================
// Tests
// =================================================================================================
