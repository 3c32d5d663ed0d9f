//! Amdahl serial-fraction estimation
//!
//! Amdahl's law models the speedup of a program whose serial fraction
//! `f` cannot be parallelised:
//!
//! ```text
//! S(p) = 1 / (f + (1 − f)/p)
//! ```
//!
//! Inverting the law at each measured point with `p > 1` gives a
//! pointwise estimate
//!
//! ```text
//! f_i = (1/S_i − 1/p_i) / (1 − 1/p_i)
//! ```
//!
//! and the fitted serial fraction is the least-squares solution over
//! those estimates (their mean), clamped to `[0, 1]`. A dataset with
//! only single-thread points cannot support the estimator (`p = 1`
//! makes the denominator vanish) and fails with `InsufficientData`.
//!
//! The fit is a pure function of the curve: fitting twice on the same
//! data yields an identical serial fraction.

use super::scaling::ScalingCurve;
use crate::error::HarnessError;

// =================================================================================================
// Amdahl Fit
// =================================================================================================

/// Fitted serial fraction of one `(topology, schedule)` group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmdahlFit {
    /// Estimated serial fraction, in `[0, 1]`
    pub serial_fraction: f64,
}

impl AmdahlFit {
    /// Fit the serial fraction over the curve's multi-thread points.
    pub fn fit(curve: &ScalingCurve) -> Result<Self, HarnessError> {
        let estimates: Vec<f64> = curve
            .points
            .iter()
            .filter(|point| point.threads > 1 && point.speedup > 0.0)
            .map(|point| {
                let inv_p = 1.0 / f64::from(point.threads);
                (1.0 / point.speedup - inv_p) / (1.0 - inv_p)
            })
            .collect();

        if estimates.is_empty() {
            return Err(HarnessError::InsufficientData {
                topology: curve.topology,
                schedule: curve.schedule,
            });
        }

        let mean = estimates.iter().sum::<f64>() / estimates.len() as f64;
        Ok(Self {
            serial_fraction: mean.clamp(0.0, 1.0),
        })
    }

    /// Predicted speedup at `threads` under the fitted law.
    pub fn predict(&self, threads: u32) -> f64 {
        let f = self.serial_fraction;
        1.0 / (f + (1.0 - f) / f64::from(threads))
    }

    /// Predicted curve over a set of thread counts (typically the
    /// measured ones; extrapolation beyond them is a consumer concern).
    pub fn predicted_curve(&self, thread_counts: &[u32]) -> Vec<(u32, f64)> {
        thread_counts
            .iter()
            .map(|&threads| (threads, self.predict(threads)))
            .collect()
    }
}

// =================================================================================================
// Tests
// =================================================================================================
