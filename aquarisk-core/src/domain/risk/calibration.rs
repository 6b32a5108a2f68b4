// aquarisk-core/src/domain/risk/calibration.rs
//
// Thresholds are derived from each batch's own score distribution. Fixed
// absolute cut points misclassify everything when score magnitudes shift
// with sensor drift or regional baselines; batch-relative percentiles do
// not. No state survives between batches.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Spread below which a distribution counts as degenerate.
const DEGENERATE_EPSILON: f64 = 1e-9;

/// Cut points for one batch. `low` and `high` partition the score axis into
/// Safe / Indeterminate / Unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub low: f64,
    pub high: f64,
}

/// How the cut points are derived. Pluggable so the percentile choice stays
/// a policy, not a constant buried in the code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum CalibrationScheme {
    /// Cut at two percentiles of the batch's score distribution
    /// (linear interpolation between order statistics).
    Percentile { low_pct: f64, high_pct: f64 },
}

impl Default for CalibrationScheme {
    fn default() -> Self {
        // Interquartile band: lower quartile Safe boundary, upper quartile
        // Unsafe boundary.
        CalibrationScheme::Percentile {
            low_pct: 25.0,
            high_pct: 75.0,
        }
    }
}

impl CalibrationScheme {
    pub fn validate(&self) -> Result<(), DomainError> {
        match self {
            CalibrationScheme::Percentile { low_pct, high_pct } => {
                if !(0.0..=100.0).contains(low_pct) || !(0.0..=100.0).contains(high_pct) {
                    return Err(DomainError::InvalidModelConfig(format!(
                        "percentiles must be in [0, 100], got ({low_pct}, {high_pct})"
                    )));
                }
                if low_pct > high_pct {
                    return Err(DomainError::InvalidModelConfig(format!(
                        "low percentile {low_pct} exceeds high percentile {high_pct}"
                    )));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Calibrator {
    scheme: CalibrationScheme,
    /// Absolute fallback boundary for degenerate (zero-spread) batches: the
    /// whole batch is Safe below it, Unsafe at or above it.
    unsafe_floor: f64,
}

impl Calibrator {
    pub fn new(scheme: CalibrationScheme, unsafe_floor: f64) -> Result<Self, DomainError> {
        scheme.validate()?;
        if !(0.0..=1.0).contains(&unsafe_floor) {
            return Err(DomainError::InvalidModelConfig(format!(
                "unsafe_floor must be in [0, 1], got {unsafe_floor}"
            )));
        }
        Ok(Self {
            scheme,
            unsafe_floor,
        })
    }

    pub fn reference() -> Self {
        Self {
            scheme: CalibrationScheme::default(),
            unsafe_floor: 0.60,
        }
    }

    /// Derive the cut points from one batch's score vector.
    ///
    /// An empty vector is a pipeline ordering defect (calibration before
    /// scoring, or calibrating a batch with no samples) and fails loudly.
    pub fn calibrate(&self, scores: &[f64]) -> Result<CalibrationParams, DomainError> {
        if scores.is_empty() {
            return Err(DomainError::EmptyCalibration);
        }

        let mut sorted = scores.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let CalibrationScheme::Percentile { low_pct, high_pct } = self.scheme;
        let low = percentile(&sorted, low_pct);
        let high = percentile(&sorted, high_pct);

        // Degenerate distribution: both cut points collapse onto the
        // absolute floor so every sample classifies the same way, with no
        // NaN boundary and no exception.
        if (high - low).abs() < DEGENERATE_EPSILON {
            return Ok(CalibrationParams {
                low: self.unsafe_floor,
                high: self.unsafe_floor,
            });
        }

        Ok(CalibrationParams { low, high })
    }
}

/// Percentile with linear interpolation between adjacent order statistics.
/// `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = (n - 1) as f64 * (pct / 100.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let fraction = rank - lo as f64;
    sorted[lo] + fraction * (sorted[hi] - sorted[lo])
}
