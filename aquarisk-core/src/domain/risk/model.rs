// aquarisk-core/src/domain/risk/model.rs
//
// Transparent risk scoring: each parameter contributes a bounded, monotonic
// sub-score in [0,1] from its distance to a healthy reference range; the
// aggregate is a weighted sum on the same scale. Pure functions of the
// sample values and the fixed constants, so two runs on identical input are
// byte-identical.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::sample::{FlagKind, Parameter, QualityFlag, WaterSample};

/// Healthy reference ranges. Band parameters (pH, DO, temperature) score 0
/// inside [low, high]; ratio parameters (turbidity, salinity, chlorophyll)
/// scale linearly up to their max.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub ph_low: f64,
    pub ph_high: f64,
    pub do_low: f64,
    pub do_high: f64,
    pub temp_low: f64,
    pub temp_high: f64,
    pub turbidity_max: f64,
    pub salinity_max: f64,
    pub chlorophyll_max: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            ph_low: 6.5,
            ph_high: 8.5,
            do_low: 4.0,
            do_high: 12.0,
            temp_low: 10.0,
            temp_high: 30.0,
            turbidity_max: 10.0,
            salinity_max: 40.0,
            chlorophyll_max: 50.0,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<(), DomainError> {
        let bands = [
            ("ph", self.ph_low, self.ph_high),
            ("dissolved_oxygen", self.do_low, self.do_high),
            ("temperature", self.temp_low, self.temp_high),
        ];
        for (name, low, high) in bands {
            if low >= high {
                return Err(DomainError::InvalidModelConfig(format!(
                    "{name} band is empty: low {low} >= high {high}"
                )));
            }
        }
        let maxima = [
            ("turbidity_max", self.turbidity_max),
            ("salinity_max", self.salinity_max),
            ("chlorophyll_max", self.chlorophyll_max),
        ];
        for (name, max) in maxima {
            if max <= 0.0 {
                return Err(DomainError::InvalidModelConfig(format!(
                    "{name} must be > 0, got {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Relative environmental importance. Chlorophyll and dissolved oxygen are
/// the strongest eutrophication/health signals, temperature the weakest.
/// Must cover all six parameters and sum to 1 so the aggregate stays in
/// [0,1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskWeights {
    pub ph: f64,
    pub turbidity: f64,
    pub dissolved_oxygen: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub chlorophyll: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            ph: 0.15,
            turbidity: 0.20,
            dissolved_oxygen: 0.25,
            temperature: 0.05,
            salinity: 0.10,
            chlorophyll: 0.25,
        }
    }
}

impl RiskWeights {
    pub fn weight(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Ph => self.ph,
            Parameter::Turbidity => self.turbidity,
            Parameter::DissolvedOxygen => self.dissolved_oxygen,
            Parameter::Temperature => self.temperature,
            Parameter::Salinity => self.salinity,
            Parameter::Chlorophyll => self.chlorophyll,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut sum = 0.0;
        for p in Parameter::ALL {
            let w = self.weight(p);
            if w < 0.0 {
                return Err(DomainError::InvalidModelConfig(format!(
                    "weight for {p} must be >= 0, got {w}"
                )));
            }
            sum += w;
        }
        if (sum - 1.0).abs() > 1e-6 {
            return Err(DomainError::InvalidModelConfig(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RiskModel {
    thresholds: RiskThresholds,
    weights: RiskWeights,
}

impl RiskModel {
    pub fn new(thresholds: RiskThresholds, weights: RiskWeights) -> Result<Self, DomainError> {
        thresholds.validate()?;
        weights.validate()?;
        Ok(Self { thresholds, weights })
    }

    /// Reference model: default thresholds + default weights.
    pub fn reference() -> Self {
        Self {
            thresholds: RiskThresholds::default(),
            weights: RiskWeights::default(),
        }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Per-parameter sub-score in [0,1], monotonic in the distance from the
    /// healthy range.
    pub fn sub_score(&self, parameter: Parameter, value: f64) -> f64 {
        let t = &self.thresholds;
        match parameter {
            Parameter::Ph => band_badness(value, t.ph_low, t.ph_high, 2.0),
            Parameter::DissolvedOxygen => band_badness(value, t.do_low, t.do_high, 2.0),
            Parameter::Temperature => band_badness(value, t.temp_low, t.temp_high, 5.0),
            Parameter::Turbidity => ratio_badness(value, t.turbidity_max),
            Parameter::Salinity => ratio_badness(value, t.salinity_max),
            Parameter::Chlorophyll => ratio_badness(value, t.chlorophyll_max),
        }
    }

    pub fn sub_scores(&self, sample: &WaterSample) -> [(Parameter, f64); 6] {
        Parameter::ALL.map(|p| (p, self.sub_score(p, sample.value(p))))
    }

    /// Weighted aggregate in [0,1]. Sets `risk_score` and flags any
    /// parameter whose sub-score saturates (extreme but in-domain reading).
    /// Imputed fields contribute at full weight; their flags already record
    /// that the input was estimated.
    pub fn score(&self, sample: &mut WaterSample) {
        let mut aggregate = 0.0;
        for (parameter, sub) in self.sub_scores(sample) {
            aggregate += self.weights.weight(parameter) * sub;
            if sub >= 1.0
                && !sample
                    .quality_flags
                    .iter()
                    .any(|f| f.parameter == parameter && f.kind == FlagKind::Extreme)
            {
                sample.quality_flags.push(QualityFlag {
                    parameter,
                    kind: FlagKind::Extreme,
                });
            }
        }
        sample.risk_score = Some(aggregate.clamp(0.0, 1.0));
    }
}

/// 0 inside [low, high], rising linearly with the distance outside, capped
/// at 1 after `scale` units.
fn band_badness(value: f64, low: f64, high: f64, scale: f64) -> f64 {
    let distance = if value < low {
        low - value
    } else if value > high {
        value - high
    } else {
        return 0.0;
    };
    (distance / scale).min(1.0)
}

/// Linear in value/max, capped at 1.
fn ratio_badness(value: f64, max: f64) -> f64 {
    (value.max(0.0) / max).min(1.0)
}
