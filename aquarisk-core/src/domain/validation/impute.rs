// aquarisk-core/src/domain/validation/impute.rs

use crate::domain::sample::Parameter;

/// Valid readings accumulated while walking a batch, one series per
/// parameter, in source order. Feeds the running-median policy.
#[derive(Debug, Default, Clone)]
pub struct ParameterHistory {
    series: [Vec<f64>; 6],
}

impl ParameterHistory {
    fn slot(&self, parameter: Parameter) -> usize {
        Parameter::ALL
            .iter()
            .position(|p| *p == parameter)
            .unwrap_or(0)
    }

    pub fn push(&mut self, parameter: Parameter, value: f64) {
        let slot = self.slot(parameter);
        self.series[slot].push(value);
    }

    /// Median of the values seen so far for this parameter, `None` when the
    /// series is still empty.
    pub fn median(&self, parameter: Parameter) -> Option<f64> {
        let series = &self.series[self.slot(parameter)];
        if series.is_empty() {
            return None;
        }
        let mut sorted = series.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }
}

/// Pluggable rule filling a missing field. The exact rule is a policy
/// decision, so it sits behind a trait rather than being hard-coded.
pub trait ImputationPolicy: Send + Sync {
    fn impute(&self, parameter: Parameter, history: &ParameterHistory) -> f64;
    fn name(&self) -> &'static str;
}

/// Reference policy: median of the valid readings seen earlier in the batch,
/// falling back to the parameter's neutral value when there is no history
/// yet (e.g. the first row).
#[derive(Debug, Default)]
pub struct RunningMedian;

impl ImputationPolicy for RunningMedian {
    fn impute(&self, parameter: Parameter, history: &ParameterHistory) -> f64 {
        history
            .median(parameter)
            .unwrap_or_else(|| parameter.neutral_value())
    }

    fn name(&self) -> &'static str {
        "running_median"
    }
}

/// Alternative policy: caller-supplied constants, one per parameter.
/// Parameters without a configured value fall back to the neutral value.
#[derive(Debug, Default)]
pub struct ConfiguredDefault {
    defaults: std::collections::BTreeMap<Parameter, f64>,
}

impl ConfiguredDefault {
    pub fn new(defaults: std::collections::BTreeMap<Parameter, f64>) -> Self {
        Self { defaults }
    }
}

impl ImputationPolicy for ConfiguredDefault {
    fn impute(&self, parameter: Parameter, _history: &ParameterHistory) -> f64 {
        self.defaults
            .get(&parameter)
            .copied()
            .unwrap_or_else(|| parameter.neutral_value())
    }

    fn name(&self) -> &'static str {
        "configured_default"
    }
}
