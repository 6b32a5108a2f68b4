// aquarisk-core/src/application/report.rs
//
// Summary view over a classified batch, consumed by the CLI and written as
// the run's JSON artifact.

use serde::Serialize;

use crate::domain::batch::Batch;
use crate::domain::risk::calibration::CalibrationParams;
use crate::domain::sample::{Classification, FlagKind, WaterSample};

const WORST_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct WorstSample {
    pub id: String,
    pub risk_score: f64,
    pub classification: Option<Classification>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub safe: usize,
    #[serde(rename = "unsafe")]
    pub unsafe_count: usize,
    pub indeterminate: usize,
    pub rejected: usize,
    /// Individual imputed fields across all accepted samples
    pub imputed_fields: usize,
    pub calibration: CalibrationParams,
    pub worst: Vec<WorstSample>,
}

pub fn summarize(batch: &Batch) -> BatchSummary {
    let (safe, unsafe_count, indeterminate) = batch.label_counts();

    let imputed_fields = batch
        .samples
        .iter()
        .flat_map(|s| &s.quality_flags)
        .filter(|f| matches!(f.kind, FlagKind::Imputed(_)))
        .count();

    let mut ranked: Vec<&WaterSample> = batch
        .samples
        .iter()
        .filter(|s| s.risk_score.is_some())
        .collect();
    ranked.sort_by(|a, b| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let worst = ranked
        .into_iter()
        .take(WORST_LIMIT)
        .map(|s| WorstSample {
            id: s.id.clone(),
            risk_score: s.risk_score.unwrap_or_default(),
            classification: s.classification,
        })
        .collect();

    BatchSummary {
        total: batch.samples.len(),
        safe,
        unsafe_count,
        indeterminate,
        rejected: batch.rejected.len(),
        imputed_fields,
        calibration: batch.calibration,
        worst,
    }
}

/// Iterator over the Unsafe samples with their scores, highest risk last in
/// source order (callers sort as they see fit).
pub fn unsafe_alerts(batch: &Batch) -> impl Iterator<Item = (&WaterSample, f64)> {
    batch.samples.iter().filter_map(|s| {
        match (s.classification, s.risk_score) {
            (Some(Classification::Unsafe), Some(score)) => Some((s, score)),
            _ => None,
        }
    })
}
