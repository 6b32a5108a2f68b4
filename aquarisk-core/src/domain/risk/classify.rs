// aquarisk-core/src/domain/risk/classify.rs

use crate::domain::error::DomainError;
use crate::domain::risk::calibration::CalibrationParams;
use crate::domain::sample::{Classification, WaterSample};

/// Total partition of the score axis.
///
/// Convention (reference behavior): `score >= high` is Unsafe, checked
/// first so a degenerate batch with `low == high` still classifies every
/// sample; then `score <= low` is Safe; the open band between the cut
/// points is Indeterminate and surfaced as such, never forced into a binary
/// choice.
pub fn classify_score(score: f64, params: &CalibrationParams) -> Classification {
    if score >= params.high {
        Classification::Unsafe
    } else if score <= params.low {
        Classification::Safe
    } else {
        Classification::Indeterminate
    }
}

/// Classify one scored sample in place. A sample without a risk score is a
/// programming-contract violation, not a data condition.
pub fn classify_sample(
    sample: &mut WaterSample,
    params: &CalibrationParams,
) -> Result<(), DomainError> {
    let score = sample
        .risk_score
        .ok_or_else(|| DomainError::UnscoredSample(sample.id.clone()))?;
    sample.classification = Some(classify_score(score, params));
    Ok(())
}
